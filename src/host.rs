//! Host element surface consumed by the bridge.
//!
//! `Element` is the interface-level stand-in for a host-owned DOM-like node:
//! the adapter creates one mount container per external instance, and the
//! external instance supplies its own elements as projection targets. The
//! bridge only needs identity, attach state, an attribute table and keyed
//! out-of-tree mounts - layout, diffing and painting stay with the host
//! rendering library.
//!
//! Portal mounts are keyed by [`RenderKey`]: re-mounting an existing key
//! refreshes content in place (no teardown), while a new key is a fresh
//! mount. The distinction is observable through `fresh_mount_count`, which is
//! what the remount-vs-refresh invariants are tested against.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{Node, RenderKey};

// =============================================================================
// Element Identity
// =============================================================================

/// Identity of an element, stable for the element's lifetime.
///
/// Derived from the element's allocation, so two handles to the same node
/// compare equal and distinct nodes never collide while alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

// =============================================================================
// Element
// =============================================================================

struct ElementInner {
    tag: String,
    attrs: BTreeMap<String, String>,
    portals: BTreeMap<RenderKey, Node>,
    connected: bool,
    fresh_mounts: u32,
}

/// A host-owned DOM-like node handle.
///
/// Cheap to clone; all clones refer to the same underlying node.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementInner>>,
}

impl Element {
    /// Create an element that is attached to the document.
    pub fn new(tag: &str) -> Self {
        Self::with_connected(tag, true)
    }

    /// Create an element that is not (yet) attached to the document.
    pub fn detached(tag: &str) -> Self {
        Self::with_connected(tag, false)
    }

    fn with_connected(tag: &str, connected: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementInner {
                tag: tag.to_string(),
                attrs: BTreeMap::new(),
                portals: BTreeMap::new(),
                connected,
                fresh_mounts: 0,
            })),
        }
    }

    /// The element's tag name.
    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Identity of the underlying node.
    pub fn id(&self) -> ElementId {
        ElementId(Rc::as_ptr(&self.inner) as *const () as usize)
    }

    /// True iff both handles refer to the same underlying node.
    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------------
    // Attach state
    // -------------------------------------------------------------------------

    /// Whether the element is currently attached to the document.
    pub fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    /// Detach from the document.
    pub fn detach(&self) {
        self.inner.borrow_mut().connected = false;
    }

    /// (Re)attach to the document.
    pub fn attach(&self) {
        self.inner.borrow_mut().connected = true;
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Set an attribute.
    pub fn set_attr(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Read an attribute.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner.borrow().attrs.get(name).cloned()
    }

    // -------------------------------------------------------------------------
    // Keyed portal mounts
    // -------------------------------------------------------------------------

    /// Mount (or refresh) out-of-tree content under a render key.
    ///
    /// A new key counts as a fresh mount; an existing key only replaces the
    /// content, keeping the mount alive.
    pub fn mount_portal(&self, key: RenderKey, content: Node) {
        let mut inner = self.inner.borrow_mut();
        if inner.portals.insert(key, content).is_none() {
            inner.fresh_mounts += 1;
        }
    }

    /// Unmount the content under a render key. Returns whether anything was
    /// mounted there.
    pub fn unmount_portal(&self, key: RenderKey) -> bool {
        self.inner.borrow_mut().portals.remove(&key).is_some()
    }

    /// Render keys currently mounted, in key order.
    pub fn portal_keys(&self) -> Vec<RenderKey> {
        self.inner.borrow().portals.keys().copied().collect()
    }

    /// Content mounted under a key, if any.
    pub fn portal_content(&self, key: RenderKey) -> Option<Node> {
        self.inner.borrow().portals.get(&key).cloned()
    }

    /// How many fresh mounts this element has seen (refreshes excluded).
    pub fn fresh_mount_count(&self) -> u32 {
        self.inner.borrow().fresh_mounts
    }

    /// Concatenated text of all mounted content, in key order.
    pub fn text(&self) -> String {
        self.inner
            .borrow()
            .portals
            .values()
            .map(Node::to_text)
            .collect()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &inner.tag)
            .field("connected", &inner.connected)
            .field("portals", &inner.portals.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_identity() {
        let a = Element::new("div");
        let b = Element::new("div");
        let a2 = a.clone();

        assert!(a.same_node(&a2));
        assert!(!a.same_node(&b));
        assert_eq!(a.id(), a2.id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_attrs() {
        let el = Element::new("strong");
        assert_eq!(el.attr("id"), None);

        el.set_attr("id", "a1");
        assert_eq!(el.attr("id"), Some("a1".to_string()));

        el.set_attr("id", "a2");
        assert_eq!(el.attr("id"), Some("a2".to_string()));
    }

    #[test]
    fn test_attach_state() {
        let el = Element::new("div");
        assert!(el.is_connected());

        el.detach();
        assert!(!el.is_connected());

        el.attach();
        assert!(el.is_connected());

        assert!(!Element::detached("div").is_connected());
    }

    #[test]
    fn test_portal_mount_refresh_unmount() {
        let el = Element::new("div");
        let key = RenderKey::new(1);

        el.mount_portal(key, Node::text("X"));
        assert_eq!(el.fresh_mount_count(), 1);
        assert_eq!(el.portal_content(key), Some(Node::text("X")));
        assert_eq!(el.text(), "X");

        // Same key: content replaced in place, no new mount.
        el.mount_portal(key, Node::text("Y"));
        assert_eq!(el.fresh_mount_count(), 1);
        assert_eq!(el.text(), "Y");

        // Different key: fresh mount.
        el.mount_portal(RenderKey::new(2), Node::text("Z"));
        assert_eq!(el.fresh_mount_count(), 2);
        assert_eq!(el.portal_keys().len(), 2);
        assert_eq!(el.text(), "YZ");

        assert!(el.unmount_portal(key));
        assert!(!el.unmount_portal(key));
        assert_eq!(el.text(), "Z");
    }
}
