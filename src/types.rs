//! Core types for spark-bridge.
//!
//! These types flow between the declarative tree, the classifier, the slot
//! registry and the external component instance. Everything here is cheap to
//! clone: renderable content and callables are reference-counted, and
//! reference identity (not value equality) is what the slot memoization
//! contract is built on.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

// =============================================================================
// Render Key
// =============================================================================

/// Stable identifier correlating one logical projection across renders.
///
/// Keys are allocated from a process-wide monotonic counter and never reused,
/// so two concurrently active projections can never collide even when they
/// share a slot name or a mount target is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderKey(u64);

impl RenderKey {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value behind this key.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

// =============================================================================
// Args & Callables
// =============================================================================

/// Arguments payload carried by a projection request or a method call.
pub type Args = serde_json::Map<String, Value>;

/// Event handler supplied by the declarative tree, invoked by the external
/// instance with an arbitrary payload.
pub type EventHandler = Rc<dyn Fn(&Value)>;

/// One imperative method exposed by an external instance.
pub type Method = Rc<dyn Fn(&Args) -> Value>;

/// The methods table of an external instance, reachable through the
/// forwarded-ref surface of the adapter.
pub type MethodTable = HashMap<String, Method>;

// =============================================================================
// Renderable Nodes
// =============================================================================

/// A minimal renderable description of declarative content.
///
/// This is the shape slot content takes on its way into a projection target.
/// The bridge never diffs these - reconciliation belongs to the host
/// rendering library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Plain text.
    Text(String),
    /// An element with a tag and child content.
    Element { tag: String, children: Vec<Node> },
    /// Multiple sibling nodes (e.g. multi-child `children` input).
    Fragment(Vec<Node>),
}

impl Node {
    /// Text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Element node.
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element {
            tag: tag.into(),
            children,
        }
    }

    /// Fragment of sibling nodes.
    pub fn fragment(children: Vec<Node>) -> Self {
        Self::Fragment(children)
    }

    /// Concatenated text content of this subtree.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Element { children, .. } | Self::Fragment(children) => {
                children.iter().map(Node::to_text).collect()
            }
        }
    }
}

// =============================================================================
// Slot Input
// =============================================================================

/// Raw slot content as authored in the declarative tree.
///
/// Either static renderable nodes or a content-producing function that the
/// projection invokes with the request's args. Identity (`Rc` pointer
/// equality) decides whether a slot input "changed" between renders - deep
/// comparison would break the reuse contract.
#[derive(Clone)]
pub enum SlotInput {
    /// Static renderable content; projection args are ignored.
    Nodes(Rc<Node>),
    /// Content producer invoked with the projection's args.
    Render(Rc<dyn Fn(&Args) -> Node>),
}

impl SlotInput {
    /// Static node content.
    pub fn nodes(node: Node) -> Self {
        Self::Nodes(Rc::new(node))
    }

    /// Content-producing function.
    pub fn render(f: impl Fn(&Args) -> Node + 'static) -> Self {
        Self::Render(Rc::new(f))
    }

    /// Reference identity of the raw input. True iff both sides point at the
    /// same allocation.
    pub fn same_origin(&self, other: &SlotInput) -> bool {
        match (self, other) {
            (Self::Nodes(a), Self::Nodes(b)) => Rc::ptr_eq(a, b),
            (Self::Render(a), Self::Render(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SlotInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes(node) => f.debug_tuple("Nodes").field(node).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
