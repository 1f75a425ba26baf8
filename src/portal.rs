//! Portal Renderer - the independent render scope for projected content.
//!
//! One effect per adapter node, decoupled from the node's own render cycle:
//! it subscribes only to the slot registry's version signal. Adding,
//! updating or removing a projection bumps the signal; the effect re-runs
//! and reconciles its mounted-key map against the registry - mounting new
//! entries, refreshing existing keys in place (no teardown), unmounting
//! keys that disappeared.
//!
//! `spark-signals` effects run synchronously on signal writes, so a
//! projection call is materialized before it returns to the external
//! instance; the force-update entry point never blocks on anything else.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use spark_signals::effect;

use crate::host::Element;
use crate::slots::SharedSlotState;
use crate::types::RenderKey;

/// The render scope keeping active projections mounted.
///
/// Dropping it unmounts everything it mounted and stops the effect.
pub struct PortalRenderer {
    shared: Rc<SharedSlotState>,
    mounted: Rc<RefCell<HashMap<RenderKey, Element>>>,
    stop: Option<Box<dyn FnOnce()>>,
}

/// Spawn the portal effect for one adapter node's slot state.
pub(crate) fn portal_renderer(shared: Rc<SharedSlotState>) -> PortalRenderer {
    let mounted: Rc<RefCell<HashMap<RenderKey, Element>>> = Rc::new(RefCell::new(HashMap::new()));

    let version = shared.version_signal();
    let shared_for_effect = shared.clone();
    let mounted_for_effect = mounted.clone();

    let stop = effect(move || {
        // Subscribe to the registry's mutation signal - nothing else.
        let _ = version.get();
        materialize(&shared_for_effect, &mounted_for_effect);
    });

    PortalRenderer {
        shared,
        mounted,
        stop: Some(Box::new(stop)),
    }
}

/// Reconcile mounted portal content with the current registry entries.
fn materialize(shared: &SharedSlotState, mounted: &RefCell<HashMap<RenderKey, Element>>) {
    let live = shared.snapshot();
    let mut mounted = mounted.borrow_mut();

    // Unmount keys no longer in the registry.
    let live_keys: HashSet<RenderKey> = live.iter().map(|(key, _, _)| *key).collect();
    let stale: Vec<RenderKey> = mounted
        .keys()
        .filter(|key| !live_keys.contains(key))
        .copied()
        .collect();
    for key in stale {
        if let Some(element) = mounted.remove(&key) {
            element.unmount_portal(key);
        }
    }

    // Mount new entries; existing keys refresh content in place.
    for (key, target, content) in live {
        target.mount_portal(key, content);
        mounted.insert(key, target);
    }
}

impl PortalRenderer {
    /// Imperative re-render entry point.
    pub fn force_update(&self) {
        self.shared.bump();
    }

    /// Number of currently mounted projections.
    pub fn mounted_count(&self) -> usize {
        self.mounted.borrow().len()
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
        let mut mounted = self.mounted.borrow_mut();
        for (key, element) in mounted.drain() {
            element.unmount_portal(key);
        }
    }
}

impl Drop for PortalRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{SlotHandle, SlotRegistry};
    use crate::types::{Node, SlotInput};

    #[test]
    fn test_project_materializes_into_target() {
        let registry = SlotRegistry::new();
        let portal = portal_renderer(registry.shared());

        let target = Element::new("div");
        let handle = SlotHandle::new(&target);
        let projection = registry.projection_for(
            "nodeSlot",
            &SlotInput::nodes(Node::element("p", vec![Node::text("node slot")])),
        );
        projection.project(&handle);

        assert_eq!(portal.mounted_count(), 1);
        assert_eq!(target.text(), "node slot");
        assert_eq!(target.portal_keys(), vec![handle.key()]);
    }

    #[test]
    fn test_content_refresh_without_remount() {
        let registry = SlotRegistry::new();
        let portal = portal_renderer(registry.shared());

        let target = Element::new("div");
        let handle = SlotHandle::new(&target);

        let first = registry.projection_for("s", &SlotInput::nodes(Node::text("X")));
        first.project(&handle);
        assert_eq!(target.text(), "X");
        assert_eq!(target.fresh_mount_count(), 1);

        // New raw input, same target: content refreshes under the same key.
        let second = registry.projection_for("s", &SlotInput::nodes(Node::text("Y")));
        second.project(&handle);

        assert_eq!(target.text(), "Y");
        assert_eq!(target.fresh_mount_count(), 1);
        assert_eq!(target.portal_keys(), vec![handle.key()]);
        assert_eq!(portal.mounted_count(), 1);
    }

    #[test]
    fn test_withdraw_unmounts() {
        let registry = SlotRegistry::new();
        let portal = portal_renderer(registry.shared());

        let target = Element::new("div");
        let handle = SlotHandle::new(&target);
        let projection = registry.projection_for("s", &SlotInput::nodes(Node::text("X")));

        projection.project(&handle);
        assert_eq!(target.text(), "X");

        projection.withdraw(&handle);
        assert_eq!(portal.mounted_count(), 0);
        assert!(target.portal_keys().is_empty());
        assert_eq!(target.text(), "");
    }

    #[test]
    fn test_drop_unmounts_everything() {
        let registry = SlotRegistry::new();
        let portal = portal_renderer(registry.shared());

        let target = Element::new("div");
        let projection = registry.projection_for("s", &SlotInput::nodes(Node::text("X")));
        projection.project(&SlotHandle::new(&target));
        assert_eq!(target.text(), "X");

        drop(portal);
        assert!(target.portal_keys().is_empty());
    }

    #[test]
    fn test_force_update_is_idempotent() {
        let registry = SlotRegistry::new();
        let portal = portal_renderer(registry.shared());

        let target = Element::new("div");
        let projection = registry.projection_for("s", &SlotInput::nodes(Node::text("X")));
        projection.project(&SlotHandle::new(&target));

        portal.force_update();
        portal.force_update();

        assert_eq!(portal.mounted_count(), 1);
        assert_eq!(target.text(), "X");
        assert_eq!(target.fresh_mount_count(), 1);
    }
}
