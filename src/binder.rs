//! Lifecycle Binder - one external instance per mounted adapter node.
//!
//! State machine per node:
//!
//! ```text
//! Unmounted → Constructing → Connected → Updating (⟲) → Disconnected
//! ```
//!
//! Construction happens once, on the first render that has a live mount
//! container; `connect` fires immediately afterwards and strictly before any
//! `update`. Every later render goes through `update` - even when the
//! partition is referentially identical to the previous one, since diffing
//! belongs to the instance, not the binder. `disconnect` is the final hook
//! call; anything after it is a lifecycle violation.
//!
//! Error policy: a failed creation call propagates as `Err` and the node
//! does not mount. Panics inside update/disconnect propagate to the caller
//! unchanged - no retry, no suppression.

use crate::component::{ExternalComponent, ExternalInstance, InstanceProps};
use crate::error::BridgeError;
use crate::host::Element;

/// Lifecycle states of one adapter node's external instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Constructing,
    Connected,
    Updating,
    Disconnected,
}

/// Exclusive owner of one external instance for one mount.
pub struct LifecycleBinder {
    state: LifecycleState,
    instance: Option<Box<dyn ExternalInstance>>,
}

impl LifecycleBinder {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unmounted,
            instance: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the instance is inside its connected lifetime.
    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Connected | LifecycleState::Updating
        )
    }

    /// Build the instance from the first render's partitioned props, then
    /// fire `connect`. At most once per mount.
    pub fn construct(
        &mut self,
        component: &ExternalComponent,
        props: InstanceProps,
        container: &Element,
    ) -> Result<(), BridgeError> {
        if self.state != LifecycleState::Unmounted {
            return Err(BridgeError::Lifecycle("construct called twice for one mount"));
        }

        self.state = LifecycleState::Constructing;
        let mut instance = match (component.create)(props, container) {
            Ok(instance) => instance,
            Err(err) => {
                self.state = LifecycleState::Unmounted;
                return Err(err);
            }
        };

        instance.connect(container);
        self.instance = Some(instance);
        self.state = LifecycleState::Connected;
        Ok(())
    }

    /// Deliver a later render's partition to the instance.
    pub fn update(&mut self, props: InstanceProps) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::Lifecycle("update outside the connected lifetime"));
        }
        let Some(instance) = self.instance.as_mut() else {
            return Err(BridgeError::Lifecycle("update with no live instance"));
        };

        self.state = LifecycleState::Updating;
        instance.update(props);
        Ok(())
    }

    /// Tear the instance down. Exactly once; the final hook call.
    pub fn disconnect(&mut self) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::Lifecycle(
                "disconnect outside the connected lifetime",
            ));
        }
        let Some(mut instance) = self.instance.take() else {
            return Err(BridgeError::Lifecycle("disconnect with no live instance"));
        };

        instance.disconnect();
        self.state = LifecycleState::Disconnected;
        Ok(())
    }

    pub fn instance(&self) -> Option<&dyn ExternalInstance> {
        self.instance.as_deref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut (dyn ExternalInstance + 'static)> {
        self.instance.as_deref_mut()
    }
}

impl Default for LifecycleBinder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingInstance {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl ExternalInstance for RecordingInstance {
        fn connect(&mut self, container: &Element) {
            self.log.borrow_mut().push(format!("connect {}", container.tag()));
        }

        fn update(&mut self, props: InstanceProps) {
            self.log
                .borrow_mut()
                .push(format!("update attrs={}", props.attrs.len()));
        }

        fn disconnect(&mut self) {
            self.log.borrow_mut().push("disconnect".to_string());
        }
    }

    fn recording_component(log: Rc<RefCell<Vec<String>>>) -> ExternalComponent {
        ExternalComponent::new(
            "demo",
            "1.0.0",
            "strong",
            Schema::new(&["a"], &[], &[]),
            move |_, _| {
                log.borrow_mut().push("create".to_string());
                Ok(Box::new(RecordingInstance { log: log.clone() }))
            },
        )
    }

    #[test]
    fn test_connect_once_before_updates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let component = recording_component(log.clone());
        let container = Element::new("strong");

        let mut binder = LifecycleBinder::new();
        binder
            .construct(&component, InstanceProps::default(), &container)
            .unwrap();
        assert_eq!(binder.state(), LifecycleState::Connected);

        binder.update(InstanceProps::default()).unwrap();
        binder.update(InstanceProps::default()).unwrap();
        assert_eq!(binder.state(), LifecycleState::Updating);

        assert_eq!(
            *log.borrow(),
            vec![
                "create",
                "connect strong",
                "update attrs=0",
                "update attrs=0"
            ]
        );
    }

    #[test]
    fn test_double_construct_errs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let component = recording_component(log.clone());
        let container = Element::new("strong");

        let mut binder = LifecycleBinder::new();
        binder
            .construct(&component, InstanceProps::default(), &container)
            .unwrap();
        let err = binder
            .construct(&component, InstanceProps::default(), &container)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Lifecycle(_)));

        // Only one instance was ever created.
        assert_eq!(log.borrow().iter().filter(|e| *e == "create").count(), 1);
    }

    #[test]
    fn test_update_before_construct_errs() {
        let mut binder = LifecycleBinder::new();
        let err = binder.update(InstanceProps::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Lifecycle(_)));
    }

    #[test]
    fn test_disconnect_is_final() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let component = recording_component(log.clone());
        let container = Element::new("strong");

        let mut binder = LifecycleBinder::new();
        binder
            .construct(&component, InstanceProps::default(), &container)
            .unwrap();
        binder.disconnect().unwrap();
        assert_eq!(binder.state(), LifecycleState::Disconnected);
        assert!(binder.instance().is_none());

        assert!(binder.update(InstanceProps::default()).is_err());
        assert!(binder.disconnect().is_err());

        assert_eq!(
            log.borrow().iter().filter(|e| *e == "disconnect").count(),
            1
        );
    }

    #[test]
    fn test_construction_failure_leaves_unmounted() {
        let component = ExternalComponent::new(
            "failing",
            "1.0.0",
            "div",
            Schema::default(),
            |_, _| Err(BridgeError::construction("boom")),
        );
        let container = Element::new("div");

        let mut binder = LifecycleBinder::new();
        let err = binder
            .construct(&component, InstanceProps::default(), &container)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Construction(_)));
        assert_eq!(binder.state(), LifecycleState::Unmounted);
        assert!(binder.instance().is_none());
    }
}
