//! Adapter - composition of classifier, slot registry, binder and portal.
//!
//! `adapt` turns an [`ExternalComponent`] into an [`Adapter`]; mounting it
//! produces an [`AdapterNode`], the per-mount record that survives re-renders
//! and dies at unmount. Each render (mount or update) runs the same pipeline:
//!
//! ```text
//! Props ──classify──▶ {attrs, events, slots, passthrough}
//!                         │                │
//!                  slot registry      presentation attrs
//!                 (projections)      mirrored onto container
//!                         │
//!                 InstanceProps ──▶ binder (construct | update)
//! ```
//!
//! The node also carries the forwarded-ref surface: the mount container, the
//! live instance and its methods table, so imperative calls can be issued
//! from outside the declarative tree.

use std::rc::Rc;

use serde_json::Value;

use crate::binder::{LifecycleBinder, LifecycleState};
use crate::component::{ExternalComponent, ExternalInstance, InstanceProps};
use crate::error::BridgeError;
use crate::host::Element;
use crate::portal::{PortalRenderer, portal_renderer};
use crate::schema::{ClassifiedProps, PropValue, Props, is_presentation_attr};
use crate::slots::SlotRegistry;
use crate::types::{Args, MethodTable};

/// Attribute carrying the external component's name on its mount container.
pub const COMPONENT_ATTR: &str = "x-component";

/// Wrap an external component type for declarative use.
pub fn adapt(component: ExternalComponent) -> Adapter {
    Adapter {
        component: Rc::new(component),
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// A mountable wrapper around one external component type.
#[derive(Clone)]
pub struct Adapter {
    component: Rc<ExternalComponent>,
}

impl Adapter {
    pub fn component_name(&self) -> &str {
        &self.component.name
    }

    pub fn tag(&self) -> &str {
        &self.component.tag
    }

    /// First render: create the mount container, partition props, construct
    /// and connect the external instance. A failed creation call means the
    /// node does not mount.
    pub fn mount(&self, props: &Props) -> Result<AdapterNode, BridgeError> {
        let container = Element::new(&self.component.tag);
        container.set_attr(COMPONENT_ATTR, &self.component.name);

        let slots = SlotRegistry::new();
        let portal = portal_renderer(slots.shared());

        let mut node = AdapterNode {
            component: self.component.clone(),
            container,
            binder: LifecycleBinder::new(),
            slots,
            portal,
        };

        let instance_props = node.partition(props);
        node.binder
            .construct(&node.component, instance_props, &node.container)?;
        Ok(node)
    }
}

// =============================================================================
// Adapter Node
// =============================================================================

/// Per-mount record: container, binder, slot registry and portal renderer.
/// Survives re-renders; torn down at unmount.
pub struct AdapterNode {
    component: Rc<ExternalComponent>,
    container: Element,
    binder: LifecycleBinder,
    slots: SlotRegistry,
    portal: PortalRenderer,
}

impl std::fmt::Debug for AdapterNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterNode").finish_non_exhaustive()
    }
}

impl AdapterNode {
    /// Classify the bag, mirror presentation attrs, build projections.
    fn partition(&self, props: &Props) -> InstanceProps {
        let classified = self.component.schema.classify(props);
        self.mirror_presentation(&classified);
        let slots = self.slots.projections(&classified.slots);

        InstanceProps {
            attrs: classified.attrs,
            events: classified.events,
            slots,
            passthrough: classified.passthrough,
        }
    }

    /// Presentation attributes are structural concerns of the host tree;
    /// they go straight onto the container, bypassing the instance.
    fn mirror_presentation(&self, classified: &ClassifiedProps) {
        for (name, value) in &classified.passthrough {
            if !is_presentation_attr(name) {
                continue;
            }
            if let PropValue::Value(v) = value {
                self.container.set_attr(name, &attr_text(v));
            }
        }
    }

    /// A later render. Always reaches the instance's `update`, even when the
    /// partition is referentially identical to the previous render's.
    pub fn update(&mut self, props: &Props) -> Result<(), BridgeError> {
        let instance_props = self.partition(props);
        self.binder.update(instance_props)
    }

    /// Unmount: disconnect the instance, withdraw every live projection
    /// (firing `removed` callbacks), unmount projected content.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.binder.is_connected() {
            // Disconnect is the final hook call; withdrawal notifications
            // below go through handle callbacks, not hooks.
            let _ = self.binder.disconnect();
        }
        self.slots.clear();
    }

    // -------------------------------------------------------------------------
    // Forwarded-ref surface
    // -------------------------------------------------------------------------

    /// The mount container element.
    pub fn container(&self) -> Element {
        self.container.clone()
    }

    pub fn state(&self) -> LifecycleState {
        self.binder.state()
    }

    /// The live external instance.
    pub fn instance(&self) -> Option<&dyn ExternalInstance> {
        self.binder.instance()
    }

    pub fn instance_mut(&mut self) -> Option<&mut (dyn ExternalInstance + 'static)> {
        self.binder.instance_mut()
    }

    /// The instance's imperative methods table.
    pub fn methods(&self) -> MethodTable {
        self.binder
            .instance()
            .map(|instance| instance.methods())
            .unwrap_or_default()
    }

    /// Invoke an instance method by name. `None` if the instance is gone or
    /// the method does not exist.
    pub fn call_method(&self, name: &str, args: &Args) -> Option<Value> {
        self.methods().get(name).map(|method| method(args))
    }

    /// Imperative re-render of projected content only.
    pub fn force_update_portals(&self) {
        self.portal.force_update();
    }

    /// Number of currently active projections for this node.
    pub fn active_projections(&self) -> usize {
        self.slots.active_count()
    }
}

impl Drop for AdapterNode {
    fn drop(&mut self) {
        // Best-effort teardown when the host drops the node without an
        // explicit unmount. Idempotent after unmount().
        self.teardown();
    }
}

fn attr_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
