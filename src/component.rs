//! External component contract - the collaborator side of the bridge.
//!
//! An [`ExternalComponent`] describes one component type: identity, the tag
//! used to create its mount container, its [`Schema`], and the creation
//! call. The creation call receives the already-partitioned first-render
//! props together with the mount container (construction-time binding) and
//! returns the live [`ExternalInstance`].
//!
//! The instance contract: `connect` fires once post-mount (even though
//! creation already saw the container), `update` fires on every later render
//! and never on the first, `disconnect` fires exactly once at unmount.
//! `methods` exposes the imperative surface reachable through the adapter's
//! forwarded ref.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::BridgeError;
use crate::host::Element;
use crate::schema::{PropValue, Schema};
use crate::slots::Projection;
use crate::types::{EventHandler, MethodTable};

// =============================================================================
// Instance Props
// =============================================================================

/// Partitioned props delivered to the external instance.
///
/// Rebuilt from scratch on every render. Slots arrive as callable
/// projections whose identity is stable across renders while the raw slot
/// input is unchanged - the instance compares projection identity to decide
/// whether a slot needs re-projecting.
#[derive(Clone, Default)]
pub struct InstanceProps {
    pub attrs: HashMap<String, Value>,
    pub events: HashMap<String, EventHandler>,
    pub slots: HashMap<String, Projection>,
    pub passthrough: HashMap<String, PropValue>,
}

// =============================================================================
// External Component
// =============================================================================

/// Creation call of an external component type.
pub type CreateFn =
    Rc<dyn Fn(InstanceProps, &Element) -> Result<Box<dyn ExternalInstance>, BridgeError>>;

/// One external component type: identity, mount tag, schema, creation call.
///
/// Immutable once defined; the adapter holds it behind an `Rc` and builds
/// one instance per mounted adapter node.
#[derive(Clone)]
pub struct ExternalComponent {
    /// Component name, stamped onto the mount container.
    pub name: String,
    /// Component version.
    pub version: String,
    /// Tag used to create the mount container element.
    pub tag: String,
    /// Static property-name sets.
    pub schema: Schema,
    /// Creation call.
    pub create: CreateFn,
}

impl ExternalComponent {
    pub fn new(
        name: &str,
        version: &str,
        tag: &str,
        schema: Schema,
        create: impl Fn(InstanceProps, &Element) -> Result<Box<dyn ExternalInstance>, BridgeError>
        + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            tag: tag.to_string(),
            schema,
            create: Rc::new(create),
        }
    }
}

// =============================================================================
// External Instance
// =============================================================================

/// A live external component instance, exclusively owned by its adapter
/// node's lifecycle binder.
pub trait ExternalInstance {
    /// Container-dependent setup that construction time cannot guarantee
    /// (e.g. the container not yet attached). Fires once post-mount.
    fn connect(&mut self, _container: &Element) {}

    /// Props changed. Never fires on the render that performed construction.
    /// Diffing the partition is the instance's responsibility.
    fn update(&mut self, props: InstanceProps);

    /// The instance is being torn down. Final hook call.
    fn disconnect(&mut self);

    /// Imperative methods table.
    fn methods(&self) -> MethodTable {
        MethodTable::new()
    }
}
