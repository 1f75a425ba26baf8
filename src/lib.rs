//! # spark-bridge
//!
//! Bridge imperative external components into signal-driven declarative UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! An external component (own lifecycle, own rendering, not authored in the
//! declarative tree) is wrapped by an adapter node. On every render the
//! node's flat prop bag is partitioned against the component's schema, and
//! the partition drives a construct-once / update-on-change / tear-down-once
//! lifecycle:
//!
//! ```text
//! Props → classify → {attrs, events, slots, passthrough}
//!                         → binder (construct | update) → external instance
//! instance → projection(handle) → slot registry → version signal
//!                                       → portal effect → target elements
//! ```
//!
//! Slots are the projection mechanism: the instance asks for declarative
//! content to be rendered into an element it owns, outside the normal tree
//! structure. Projections are memoized by raw-input identity, keyed by
//! never-reused render keys, and materialized by a portal effect that is
//! decoupled from the adapter node's own render cycle.
//!
//! ## Modules
//!
//! - [`schema`] - property classification against per-type name sets
//! - [`slots`] - projections, slot handles, the per-node projection map
//! - [`binder`] - external instance lifecycle state machine
//! - [`portal`] - the independent render scope for projected content
//! - [`adapter`] - composition and the forwarded-ref surface
//! - [`component`] - the external component contract
//! - [`host`] - the consumed host element surface
//! - [`types`] - shared value types (nodes, slot input, keys, callables)

pub mod adapter;
pub mod binder;
pub mod component;
pub mod error;
pub mod host;
pub mod portal;
pub mod schema;
pub mod slots;
pub mod types;

// Re-export commonly used items
pub use types::{Args, EventHandler, Method, MethodTable, Node, RenderKey, SlotInput};

pub use host::{Element, ElementId};

pub use error::BridgeError;

pub use schema::{
    CHILDREN_PROP, ClassifiedProps, DEFAULT_SLOT, PropValue, Props, Schema, is_presentation_attr,
};

pub use component::{CreateFn, ExternalComponent, ExternalInstance, InstanceProps};

pub use slots::{Projection, SlotHandle, SlotRegistry};

pub use portal::PortalRenderer;

pub use binder::{LifecycleBinder, LifecycleState};

pub use adapter::{Adapter, AdapterNode, COMPONENT_ATTR, adapt};
