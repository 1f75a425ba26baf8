//! Property Classifier - schema-driven partition of the declarative prop bag.
//!
//! Each external component type carries a [`Schema`]: four disjoint sets of
//! property names (attrs, events, slots, methods), built once at definition
//! time. On every render the adapter hands the current flat [`Props`] bag to
//! [`Schema::classify`], which splits it into `{attrs, events, slots,
//! passthrough}`. Classification is a pure function of the bag and the
//! schema - no shared state, no side effects, deterministic.
//!
//! Rules, in order, per key:
//! - name in the attr set and the value is plain data → attrs
//! - name in the event set and the value is a handler → events
//! - name in the slot set (or the special `children` key, renamed to
//!   `default`) and the value is slot content → slots
//! - everything else → passthrough (schema misuse is never an error)

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::types::{EventHandler, SlotInput};

/// The children-equivalent property name.
pub const CHILDREN_PROP: &str = "children";

/// Slot name that `children` input maps to.
pub const DEFAULT_SLOT: &str = "default";

/// Well-known presentation attributes that are structural concerns of the
/// host tree. The adapter mirrors these onto the mount container directly,
/// bypassing the external instance.
pub fn is_presentation_attr(name: &str) -> bool {
    matches!(name, "id" | "class" | "style")
}

// =============================================================================
// Prop Values
// =============================================================================

/// One value in the flat declarative property bag.
#[derive(Clone)]
pub enum PropValue {
    /// Plain data (attributes, passthrough).
    Value(Value),
    /// Event handler.
    Handler(EventHandler),
    /// Renderable slot content.
    Slot(SlotInput),
}

// =============================================================================
// Props Bag
// =============================================================================

/// The flat property bag an adapter node receives on each render.
///
/// Keys are unique; insertion order is irrelevant.
#[derive(Clone, Default)]
pub struct Props {
    entries: HashMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: plain data value.
    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.insert(name, PropValue::Value(value));
        self
    }

    /// Builder: event handler.
    pub fn handler(mut self, name: &str, f: impl Fn(&Value) + 'static) -> Self {
        self.insert(name, PropValue::Handler(std::rc::Rc::new(f)));
        self
    }

    /// Builder: slot content.
    pub fn slot(mut self, name: &str, input: SlotInput) -> Self {
        self.insert(name, PropValue::Slot(input));
        self
    }

    /// Builder: children-equivalent input (always the `default` slot).
    pub fn children(self, input: SlotInput) -> Self {
        self.slot(CHILDREN_PROP, input)
    }

    pub fn insert(&mut self, name: &str, value: PropValue) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.entries.iter()
    }
}

// =============================================================================
// Classified Output
// =============================================================================

/// The four disjoint groups produced by classification.
///
/// Slots here are still raw inputs; the slot registry turns them into
/// callable projections (with identity memoization) before they reach the
/// external instance.
#[derive(Clone, Default)]
pub struct ClassifiedProps {
    pub attrs: HashMap<String, Value>,
    pub events: HashMap<String, EventHandler>,
    pub slots: HashMap<String, SlotInput>,
    pub passthrough: HashMap<String, PropValue>,
}

// =============================================================================
// Schema
// =============================================================================

/// Static name sets of one external component type.
///
/// Immutable once the component type is defined; lookups are set membership
/// checks, nothing reflective.
#[derive(Clone, Default)]
pub struct Schema {
    attrs: HashSet<String>,
    events: HashSet<String>,
    slots: HashSet<String>,
    methods: HashSet<String>,
}

impl Schema {
    /// Build a schema from attribute, event and slot name lists.
    pub fn new(attrs: &[&str], events: &[&str], slots: &[&str]) -> Self {
        Self {
            attrs: attrs.iter().map(|s| s.to_string()).collect(),
            events: events.iter().map(|s| s.to_string()).collect(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            methods: HashSet::new(),
        }
    }

    /// Add the method name list.
    pub fn with_methods(mut self, methods: &[&str]) -> Self {
        self.methods = methods.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_attr(&self, name: &str) -> bool {
        self.attrs.contains(name)
    }

    pub fn is_event(&self, name: &str) -> bool {
        self.events.contains(name)
    }

    pub fn is_slot(&self, name: &str) -> bool {
        self.slots.contains(name)
    }

    pub fn is_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    /// Partition a flat property bag into the four groups.
    pub fn classify(&self, props: &Props) -> ClassifiedProps {
        let mut out = ClassifiedProps::default();

        for (name, value) in props.iter() {
            if self.is_attr(name) {
                if let PropValue::Value(v) = value {
                    out.attrs.insert(name.clone(), v.clone());
                    continue;
                }
            } else if self.is_event(name) {
                if let PropValue::Handler(h) = value {
                    out.events.insert(name.clone(), h.clone());
                    continue;
                }
            } else if self.is_slot(name) || name == CHILDREN_PROP {
                if let PropValue::Slot(input) = value {
                    let slot_name = if name == CHILDREN_PROP {
                        DEFAULT_SLOT
                    } else {
                        name.as_str()
                    };
                    out.slots.insert(slot_name.to_string(), input.clone());
                    continue;
                }
            }

            // Unknown name, or a value whose shape does not match its
            // category - falls through, never an error.
            out.passthrough.insert(name.clone(), value.clone());
        }

        out
    }
}

// =============================================================================
// Tests
// =============================================================================
