//! Slot Registry - projections, handles and the per-node projection map.
//!
//! Converts raw slot inputs into callable [`Projection`]s and tracks what is
//! currently projected where:
//!
//! ```text
//! slot input ──projection_for──▶ Projection ──project(handle)──▶ entry map
//!      (memoized per slot name)                                     │
//!                                                              version bump
//!                                                                   │
//!                                                        portal effect re-runs
//! ```
//!
//! Memoization is identity-based: while a slot's raw input is
//! reference-identical to the previous render's, the previously minted
//! projection is returned unchanged. The external instance compares
//! projection identity itself ([`Projection::same`]) and may skip
//! re-projecting unchanged slots.
//!
//! One [`SlotHandle`] stands for one projection request. Handles carry the
//! target element, an args payload, a unique render key, and optional
//! `changed`/`removed` callbacks the external instance may set.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use crate::host::{Element, ElementId};
use crate::types::{Args, Node, RenderKey, SlotInput};

// =============================================================================
// Render Key Allocation
// =============================================================================

thread_local! {
    /// Process-wide render key counter. Keys are never reused.
    static NEXT_RENDER_KEY: Cell<u64> = const { Cell::new(0) };
}

pub(crate) fn next_render_key() -> RenderKey {
    NEXT_RENDER_KEY.with(|next| {
        let raw = next.get();
        next.set(raw + 1);
        RenderKey::new(raw)
    })
}

// =============================================================================
// Slot Handle
// =============================================================================

struct HandleInner {
    target: Element,
    args: RefCell<Args>,
    slot_name: RefCell<Option<String>>,
    key: RenderKey,
    changed: RefCell<Option<Rc<dyn Fn()>>>,
    removed: RefCell<Option<Rc<dyn Fn()>>>,
}

/// One projection request, created and owned by the external instance.
///
/// Cheap to clone; clones refer to the same request.
#[derive(Clone)]
pub struct SlotHandle {
    inner: Rc<HandleInner>,
}

impl SlotHandle {
    /// Handle for a target, with an empty args payload.
    pub fn new(target: &Element) -> Self {
        Self::with_args(target, Args::new())
    }

    /// Handle for a target with an args payload.
    pub fn with_args(target: &Element, args: Args) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                target: target.clone(),
                args: RefCell::new(args),
                slot_name: RefCell::new(None),
                key: next_render_key(),
                changed: RefCell::new(None),
                removed: RefCell::new(None),
            }),
        }
    }

    /// The mount target this request points at.
    pub fn target(&self) -> Element {
        self.inner.target.clone()
    }

    /// The handle's unique render key.
    pub fn key(&self) -> RenderKey {
        self.inner.key
    }

    /// Current args payload.
    pub fn args(&self) -> Args {
        self.inner.args.borrow().clone()
    }

    /// Replace the args payload for the next projection.
    pub fn set_args(&self, args: Args) {
        *self.inner.args.borrow_mut() = args;
    }

    /// Logical slot name, stamped by the first projection that saw this
    /// handle.
    pub fn slot_name(&self) -> Option<String> {
        self.inner.slot_name.borrow().clone()
    }

    /// Notification when this handle's projected content is replaced.
    pub fn on_changed(&self, f: impl Fn() + 'static) {
        *self.inner.changed.borrow_mut() = Some(Rc::new(f));
    }

    /// Notification when this handle's projection is withdrawn.
    pub fn on_removed(&self, f: impl Fn() + 'static) {
        *self.inner.removed.borrow_mut() = Some(Rc::new(f));
    }

    fn stamp_name(&self, name: &str) {
        let mut slot_name = self.inner.slot_name.borrow_mut();
        if slot_name.is_none() {
            *slot_name = Some(name.to_string());
        }
    }

    fn fire_changed(&self) {
        let callback = self.inner.changed.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn fire_removed(&self) {
        let callback = self.inner.removed.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

// =============================================================================
// Shared Registry State
// =============================================================================

/// One active projection.
pub(crate) struct ProjectionEntry {
    pub(crate) name: String,
    pub(crate) key: RenderKey,
    pub(crate) content: Node,
    pub(crate) target: Element,
    pub(crate) handle: SlotHandle,
}

/// Projection map plus its mutation signal, shared between the slot
/// registry, its minted projections and the portal renderer.
pub(crate) struct SharedSlotState {
    entries: RefCell<HashMap<ElementId, ProjectionEntry>>,
    revision: Cell<u64>,
    version: Signal<u64>,
}

impl SharedSlotState {
    fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            revision: Cell::new(0),
            version: signal(0),
        }
    }

    /// The mutation signal the portal renderer subscribes to.
    pub(crate) fn version_signal(&self) -> Signal<u64> {
        self.version.clone()
    }

    /// Signal a mutation. Callers must have released all entry borrows:
    /// the portal effect runs synchronously off this write and reads the
    /// entry map.
    pub(crate) fn bump(&self) {
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        self.version.set(revision);
    }

    /// Snapshot of the active entries for materialization.
    pub(crate) fn snapshot(&self) -> Vec<(RenderKey, Element, Node)> {
        self.entries
            .borrow()
            .values()
            .map(|entry| (entry.key, entry.target.clone(), entry.content.clone()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

// =============================================================================
// Projection
// =============================================================================

struct ProjectionInner {
    name: String,
    input: SlotInput,
    shared: Rc<SharedSlotState>,
}

/// Callable projection minted for one slot's raw input.
///
/// Identity-stable across renders while the raw input is unchanged; a new
/// input mints a new projection. The external instance invokes it at its own
/// discretion and timing.
#[derive(Clone)]
pub struct Projection {
    inner: Rc<ProjectionInner>,
}

impl Projection {
    /// The logical slot name this projection serves.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Identity comparison. True iff both were minted by the same
    /// `projection_for` call (memoization hit or clone).
    pub fn same(a: &Projection, b: &Projection) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Project content into the handle's target.
    ///
    /// Static input ignores the handle's args; a content producer is invoked
    /// with them. Re-projecting at an already-registered target replaces the
    /// entry's content in place, preserving its render key, and fires the
    /// handle's `changed` callback. A detached target is a silent no-op -
    /// target lifecycle is the external instance's responsibility.
    pub fn project(&self, handle: &SlotHandle) {
        let target = handle.target();
        if !target.is_connected() {
            return;
        }

        let content = match &self.inner.input {
            SlotInput::Nodes(node) => (**node).clone(),
            SlotInput::Render(produce) => produce(&handle.args()),
        };

        handle.stamp_name(&self.inner.name);

        let replaced = {
            let mut entries = self.inner.shared.entries.borrow_mut();
            match entries.entry(target.id()) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    entry.name = self.inner.name.clone();
                    entry.content = content;
                    entry.handle = handle.clone();
                    true
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(ProjectionEntry {
                        name: self.inner.name.clone(),
                        key: handle.key(),
                        content,
                        target: target.clone(),
                        handle: handle.clone(),
                    });
                    false
                }
            }
        };

        if replaced {
            handle.fire_changed();
        }
        self.inner.shared.bump();
    }

    /// Withdraw the projection at the handle's target, firing the registered
    /// handle's `removed` callback. No-op if nothing is projected there.
    pub fn withdraw(&self, handle: &SlotHandle) {
        let removed = self
            .inner
            .shared
            .entries
            .borrow_mut()
            .remove(&handle.target().id());

        if let Some(entry) = removed {
            entry.handle.fire_removed();
            self.inner.shared.bump();
        }
    }
}

// =============================================================================
// Slot Registry
// =============================================================================

struct CacheEntry {
    origin: SlotInput,
    projection: Projection,
}

/// Per-adapter-node slot state: the memoization cache and the shared
/// projection map. Exclusively owned by one adapter node; never shared
/// across nodes.
pub struct SlotRegistry {
    shared: Rc<SharedSlotState>,
    cache: RefCell<HashMap<String, CacheEntry>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(SharedSlotState::new()),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Projection for one slot's raw input.
    ///
    /// Returns the previously minted projection unchanged while the raw
    /// input is reference-identical to the previous render's; otherwise
    /// mints a new one and remembers the new origin.
    pub fn projection_for(&self, name: &str, raw: &SlotInput) -> Projection {
        let mut cache = self.cache.borrow_mut();

        if let Some(entry) = cache.get(name) {
            if entry.origin.same_origin(raw) {
                return entry.projection.clone();
            }
        }

        let projection = Projection {
            inner: Rc::new(ProjectionInner {
                name: name.to_string(),
                input: raw.clone(),
                shared: self.shared.clone(),
            }),
        };
        cache.insert(
            name.to_string(),
            CacheEntry {
                origin: raw.clone(),
                projection: projection.clone(),
            },
        );
        projection
    }

    /// Projections for a whole classified slot map.
    pub fn projections(&self, raw: &HashMap<String, SlotInput>) -> HashMap<String, Projection> {
        raw.iter()
            .map(|(name, input)| (name.clone(), self.projection_for(name, input)))
            .collect()
    }

    /// Number of currently active projections.
    pub fn active_count(&self) -> usize {
        self.shared.len()
    }

    /// Render key of the entry projected at a target, if any.
    pub fn key_for(&self, target: &Element) -> Option<RenderKey> {
        self.shared
            .entries
            .borrow()
            .get(&target.id())
            .map(|entry| entry.key)
    }

    /// Logical slot names with at least one active projection.
    pub fn active_slot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .entries
            .borrow()
            .values()
            .map(|entry| entry.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Withdraw every active projection (unmount path), firing each live
    /// handle's `removed` callback.
    pub fn clear(&self) {
        let drained: Vec<ProjectionEntry> = {
            let mut entries = self.shared.entries.borrow_mut();
            entries.drain().map(|(_, entry)| entry).collect()
        };

        if drained.is_empty() {
            return;
        }
        for entry in &drained {
            entry.handle.fire_removed();
        }
        self.shared.bump();
    }

    pub(crate) fn shared(&self) -> Rc<SharedSlotState> {
        self.shared.clone()
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
