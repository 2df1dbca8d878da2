use crate::object::Object;
use crate::object::Value;
use crate::stack::Stack;
use super::CollectStats;
use super::Frame;
use super::ObjectRef;

use alloc::vec::Vec;
use core::marker::PhantomData;
use tracing::debug;

/// Uniquely identifies a heap at compile-time.
///
/// By abusing an invariant lifetime,
/// we can distinguish different heaps at the type level.
/// This prevents us from mixing up handles from different heaps,
/// which is important for the garbage collector to work safely.
pub type HeapId<'h> = PhantomData<fn(&'h ()) -> &'h ()>;

/// Tunable parameters of a heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapConfig
{
    /// Capacity that every stack of the heap grows to the first time.
    ///
    /// This applies to the object registry, the frame stack,
    /// the root list of each frame, and the gray worklist.
    pub initial_capacity: usize,

    /// Maximum number of objects that may be alive at once.
    ///
    /// Allocating beyond this limit fails with
    /// [`AllocError::LimitExceeded`][`crate::error::AllocError::LimitExceeded`],
    /// exactly as if the allocator had run out of memory.
    pub object_limit: Option<usize>,
}

impl HeapConfig
{
    /// Set [`initial_capacity`][`Self::initial_capacity`].
    #[must_use]
    pub fn with_initial_capacity(self, initial_capacity: usize) -> Self
    {
        Self{initial_capacity, ..self}
    }

    /// Set [`object_limit`][`Self::object_limit`].
    #[must_use]
    pub fn with_object_limit(self, object_limit: usize) -> Self
    {
        Self{object_limit: Some(object_limit), ..self}
    }
}

impl Default for HeapConfig
{
    fn default() -> Self
    {
        Self{initial_capacity: 8, object_limit: None}
    }
}

/// Cumulative statistics over all collection cycles of a heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats
{
    /// Number of completed collection cycles.
    pub collections: usize,

    /// Number of objects destroyed by all cycles together.
    pub objects_freed: usize,
}

impl GcStats
{
    pub (super) fn record(&mut self, cycle: CollectStats)
    {
        self.collections += 1;
        self.objects_freed += cycle.freed;
    }
}

/// Slot in the object arena.
pub (super) struct Slot<'h>
{
    /// Incremented every time the object in this slot is destroyed.
    pub generation: u32,

    pub object: Option<Object<'h>>,
}

/// Collection of objects that may point to each other.
///
/// The heap owns every object and every frame.
/// Objects live in an arena and are addressed by [`ObjectRef`] handles;
/// arrays store such handles rather than owning their elements.
/// Which objects are alive is decided only by
/// [`collect`][`Self::collect`], never by the handles themselves.
pub struct Heap<'h>
{
    /// Uniquely identifies this heap.
    _heap_id: HeapId<'h>,

    pub (super) config: HeapConfig,

    /// Storage for objects, indexed by the slot index of a handle.
    pub (super) slots: Vec<Slot<'h>>,

    /// Indices of vacant slots.
    /// Its capacity is kept at least the number of slots,
    /// so that the sweep can push onto it without allocating.
    pub (super) free: Stack<u32>,

    /// Every live object, each exactly once.
    pub (super) registry: Stack<ObjectRef<'h>>,

    /// Frames whose roots keep objects alive.
    pub (super) frames: Stack<Frame<'h>>,

    /// Serial number for the next frame.
    pub (super) next_frame_serial: u64,

    pub (super) stats: GcStats,
}

impl<'h> Heap<'h>
{
    // Looking for the methods that create objects of different kinds?
    // Those can be found in the `crate::object::*` modules.

    /// Create a new heap with the default configuration
    /// and pass it to the given function.
    ///
    /// This method passes the heap to a callback rather than returning it,
    /// as the choice of `'h` must be up to this method and not the caller,
    /// to ensure that the heap identifier is unique.
    ///
    /// Once the callback returns, the heap is destroyed
    /// along with all of its objects and frames, reachable or not.
    pub fn with_new<F, R>(then: F) -> R
        where F: for<'fresh_h> FnOnce(&mut Heap<'fresh_h>) -> R
    {
        Self::with_config(HeapConfig::default(), then)
    }

    /// Like [`with_new`][`Self::with_new`], but with a custom configuration.
    pub fn with_config<F, R>(config: HeapConfig, then: F) -> R
        where F: for<'fresh_h> FnOnce(&mut Heap<'fresh_h>) -> R
    {
        let capacity = config.initial_capacity;
        let mut this = Heap{
            _heap_id: PhantomData,
            config,
            slots: Vec::new(),
            free: Stack::with_initial_capacity(capacity),
            registry: Stack::with_initial_capacity(capacity),
            frames: Stack::with_initial_capacity(capacity),
            next_frame_serial: 0,
            stats: GcStats::default(),
        };
        then(&mut this)
    }

    /// The configuration the heap was created with.
    pub fn config(&self) -> HeapConfig
    {
        self.config
    }

    /// Statistics over all collection cycles so far.
    pub fn stats(&self) -> GcStats
    {
        self.stats
    }

    /// Number of objects in the registry.
    pub fn object_count(&self) -> usize
    {
        self.registry.len()
    }

    /// Number of frames on the frame stack.
    pub fn frame_count(&self) -> usize
    {
        self.frames.len()
    }

    /// Iterate over every live object, in order of allocation.
    pub fn objects(&self) -> impl Iterator<Item=ObjectRef<'h>> + '_
    {
        self.registry.iter().copied()
    }

    /// Look up an object.
    ///
    /// If the handle is stale, this method returns [`None`].
    pub fn get(&self, object: ObjectRef<'h>) -> Option<&Object<'h>>
    {
        let slot = self.slots.get(object.index())?;
        if slot.generation != object.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    pub (crate) fn get_mut(&mut self, object: ObjectRef<'h>)
        -> Option<&mut Object<'h>>
    {
        let slot = self.slots.get_mut(object.index())?;
        if slot.generation != object.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Look up the value of an object.
    ///
    /// If the handle is stale, this method returns [`None`].
    pub fn value(&self, object: ObjectRef<'h>) -> Option<&Value<'h>>
    {
        self.get(object).map(|object| &object.value)
    }

    /// Whether the object has not been collected.
    pub fn is_live(&self, object: ObjectRef<'h>) -> bool
    {
        self.get(object).is_some()
    }
}

impl<'h> Drop for Heap<'h>
{
    fn drop(&mut self)
    {
        debug!(
            objects = self.registry.len(),
            frames = self.frames.len(),
            "tearing down heap"
        );
    }
}
