use super::HeapId;

use core::marker::PhantomData;

/// Handle to an object on the heap.
///
/// Object handles do not keep objects alive;
/// only frames do, directly or through arrays.
/// Once the object is collected, its slot in the arena may be reused,
/// but the generation stored in the handle will no longer match,
/// so the handle can not be confused with the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef<'h>
{
    _heap_id: HeapId<'h>,
    index: u32,
    generation: u32,
}

impl<'h> ObjectRef<'h>
{
    #[inline]
    pub (super) fn new(index: u32, generation: u32) -> Self
    {
        Self{_heap_id: PhantomData, index, generation}
    }

    /// Index of the arena slot holding the object.
    #[inline]
    pub (super) fn index(self) -> usize
    {
        self.index as usize
    }

    /// Generation of the arena slot at the time the object was created.
    #[inline]
    pub (super) fn generation(self) -> u32
    {
        self.generation
    }
}

/// Handle to a frame on the frame stack of a heap.
///
/// Frames are identified by their position on the frame stack
/// together with a serial number that is unique within the heap.
/// Once the frame is popped, the handle is stale,
/// even if another frame is pushed in the same position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRef<'h>
{
    _heap_id: HeapId<'h>,
    depth: usize,
    serial: u64,
}

impl<'h> FrameRef<'h>
{
    #[inline]
    pub (super) fn new(depth: usize, serial: u64) -> Self
    {
        Self{_heap_id: PhantomData, depth, serial}
    }

    /// Position of the frame on the frame stack, zero being the bottom.
    #[inline]
    pub fn depth(self) -> usize
    {
        self.depth
    }

    #[inline]
    pub (super) fn serial(self) -> u64
    {
        self.serial
    }
}
