use crate::error::AccessError;
use crate::error::AllocError;
use crate::error::Error;
use crate::stack::Stack;
use super::FrameRef;
use super::Heap;
use super::ObjectRef;

use scopeguard::guard;
use tracing::trace;

/// Collection of object handles that are treated as roots.
///
/// Frames are pushed onto and popped off the frame stack of their heap
/// in last-in-first-out order.
/// While a frame is on the frame stack,
/// every object it references survives [`collect`][`Heap::collect`],
/// and so does every object reachable from those through arrays.
///
/// A frame does not own the objects it references.
/// The same object may be referenced any number of times
/// by the same frame or by different frames.
#[derive(Debug)]
pub struct Frame<'h>
{
    serial: u64,
    roots: Stack<ObjectRef<'h>>,
}

impl<'h> Frame<'h>
{
    /// Iterate over the roots, in the order they were referenced.
    pub fn roots(&self) -> impl Iterator<Item=ObjectRef<'h>> + '_
    {
        self.roots.iter().copied()
    }

    /// Number of roots, duplicates included.
    pub fn len(&self) -> usize
    {
        self.roots.len()
    }

    /// Whether the frame has no roots.
    pub fn is_empty(&self) -> bool
    {
        self.roots.is_empty()
    }
}

impl<'h> Heap<'h>
{
    /// Push a new frame without roots onto the frame stack.
    pub fn new_frame(&mut self) -> Result<FrameRef<'h>, AllocError>
    {
        self.frames.reserve(1)?;

        let depth = self.frames.len();
        let serial = self.next_frame_serial;
        self.next_frame_serial += 1;

        let roots = Stack::with_initial_capacity(self.config.initial_capacity);
        self.frames.push_reserved(Frame{serial, roots});

        trace!(depth, "pushed frame");
        Ok(FrameRef::new(depth, serial))
    }

    /// Pop the most recently pushed frame off the frame stack.
    ///
    /// The objects it references are not affected until
    /// the next call to [`collect`][`Self::collect`].
    /// If there are no frames, this method returns [`None`].
    pub fn pop_frame(&mut self) -> Option<Frame<'h>>
    {
        let frame = self.frames.pop()?;
        trace!(depth = self.frames.len(), "popped frame");
        Some(frame)
    }

    /// Look up a frame.
    ///
    /// If the frame has been popped, this method returns [`None`].
    pub fn frame(&self, frame: FrameRef<'h>) -> Option<&Frame<'h>>
    {
        self.frames.get(frame.depth())
            .filter(|f| f.serial == frame.serial())
    }

    fn frame_mut(&mut self, frame: FrameRef<'h>) -> Option<&mut Frame<'h>>
    {
        self.frames.get_mut(frame.depth())
            .filter(|f| f.serial == frame.serial())
    }

    /// Add an object to the roots of a frame.
    ///
    /// The object is not deduplicated against existing roots.
    /// If either handle is stale, nothing happens and an error is returned.
    pub fn reference(&mut self, frame: FrameRef<'h>, object: ObjectRef<'h>)
        -> Result<(), Error>
    {
        if !self.is_live(object) {
            return Err(AccessError::StaleObject.into());
        }
        self.reserve_root(frame)?;
        self.reference_reserved(frame, object);
        Ok(())
    }

    /// Make sure one more root can be added to the frame without allocating.
    pub (crate) fn reserve_root(&mut self, frame: FrameRef<'h>)
        -> Result<(), Error>
    {
        let frame = self.frame_mut(frame).ok_or(AccessError::StaleFrame)?;
        frame.roots.reserve(1)?;
        Ok(())
    }

    /// Add a root for which room was made with `reserve_root`.
    pub (crate) fn reference_reserved(
        &mut self,
        frame: FrameRef<'h>,
        object: ObjectRef<'h>,
    )
    {
        if let Some(frame) = self.frame_mut(frame) {
            frame.roots.push_reserved(object);
        }
    }

    /// Pop frames until only `depth` frames remain.
    fn truncate_frames(&mut self, depth: usize)
    {
        while self.frames.len() > depth {
            self.pop_frame();
        }
    }

    /// Push a new frame and pass it to the given function.
    ///
    /// As soon as the given function returns or panics,
    /// the frame is popped again, along with any frames
    /// the function pushed but did not pop.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tricolor_memory::heap::Heap;
    /// # Heap::with_new(|heap| {
    /// heap.with_frame(|heap, frame| {
    ///     let greeting = heap.new_string_in(frame, "Hello").unwrap();
    ///     heap.collect().unwrap();
    ///     assert!(heap.is_live(greeting));
    /// }).unwrap();
    /// heap.collect().unwrap();
    /// assert_eq!(heap.object_count(), 0);
    /// # });
    /// ```
    pub fn with_frame<F, R>(&mut self, then: F) -> Result<R, AllocError>
        where F: FnOnce(&mut Heap<'h>, FrameRef<'h>) -> R
    {
        let depth = self.frames.len();
        let frame = self.new_frame()?;
        let mut heap = guard(self, |heap: &mut Heap<'h>| {
            heap.truncate_frames(depth);
        });
        Ok(then(&mut **heap, frame))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    extern crate std;

    use core::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;

    #[test]
    fn frames_are_lifo()
    {
        Heap::with_new(|heap| {
            let a = heap.new_frame().unwrap();
            let b = heap.new_frame().unwrap();
            assert_eq!(heap.frame_count(), 2);
            assert_eq!(a.depth(), 0);
            assert_eq!(b.depth(), 1);

            heap.pop_frame().unwrap();
            assert!(heap.frame(b).is_none());
            assert!(heap.frame(a).is_some());

            heap.pop_frame().unwrap();
            assert!(heap.pop_frame().is_none());
            assert_eq!(heap.frame_count(), 0);
        });
    }

    #[test]
    fn popped_handle_stays_stale()
    {
        Heap::with_new(|heap| {
            let old = heap.new_frame().unwrap();
            heap.pop_frame();
            let new = heap.new_frame().unwrap();
            assert_eq!(old.depth(), new.depth());

            let object = heap.new_integer(1).unwrap();
            let result = heap.reference(old, object);
            assert_eq!(result, Err(Error::Access(AccessError::StaleFrame)));
            assert!(heap.frame(new).unwrap().is_empty());
        });
    }

    #[test]
    fn reference_does_not_deduplicate()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let object = heap.new_integer(1).unwrap();
            heap.reference(frame, object).unwrap();
            heap.reference(frame, object).unwrap();
            let roots: alloc::vec::Vec<_> = heap.frame(frame).unwrap().roots().collect();
            assert_eq!(roots, [object, object]);
        });
    }

    #[test]
    fn reference_stale_object()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let object = heap.new_integer(1).unwrap();
            heap.collect().unwrap();
            let result = heap.reference(frame, object);
            assert_eq!(result, Err(Error::Access(AccessError::StaleObject)));
            assert_eq!(heap.frame(frame).unwrap().len(), 0);
        });
    }

    #[test]
    fn popped_frame_keeps_its_roots()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let object = heap.new_integer_in(frame, 5).unwrap();
            let popped = heap.pop_frame().unwrap();
            assert!(popped.roots().eq([object]));
            // Popping alone does not collect.
            assert!(heap.is_live(object));
        });
    }

    #[test]
    fn with_frame_pops_nested_frames()
    {
        Heap::with_new(|heap| {
            heap.new_frame().unwrap();
            let depth = heap.with_frame(|heap, frame| {
                heap.new_frame().unwrap();
                heap.new_frame().unwrap();
                frame.depth()
            }).unwrap();
            assert_eq!(depth, 1);
            assert_eq!(heap.frame_count(), 1);
        });
    }

    #[test]
    fn with_frame_pops_on_panic()
    {
        Heap::with_new(|heap| {
            let result = catch_unwind(AssertUnwindSafe(|| {
                heap.with_frame(|_heap, _frame| panic!("boom")).unwrap();
            }));
            assert!(result.is_err());
            assert_eq!(heap.frame_count(), 0);
        });
    }
}
