//! Mark, trace, and sweep.
//!
//! A collection cycle consists of three phases,
//! which always run in this order and never interleave
//! with any other heap operation.
//!
//!  1. *Mark* sets the [`MARKED`] flag on every object
//!     referenced directly by a frame on the frame stack.
//!  2. *Trace* seeds the gray worklist with every marked object,
//!     then repeatedly pops an object and marks and pushes
//!     each unmarked object referenced by one of its array slots.
//!     Every object is pushed at most once,
//!     so this terminates even on cyclic graphs.
//!  3. *Sweep* destroys every object that is not marked,
//!     clears the flag on the survivors, and compacts the registry.
//!
//! In terms of the tri-color abstraction, unmarked objects are white,
//! marked objects on the worklist are gray,
//! and marked objects that have been popped off the worklist are black.
//!
//! [`MARKED`]: `crate::object::Flags::MARKED`

use crate::error::AllocError;
use crate::object::Flags;
use crate::object::Object;
use crate::stack::Stack;
use super::Heap;
use super::ObjectRef;
use super::heap::Slot;

use tracing::debug;

/// Outcome of a single collection cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectStats
{
    /// Number of objects that were reachable and kept.
    pub survived: usize,

    /// Number of objects that were unreachable and destroyed.
    pub freed: usize,
}

/// Like [`Heap::get_mut`], for use while other fields of the heap are borrowed.
fn lookup_mut<'a, 'h>(slots: &'a mut [Slot<'h>], object: ObjectRef<'h>)
    -> Option<&'a mut Object<'h>>
{
    let slot = slots.get_mut(object.index())?;
    if slot.generation != object.generation() {
        return None;
    }
    slot.object.as_mut()
}

impl<'h> Heap<'h>
{
    /// Destroy every object that is not reachable from a frame.
    ///
    /// An object is reachable if a frame on the frame stack references it,
    /// or if a reachable array references it in one of its slots.
    /// Handles to destroyed objects become stale.
    ///
    /// The gray worklist is the only memory a cycle needs,
    /// and it is obtained before any object is marked.
    /// If that fails, the heap is left exactly as it was.
    pub fn collect(&mut self) -> Result<CollectStats, AllocError>
    {
        // Every object enters the worklist at most once.
        let mut gray = Stack::with_initial_capacity(self.config.initial_capacity);
        gray.reserve(self.registry.len())?;

        self.mark_roots();
        self.trace(&mut gray);
        let cycle = self.sweep();

        self.stats.record(cycle);
        debug!(survived = cycle.survived, freed = cycle.freed, "collected garbage");
        Ok(cycle)
    }

    /// Mark every object referenced directly by a frame.
    fn mark_roots(&mut self)
    {
        let Heap{frames, slots, ..} = self;
        for frame in frames.iter() {
            for root in frame.roots() {
                if let Some(object) = lookup_mut(slots, root) {
                    object.flags.insert(Flags::MARKED);
                }
            }
        }
    }

    /// Mark every object reachable from an already marked object.
    fn trace(&mut self, gray: &mut Stack<ObjectRef<'h>>)
    {
        for &object in &self.registry {
            if self.get(object).map_or(false, Object::is_marked) {
                gray.push_reserved(object);
            }
        }

        while let Some(object) = gray.pop() {
            self.blacken(gray, object);
        }
    }

    /// Shade every object referenced by the given object.
    fn blacken(&mut self, gray: &mut Stack<ObjectRef<'h>>, object: ObjectRef<'h>)
    {
        // Non-arrays have no references.
        let len = self.array_len(object).unwrap_or(0);
        for index in 0 .. len {
            if let Some(child) = self.array_get(object, index) {
                self.shade(gray, child);
            }
        }
    }

    /// Mark the object and push it onto the worklist, unless already marked.
    fn shade(&mut self, gray: &mut Stack<ObjectRef<'h>>, object: ObjectRef<'h>)
    {
        if let Some(target) = self.get_mut(object) {
            if !target.is_marked() {
                target.flags.insert(Flags::MARKED);
                gray.push_reserved(object);
            }
        }
    }

    /// Destroy unmarked objects and unmark the others.
    fn sweep(&mut self) -> CollectStats
    {
        let mut cycle = CollectStats::default();

        for position in 0 .. self.registry.len() {
            let Some(&object) = self.registry.get(position) else { continue };
            let slot = &mut self.slots[object.index()];

            match slot.object.as_mut() {
                Some(live) if live.is_marked() => {
                    live.flags.remove(Flags::MARKED);
                    cycle.survived += 1;
                    continue;
                },
                _ => { },
            }

            slot.object = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push_reserved(object.index() as u32);
            self.registry.tombstone(position);
            cycle.freed += 1;
        }

        // Compact only once every slot has been visited.
        self.registry.compact();
        cycle
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    use crate::heap::HeapConfig;
    use crate::object::Value;
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::collection::vec as vec_of;
    use proptest::option::of;
    use proptest::proptest;

    #[test]
    fn basic_collection()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();

            let string = heap.new_string_in(frame, "Hello").unwrap();
            let integer = heap.new_integer_in(frame, 42).unwrap();
            let array = heap.new_array_in(frame, 2).unwrap();
            heap.array_set(array, 0, string).unwrap();
            heap.array_set(array, 1, integer).unwrap();

            heap.new_string("I will be collected").unwrap();
            heap.new_integer(100).unwrap();
            assert_eq!(heap.object_count(), 5);

            let cycle = heap.collect().unwrap();
            assert_eq!(cycle, CollectStats{survived: 3, freed: 2});
            assert_eq!(heap.object_count(), 3);

            assert_eq!(heap.value(string).unwrap().as_bytes(), Some(&b"Hello"[..]));
            assert_eq!(heap.value(integer).unwrap().as_integer(), Some(42));
            assert_eq!(heap.array_len(array), Some(2));
            assert_eq!(heap.array_get(array, 0), Some(string));
            assert_eq!(heap.array_get(array, 1), Some(integer));

            // Keep only the array, which keeps its elements alive.
            heap.pop_frame().unwrap();
            let frame = heap.new_frame().unwrap();
            heap.reference(frame, array).unwrap();
            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 3);
        });
    }

    #[test]
    fn diamond()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();

            let main = heap.new_array_in(frame, 3).unwrap();
            let left = heap.new_array(2).unwrap();
            let right = heap.new_array(2).unwrap();
            let shared = heap.new_string("Shared String").unwrap();

            heap.array_set(main, 0, left).unwrap();
            heap.array_set(main, 1, right).unwrap();
            heap.array_set(main, 2, shared).unwrap();
            heap.array_set(left, 0, shared).unwrap();
            heap.array_set(right, 0, shared).unwrap();

            heap.new_string("Unreferenced 1").unwrap();
            heap.new_string("Unreferenced 2").unwrap();

            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 4);

            let from_left = heap.array_get(left, 0).unwrap();
            let from_right = heap.array_get(right, 0).unwrap();
            assert_eq!(from_left, from_right);
            assert_eq!(
                heap.value(from_left).unwrap().as_bytes(),
                Some(&b"Shared String"[..]),
            );
        });
    }

    #[test]
    fn frame_chain()
    {
        Heap::with_new(|heap| {
            let mut shared = None;
            for _ in 0 .. 10 {
                let frame = heap.new_frame().unwrap();
                let object = match shared {
                    Some(object) => object,
                    None => heap.new_string("Shared across frames").unwrap(),
                };
                heap.reference(frame, object).unwrap();
                shared = Some(object);
            }
            let shared = shared.unwrap();

            for _ in 1 .. 10 {
                heap.pop_frame().unwrap();
                heap.collect().unwrap();
                assert_eq!(
                    heap.value(shared).unwrap().as_bytes(),
                    Some(&b"Shared across frames"[..]),
                );
            }

            heap.pop_frame().unwrap();
            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 0);
            assert!(!heap.is_live(shared));
        });
    }

    #[test]
    fn repeated_collection_is_stable()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();

            let nested = heap.new_array_in(frame, 3).unwrap();
            let integer = heap.new_integer(42).unwrap();
            let float = heap.new_float(2.5).unwrap();
            let inner = heap.new_array(2).unwrap();
            heap.array_set(nested, 0, integer).unwrap();
            heap.array_set(nested, 1, float).unwrap();
            heap.array_set(nested, 2, inner).unwrap();
            let string = heap.new_string("Inner String").unwrap();
            let hundred = heap.new_integer(100).unwrap();
            heap.array_set(inner, 0, string).unwrap();
            heap.array_set(inner, 1, hundred).unwrap();

            let sparse = heap.new_array_in(frame, 5).unwrap();
            let middle = heap.new_string("Middle").unwrap();
            heap.array_set(sparse, 2, middle).unwrap();

            heap.collect().unwrap();
            let count = heap.object_count();
            assert_eq!(count, 8);

            for _ in 0 .. 5 {
                let cycle = heap.collect().unwrap();
                assert_eq!(cycle, CollectStats{survived: count, freed: 0});
                assert_eq!(heap.object_count(), count);

                let integer = heap.array_get(nested, 0).unwrap();
                let float = heap.array_get(nested, 1).unwrap();
                let middle = heap.array_get(sparse, 2).unwrap();
                assert_eq!(heap.value(integer), Some(&Value::Integer(42)));
                assert_eq!(heap.value(float), Some(&Value::Float(2.5)));
                assert_eq!(heap.value(middle).unwrap().as_bytes(), Some(&b"Middle"[..]));
                assert_eq!(heap.array_get(sparse, 0), None);
            }

            heap.pop_frame().unwrap();
            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 0);
            assert_eq!(heap.stats().collections, 7);
            assert_eq!(heap.stats().objects_freed, 8);
        });
    }

    #[test]
    fn cycles_are_collected()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let a = heap.new_array_in(frame, 1).unwrap();
            let b = heap.new_array(1).unwrap();
            heap.array_set(a, 0, b).unwrap();
            heap.array_set(b, 0, a).unwrap();

            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 2);

            heap.pop_frame().unwrap();
            heap.collect().unwrap();
            assert_eq!(heap.object_count(), 0);
        });
    }

    #[test]
    fn mark_then_trace()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let root = heap.new_array_in(frame, 1).unwrap();
            let child = heap.new_integer(1).unwrap();
            let loose = heap.new_integer(2).unwrap();
            heap.array_set(root, 0, child).unwrap();

            heap.mark_roots();
            assert!(heap.get(root).unwrap().is_marked());
            assert!(!heap.get(child).unwrap().is_marked());

            let mut gray = Stack::new();
            gray.reserve(heap.object_count()).unwrap();
            heap.trace(&mut gray);
            assert!(gray.is_empty());
            assert!(heap.get(child).unwrap().is_marked());
            assert!(!heap.get(loose).unwrap().is_marked());

            let cycle = heap.sweep();
            assert_eq!(cycle, CollectStats{survived: 2, freed: 1});
            assert!(!heap.get(root).unwrap().is_marked());
            assert!(!heap.get(child).unwrap().is_marked());
        });
    }

    #[test]
    fn popping_does_not_collect()
    {
        Heap::with_new(|heap| {
            let frame = heap.new_frame().unwrap();
            let object = heap.new_integer_in(frame, 1).unwrap();
            heap.pop_frame().unwrap();
            assert!(heap.is_live(object));
            assert_eq!(heap.object_count(), 1);
            heap.collect().unwrap();
            assert!(!heap.is_live(object));
        });
    }

    #[test]
    fn failed_allocation_is_atomic()
    {
        let config = HeapConfig::default().with_object_limit(2);
        Heap::with_config(config, |heap| {
            let frame = heap.new_frame().unwrap();
            heap.new_integer_in(frame, 1).unwrap();
            heap.new_array(3).unwrap();

            assert!(heap.new_string("no room").is_err());
            assert!(heap.new_float_in(frame, 1.0).is_err());
            assert_eq!(heap.object_count(), 2);
            assert_eq!(heap.frame(frame).unwrap().len(), 1);

            // Collecting the unrooted array makes room again.
            heap.collect().unwrap();
            heap.new_string_in(frame, "room").unwrap();
            assert_eq!(heap.object_count(), 2);
        });
    }

    proptest!
    {
        /// Each entry of `shapes` describes one object:
        /// an integer if it has no slots, otherwise an array
        /// whose slots reference the objects with the given indices.
        #[test]
        fn survivors_are_exactly_the_reachable_objects(
            shapes in vec_of(vec_of(of(0usize .. 32), 0 .. 4), 1 .. 32),
            roots in vec_of(0usize .. 32, 0 .. 4)
        )
        {
            let n = shapes.len();

            let mut reachable = vec![false; n];
            let mut pending: Vec<usize> = roots.iter().map(|r| r % n).collect();
            while let Some(i) = pending.pop() {
                if !reachable[i] {
                    reachable[i] = true;
                    pending.extend(shapes[i].iter().flatten().map(|t| t % n));
                }
            }
            let expected = reachable.iter().filter(|&&r| r).count();

            Heap::with_new(|heap| {
                let frame = heap.new_frame().unwrap();

                let mut objects = Vec::new();
                for (i, slots) in shapes.iter().enumerate() {
                    let object = if slots.is_empty() {
                        heap.new_integer(i as i32).unwrap()
                    } else {
                        heap.new_array(slots.len()).unwrap()
                    };
                    objects.push(object);
                }

                for (i, slots) in shapes.iter().enumerate() {
                    for (index, target) in slots.iter().enumerate() {
                        if let Some(target) = target {
                            heap.array_set(objects[i], index, objects[target % n]).unwrap();
                        }
                    }
                }

                for root in &roots {
                    heap.reference(frame, objects[root % n]).unwrap();
                }

                let cycle = heap.collect().unwrap();
                assert_eq!(cycle.survived, expected);
                assert_eq!(cycle.freed, n - expected);
                assert_eq!(heap.object_count(), expected);

                for (i, &object) in objects.iter().enumerate() {
                    assert_eq!(heap.is_live(object), reachable[i]);
                    if let Some(object) = heap.get(object) {
                        assert!(!object.is_marked());
                    }
                }

                let again = heap.collect().unwrap();
                assert_eq!(again, CollectStats{survived: expected, freed: 0});
            });
        }
    }
}
