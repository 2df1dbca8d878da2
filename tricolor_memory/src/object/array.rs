use crate::error::AccessError;
use crate::error::AllocError;
use crate::heap::Heap;
use crate::heap::ObjectRef;
use super::Value;

use alloc::vec::Vec;

alloc_methods!
{
    //! arrays

    /// Create an array with the given number of slots, all empty.
    ///
    /// The size of an array never changes,
    /// but its slots can be assigned with [`array_set`][`Heap::array_set`].
    #[rooted_alias = new_array_in]
    pub fn new_array(&mut self, size: usize)
        -> Result<ObjectRef<'h>, AllocError>
    {
        let mut slots = Vec::new();
        slots.try_reserve_exact(size)?;
        slots.resize(size, None);
        self.alloc(Value::Array(slots.into_boxed_slice()))
    }
}

/// Methods for accessing arrays.
impl<'h> Heap<'h>
{
    /// Get the number of slots of an array.
    ///
    /// If the handle is stale or the object is not an array,
    /// this method returns [`None`].
    pub fn array_len(&self, array: ObjectRef<'h>) -> Option<usize>
    {
        let slots = self.value(array)?.as_array()?;
        Some(slots.len())
    }

    /// Get the object referenced by a slot of an array.
    ///
    /// If the handle is stale, the object is not an array,
    /// the index is out of bounds, or the slot is empty,
    /// this method returns [`None`].
    pub fn array_get(&self, array: ObjectRef<'h>, index: usize)
        -> Option<ObjectRef<'h>>
    {
        let slots = self.value(array)?.as_array()?;
        slots.get(index).copied().flatten()
    }

    /// Make a slot of an array reference the given object.
    ///
    /// Whatever the slot referenced before is simply forgotten;
    /// it will be collected if nothing else keeps it alive.
    /// If either handle is stale, the object is not an array,
    /// or the index is out of bounds, nothing happens
    /// and an error is returned.
    pub fn array_set(
        &mut self,
        array: ObjectRef<'h>,
        index: usize,
        value: ObjectRef<'h>,
    ) -> Result<(), AccessError>
    {
        if !self.is_live(value) {
            return Err(AccessError::StaleObject);
        }

        let object = self.get_mut(array).ok_or(AccessError::StaleObject)?;
        match &mut object.value {
            Value::Array(slots) => {
                let len = slots.len();
                let slot = slots.get_mut(index)
                    .ok_or(AccessError::OutOfBounds{index, len})?;
                *slot = Some(value);
                Ok(())
            },
            other => Err(AccessError::NotAnArray{kind: other.kind()}),
        }
    }
}
