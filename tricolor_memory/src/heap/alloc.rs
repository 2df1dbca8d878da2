use crate::error::AllocError;
use crate::object::Object;
use crate::object::Value;
use super::Heap;
use super::ObjectRef;
use super::heap::Slot;

impl<'h> Heap<'h>
{
    /// Move a value into the arena and register it as a new object.
    ///
    /// The new object is not marked and not referenced from any frame.
    ///
    /// You would not normally use this method.
    /// Instead use one of the `new_*` methods.
    /// They will build the value for you
    /// and are therefore more convenient to use.
    ///
    /// All memory this needs is obtained before anything is modified.
    /// So if allocation fails, the value is dropped
    /// and the heap is left exactly as it was.
    pub (crate) fn alloc(&mut self, value: Value<'h>)
        -> Result<ObjectRef<'h>, AllocError>
    {
        if let Some(limit) = self.config.object_limit {
            if self.registry.len() >= limit {
                return Err(AllocError::LimitExceeded{limit});
            }
        }

        self.registry.reserve(1)?;

        let index = match self.free.last() {
            Some(&index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| {
                    AllocError::LimitExceeded{limit: u32::MAX as usize}
                })?;
                self.slots.try_reserve(1)?;
                // Room for every slot, including the new one, to become vacant.
                self.free.reserve(self.slots.len() + 1 - self.free.len())?;
                index
            },
        };

        // Nothing below can fail.

        if self.free.pop().is_none() {
            self.slots.push(Slot{generation: 0, object: None});
        }

        let slot = &mut self.slots[index as usize];
        slot.object = Some(Object::new(value));

        let object = ObjectRef::new(index, slot.generation);
        self.registry.push_reserved(object);
        Ok(object)
    }
}
