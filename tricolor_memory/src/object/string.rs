use crate::error::AllocError;
use super::Value;

use alloc::vec::Vec;

alloc_methods!
{
    //! strings

    /// Create a string object holding a copy of the given bytes.
    ///
    /// The object owns its copy;
    /// the caller remains free to reuse or drop the original.
    #[rooted_alias = new_string_in]
    pub fn new_string(&mut self, bytes: impl AsRef<[u8]>)
        -> Result<ObjectRef<'h>, AllocError>
    {
        let bytes = bytes.as_ref();
        let mut copy = Vec::new();
        copy.try_reserve_exact(bytes.len())?;
        copy.extend_from_slice(bytes);
        self.alloc(Value::String(copy.into_boxed_slice()))
    }
}
