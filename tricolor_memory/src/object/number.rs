use crate::error::AllocError;
use super::Value;

alloc_methods!
{
    //! numbers

    /// Create an object holding a 32-bit signed integer.
    #[rooted_alias = new_integer_in]
    pub fn new_integer(&mut self, value: i32)
        -> Result<ObjectRef<'h>, AllocError>
    {
        self.alloc(Value::Integer(value))
    }

    /// Create an object holding a 32-bit float.
    #[rooted_alias = new_float_in]
    pub fn new_float(&mut self, value: f32)
        -> Result<ObjectRef<'h>, AllocError>
    {
        self.alloc(Value::Float(value))
    }
}
