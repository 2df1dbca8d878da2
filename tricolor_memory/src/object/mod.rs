//! In-memory representation of objects.

use crate::heap::ObjectRef;

use alloc::boxed::Box;
use bitflags::bitflags;

mod array;
mod number;
mod string;

/// In-memory representation of an object.
///
/// Objects live in the arena of their heap
/// and are only ever handed out by reference.
#[derive(Debug)]
pub struct Object<'h>
{
    /// See [`Flags`].
    pub flags: Flags,

    /// See [`Value`].
    pub value: Value<'h>,
}

impl<'h> Object<'h>
{
    pub (crate) fn new(value: Value<'h>) -> Self
    {
        Self{flags: Flags::empty(), value}
    }

    /// Whether the [`MARKED`][`Flags::MARKED`] flag is set.
    #[inline]
    pub fn is_marked(&self) -> bool
    {
        self.flags.contains(Flags::MARKED)
    }

    /// The kind of the object.
    #[inline]
    pub fn kind(&self) -> Kind
    {
        self.value.kind()
    }
}

/// Determines which variant of [`Value`] an object holds.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind
{
    Integer,
    Float,
    String,
    Array,
}

/// The payload of an object.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'h>
{
    /// A 32-bit signed integer.
    Integer(i32),

    /// A 32-bit float.
    Float(f32),

    /// A byte string owned by the object.
    String(Box<[u8]>),

    /// A fixed number of slots, each of which may reference another object.
    ///
    /// The array does not own the objects it references;
    /// any number of arrays and frames may reference the same object.
    Array(Box<[Option<ObjectRef<'h>>]>),
}

impl<'h> Value<'h>
{
    /// The kind of the value.
    pub fn kind(&self) -> Kind
    {
        match self {
            Self::Integer(_) => Kind::Integer,
            Self::Float(_)   => Kind::Float,
            Self::String(_)  => Kind::String,
            Self::Array(_)   => Kind::Array,
        }
    }

    /// If the value is an integer, return it.
    pub fn as_integer(&self) -> Option<i32>
    {
        match *self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// If the value is a float, return it.
    pub fn as_float(&self) -> Option<f32>
    {
        match *self {
            Self::Float(value) => Some(value),
            _ => None,
        }
    }

    /// If the value is a string, return its bytes.
    pub fn as_bytes(&self) -> Option<&[u8]>
    {
        match self {
            Self::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// If the value is an array, return its slots.
    pub fn as_array(&self) -> Option<&[Option<ObjectRef<'h>>]>
    {
        match self {
            Self::Array(slots) => Some(slots),
            _ => None,
        }
    }
}

bitflags!
{
    /// Various flags that an object may have.
    pub struct Flags: u8
    {
        /// Used during a garbage collection cycle.
        ///
        /// Set on objects that are reachable from roots.
        /// Cleared again by the sweep, so it is never set
        /// on any object outside of a collection cycle.
        const MARKED = 1 << 0;
    }
}
