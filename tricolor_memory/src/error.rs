//! Errors reported by heap operations.
//!
//! There are exactly two kinds of failure.
//! An [`AllocError`] means that memory could not be obtained;
//! the operation that raised it has left the heap untouched.
//! An [`AccessError`] means that an argument was unusable
//! (a stale handle, the wrong kind of object, an index out of bounds);
//! again, nothing was mutated.

use crate::object::Kind;

use alloc::collections::TryReserveError;
use thiserror::Error;

/// Raised when memory for an object, a frame,
/// or a stack entry could not be obtained.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AllocError
{
    /// The global allocator refused to grow a container.
    #[error("out of memory")]
    OutOfMemory(#[from] TryReserveError),

    /// The heap already holds as many objects as it is configured to.
    #[error("object limit of {limit} reached")]
    LimitExceeded
    {
        /// The configured limit.
        limit: usize,
    },
}

/// Raised when an argument can not be used for the requested operation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AccessError
{
    /// The object handle refers to an object that has been collected.
    #[error("object has been collected")]
    StaleObject,

    /// The frame handle refers to a frame that has been popped.
    #[error("frame has been popped")]
    StaleFrame,

    /// The object is not an array.
    #[error("expected an array, found {kind:?}")]
    NotAnArray
    {
        /// The kind of the object that was passed instead.
        kind: Kind,
    },

    /// The index is not below the size of the array.
    #[error("index {index} out of bounds for array of size {len}")]
    OutOfBounds
    {
        /// The offending index.
        index: usize,

        /// The size of the array.
        len: usize,
    },
}

/// Either kind of error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error
{
    #[allow(missing_docs)]
    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Access(#[from] AccessError),
}
