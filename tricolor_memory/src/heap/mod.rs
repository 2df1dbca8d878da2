//! Memory allocation and garbage collection.
//!
//! # Handles
//!
//! Objects and frames are never handed out by pointer.
//! Instead the heap hands out small copyable handles.
//! A handle whose object has been collected (or whose frame has been popped)
//! is *stale*; every operation treats a stale handle as absent.
//!
//! | Handle type   | Refers to           | Becomes stale when        |
//! |---------------|---------------------|---------------------------|
//! | [`ObjectRef`] | An object           | The object is collected   |
//! | [`FrameRef`]  | A frame of roots    | The frame is popped       |
//!
//! Both handle types are branded with the lifetime of their heap,
//! so handles of one heap can not be passed to another.

pub use self::collect::*;
pub use self::frame::*;
pub use self::handle::*;
pub use self::heap::*;

// The order of these declarations influences
// the order of the Heap impls in in rustdoc.
mod heap;
mod alloc;
mod frame;
mod collect;

mod handle;
