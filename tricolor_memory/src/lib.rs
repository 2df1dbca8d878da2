//! This crate implements a small garbage collected object heap.
//!
//! Objects are integers, floats, strings and arrays of references.
//! Frames hold the roots; [`Heap::collect`][`heap::Heap::collect`]
//! reclaims every object that no frame can reach.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
extern crate core;

#[macro_use] mod macros;

pub mod error;
pub mod heap;
pub mod object;
pub mod stack;
