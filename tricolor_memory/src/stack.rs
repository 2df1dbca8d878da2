//! Growable last-in-first-out container.

use crate::error::AllocError;

use alloc::vec::Vec;
use core::iter::Flatten;
use core::slice;

/// Growable stack of entries, some of which may be tombstones.
///
/// The same container serves as the object registry,
/// the frame stack, the root list of each frame,
/// and the gray worklist of the collector.
/// The registry uses it as an unordered collection
/// whose iteration order is the order of insertion;
/// the worklist uses it as a proper stack.
///
/// Growth never aborts the process.
/// When the allocator refuses to grow the stack,
/// [`push`][`Self::push`] reports an [`AllocError`]
/// and the stack is left exactly as it was.
///
/// Entries can be replaced by tombstones with [`tombstone`][`Self::tombstone`]
/// and later removed all at once with [`compact`][`Self::compact`].
#[derive(Debug)]
pub struct Stack<T>
{
    entries: Vec<Option<T>>,

    /// Capacity to grow to the first time the stack grows.
    initial_capacity: usize,
}

impl<T> Stack<T>
{
    /// Create an empty stack without allocating.
    pub const fn new() -> Self
    {
        Self::with_initial_capacity(0)
    }

    /// Create an empty stack without allocating.
    ///
    /// The first time the stack grows,
    /// it makes room for at least `initial_capacity` entries.
    pub const fn with_initial_capacity(initial_capacity: usize) -> Self
    {
        Self{entries: Vec::new(), initial_capacity}
    }

    /// The number of entries, tombstones included.
    #[inline]
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Whether the stack has no entries at all.
    #[inline]
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// The number of entries the stack can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize
    {
        self.entries.capacity()
    }

    /// Make sure `additional` more entries can be pushed without growing.
    ///
    /// When the stack must grow, its capacity is at least doubled.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError>
    {
        let spare = self.entries.capacity() - self.entries.len();
        if additional <= spare {
            return Ok(());
        }

        let doubled = self.entries.capacity().saturating_mul(2);
        let target = doubled.max(self.initial_capacity);
        let grow = target.saturating_sub(self.entries.len()).max(additional);
        self.entries.try_reserve_exact(grow)?;
        Ok(())
    }

    /// Push an entry onto the stack, growing it if needed.
    pub fn push(&mut self, value: T) -> Result<(), AllocError>
    {
        self.reserve(1)?;
        self.push_reserved(value);
        Ok(())
    }

    /// Push an entry for which room was made with [`reserve`][`Self::reserve`].
    #[inline]
    pub (crate) fn push_reserved(&mut self, value: T)
    {
        debug_assert!(self.entries.len() < self.entries.capacity());
        self.entries.push(Some(value));
    }

    /// Remove and return the most recently pushed entry.
    ///
    /// Tombstones on top of the stack are discarded along the way.
    /// If the stack is empty, this method returns [`None`].
    pub fn pop(&mut self) -> Option<T>
    {
        while let Some(entry) = self.entries.pop() {
            if entry.is_some() {
                return entry;
            }
        }
        None
    }

    /// The most recently pushed entry, if it is not a tombstone.
    #[inline]
    pub fn last(&self) -> Option<&T>
    {
        self.entries.last().and_then(Option::as_ref)
    }

    /// Retrieve the entry at the given index.
    ///
    /// Returns [`None`] for tombstones and indices out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T>
    {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Like [`get`][`Self::get`], but mutable.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T>
    {
        self.entries.get_mut(index).and_then(Option::as_mut)
    }

    /// Replace the entry at the given index with a tombstone.
    ///
    /// The entry is returned.
    /// The length of the stack does not change
    /// until [`compact`][`Self::compact`] is called.
    pub fn tombstone(&mut self, index: usize) -> Option<T>
    {
        self.entries.get_mut(index).and_then(Option::take)
    }

    /// Remove all tombstones.
    ///
    /// The remaining entries keep their relative order.
    /// Capacity is kept for reuse.
    pub fn compact(&mut self)
    {
        self.entries.retain(Option::is_some);
    }

    /// Iterate over the entries in order of insertion, skipping tombstones.
    #[inline]
    pub fn iter(&self) -> Iter<T>
    {
        self.entries.iter().flatten()
    }
}

/// Iterator returned by [`Stack::iter`].
pub type Iter<'a, T> = Flatten<slice::Iter<'a, Option<T>>>;

impl<T> Default for Stack<T>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Stack<T>
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}
