//! Combine the blazing speed of a bare [`Cell<usize>`]
//! with underflow checks that only exist in debug builds.

#![no_std]
#![warn(missing_docs)]

use core::cell::Cell;

/// Unsynchronized counter.
///
/// Increments are always checked,
/// as an overflowing count would let owners outlive what they count.
/// Decrements are checked only when debug assertions are enabled.
pub struct CountCell
{
    inner: Cell<usize>,
}

impl CountCell
{
    /// Create a new cell holding the given count.
    pub const fn new(value: usize) -> Self
    {
        Self{inner: Cell::new(value)}
    }

    /// Read the current count.
    #[inline]
    pub fn get(&self) -> usize
    {
        self.inner.get()
    }

    /// Add one to the count.
    ///
    /// # Panics
    ///
    /// Panics if the count is already [`usize::MAX`].
    /// The count is left unchanged in that case.
    #[inline]
    pub fn increment(&self)
    {
        let value = self.inner.get();
        match value.checked_add(1) {
            Some(next) => self.inner.set(next),
            None => panic!("count overflow"),
        }
    }

    /// Subtract one from the count and return the new count.
    ///
    /// # Safety
    ///
    /// The count must not be zero.
    /// In debug mode, such a condition causes a panic.
    /// In release mode, the count wraps around
    /// and any owner relying on it is left dangling.
    #[inline]
    pub unsafe fn decrement(&self) -> usize
    {
        let next = self.decrement_internal();
        self.inner.set(next);
        next
    }

    #[cfg(debug_assertions)]
    fn decrement_internal(&self) -> usize
    {
        match self.inner.get().checked_sub(1) {
            Some(next) => next,
            None => panic!("count underflow"),
        }
    }

    #[cfg(not(debug_assertions))]
    fn decrement_internal(&self) -> usize
    {
        self.inner.get().wrapping_sub(1)
    }
}
