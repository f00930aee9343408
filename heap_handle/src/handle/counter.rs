use core::sync::atomic::AtomicUsize;
use core::sync::atomic::Ordering;
use core::sync::atomic::fence;
use count_cell::CountCell;

/// Number of owners of a shared resource.
///
/// A counter lives in its own heap allocation,
/// next to the resource it counts the owners of.
/// Every [`SharedHandle`] bound to the resource points to it.
///
/// # Safety
///
/// Implementations must count exactly:
/// [`decrement`][`Self::decrement`] must return zero
/// only once all increments and the initial count have been matched.
/// Shared handles rely on this to release the resource exactly once.
///
/// [`SharedHandle`]: `super::SharedHandle`
pub unsafe trait Counter
{
    /// Create a counter holding the given count.
    fn new(value: usize) -> Self;

    /// Read the current count.
    fn get(&self) -> usize;

    /// Add one to the count.
    ///
    /// Panics instead of overflowing.
    fn increment(&self);

    /// Subtract one from the count and return the new count.
    ///
    /// # Safety
    ///
    /// The count must not be zero.
    unsafe fn decrement(&self) -> usize;
}

/// Counter without any synchronization.
///
/// This is the counter of [`SharedHandle`].
/// Handles using it are neither [`Send`] nor [`Sync`].
///
/// [`SharedHandle`]: `super::SharedHandle`
pub struct LocalCount
{
    cell: CountCell,
}

unsafe impl Counter for LocalCount
{
    #[inline]
    fn new(value: usize) -> Self
    {
        Self{cell: CountCell::new(value)}
    }

    #[inline]
    fn get(&self) -> usize
    {
        self.cell.get()
    }

    #[inline]
    fn increment(&self)
    {
        self.cell.increment();
    }

    #[inline]
    unsafe fn decrement(&self) -> usize
    {
        self.cell.decrement()
    }
}

/// Counter updated with atomic instructions.
///
/// This is the counter of [`AtomicSharedHandle`].
///
/// [`AtomicSharedHandle`]: `super::AtomicSharedHandle`
pub struct AtomicCount
{
    atomic: AtomicUsize,
}

/// Above this count, increments panic.
/// Leaves room for other threads that have already incremented.
const MAX_ATOMIC_COUNT: usize = isize::MAX as usize;

unsafe impl Counter for AtomicCount
{
    #[inline]
    fn new(value: usize) -> Self
    {
        Self{atomic: AtomicUsize::new(value)}
    }

    #[inline]
    fn get(&self) -> usize
    {
        self.atomic.load(Ordering::Acquire)
    }

    #[inline]
    fn increment(&self)
    {
        // A new owner is derived from an existing one,
        // so no ordering with other owners is needed here.
        let previous = self.atomic.fetch_add(1, Ordering::Relaxed);
        if previous > MAX_ATOMIC_COUNT {
            self.atomic.fetch_sub(1, Ordering::Relaxed);
            panic!("count overflow");
        }
    }

    #[inline]
    unsafe fn decrement(&self) -> usize
    {
        let previous = self.atomic.fetch_sub(1, Ordering::Release);
        debug_assert!(previous != 0, "count underflow");
        if previous == 1 {
            // Uses of the resource by other owners
            // happen before the last owner releases it.
            fence(Ordering::Acquire);
        }
        previous - 1
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn count_down<C: Counter>()
    {
        let counter = C::new(1);
        counter.increment();
        assert_eq!(counter.get(), 2);
        assert_eq!(unsafe { counter.decrement() }, 1);
        assert_eq!(unsafe { counter.decrement() }, 0);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn local_count_down()
    {
        count_down::<LocalCount>();
    }

    #[test]
    fn atomic_count_down()
    {
        count_down::<AtomicCount>();
    }

    #[test]
    #[should_panic(expected = "count overflow")]
    fn atomic_overflow()
    {
        let counter = AtomicCount::new(MAX_ATOMIC_COUNT + 1);
        counter.increment();
    }
}
