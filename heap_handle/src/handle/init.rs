use super::AtomicSharedHandle;
use super::Counter;
use super::ExclusiveHandle;
use super::SharedHandle;

use alloc::boxed::Box;

/// Handles that can allocate their own resource.
///
/// Allocating through a handle means application code
/// never holds a resource that has yet to be wrapped.
/// The new handle is the only owner of the resource.
pub trait Init<T>: Sized
{
    /// Move the value to the heap and wrap it in a new handle.
    fn init(value: T) -> Self;
}

impl<T> Init<T> for ExclusiveHandle<T>
{
    #[inline]
    fn init(value: T) -> Self
    {
        Self::from_box(Box::new(value))
    }
}

impl<T, C: Counter> Init<T> for SharedHandle<T, C>
{
    #[inline]
    fn init(value: T) -> Self
    {
        Self::from_box(Box::new(value))
    }
}

/// Allocate a resource and wrap it in a handle of the inferred kind.
///
/// # Examples
///
/// ```
/// # use heap_handle::{init, ExclusiveHandle, SharedHandle};
/// let exclusive: ExclusiveHandle<u32> = init(1);
/// let shared: SharedHandle<u32> = init(2);
/// assert_eq!(*exclusive + *shared, 3);
/// assert_eq!(SharedHandle::count(&shared), 1);
/// ```
#[inline]
pub fn init<H, T>(value: T) -> H
    where H: Init<T>
{
    H::init(value)
}

/// Like [`init`], but compute the resource with the given function.
#[inline]
pub fn init_with<H, T, F>(make: F) -> H
    where H: Init<T>, F: FnOnce() -> T
{
    H::init(make())
}

/// Generates, for each handle kind, a function that
/// allocates the given value and one that allocates
/// the value returned by the given function.
macro_rules! init_functions
{
    (
        $(
            $(#[doc = $doc:expr])*
            #[with = $with_name:ident]
            pub fn $name:ident() -> $handle:ident;
        )*
    ) => {
        $(
            $(#[doc = $doc])*
            #[inline]
            pub fn $name<T>(value: T) -> $handle<T>
            {
                init(value)
            }

            $(#[doc = $doc])*
            ///
            /// The value is computed by `make`.
            #[inline]
            pub fn $with_name<T, F>(make: F) -> $handle<T>
                where F: FnOnce() -> T
            {
                init_with(make)
            }
        )*
    };
}

init_functions!
{
    /// Allocate a resource owned by a new exclusive handle.
    #[with = init_exclusive_with]
    pub fn init_exclusive() -> ExclusiveHandle;

    /// Allocate a resource owned by a new shared handle,
    /// with a count of one.
    #[with = init_shared_with]
    pub fn init_shared() -> SharedHandle;

    /// Allocate a resource owned by a new atomic shared handle,
    /// with a count of one.
    #[with = init_atomic_shared_with]
    pub fn init_atomic_shared() -> AtomicSharedHandle;
}

#[cfg(test)]
mod tests
{
    use super::*;
    use super::super::testing::Drops;

    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn exclusive_is_sole_owner()
    {
        let drops = Drops::new();
        let handle = init_exclusive(drops.resource(3));
        assert_eq!(handle.value, 3);
        drop(handle);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn shared_starts_at_one()
    {
        let drops = Drops::new();
        let handle = init_shared_with(|| drops.resource(4));
        assert_eq!(SharedHandle::count(&handle), 1);
        assert_eq!(handle.value, 4);
        drop(handle);
        assert_eq!(drops.get(), 1);

        let atomic = init_atomic_shared(String::from("atomic"));
        assert_eq!(AtomicSharedHandle::count(&atomic), 1);
        assert_eq!(atomic.as_str(), "atomic");
    }

    #[test]
    fn kind_chosen_by_type()
    {
        let exclusive: ExclusiveHandle<Vec<u8>> = init_with(|| vec![1, 2, 3]);
        let shared: SharedHandle<Vec<u8>> = init(vec![4]);
        let copy = shared.clone();
        assert_eq!(exclusive.len() + copy.len(), 4);
        assert_eq!(SharedHandle::count(&shared), 2);

        let exclusive = init_exclusive_with(|| 5u8);
        let atomic = init_atomic_shared_with(|| 6u8);
        assert_eq!(*exclusive + *atomic, 11);
    }
}
