use crate::error::EmptyHandleError;
use super::AtomicCount;
use super::Counter;
use super::EMPTY_DEREF;
use super::LocalCount;

use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr;
use core::ptr::NonNull;
use log::trace;
use scopeguard::defer;

/// Resource and counter that a non-empty shared handle points to.
///
/// Both are separate heap allocations.
/// The counter holds the number of handles with the same binding.
struct Binding<T, C>
{
    resource: NonNull<T>,
    counter: NonNull<C>,
}

impl<T, C> Clone for Binding<T, C>
{
    fn clone(&self) -> Self
    {
        *self
    }
}

impl<T, C> Copy for Binding<T, C>
{
}

impl<T, C: Counter> Binding<T, C>
{
    /// Access the counter.
    ///
    /// # Safety
    ///
    /// The binding must be held by a live handle,
    /// which keeps the counter allocated.
    #[inline]
    unsafe fn counter<'a>(self) -> &'a C
    {
        &*self.counter.as_ptr()
    }
}

/// One of any number of owners of a resource on the heap.
///
/// Cloning a shared handle creates another owner of the same resource.
/// The owners share a counter, which is allocated separately
/// and holds the number of owners of the resource.
/// When an owner is dropped or overwritten, it decrements the counter,
/// and the owner that brings the count to zero
/// releases both the resource and the counter.
///
/// The counter type `C` decides whether handles may cross threads.
/// With the default [`LocalCount`], they may not;
/// see [`AtomicSharedHandle`] for handles that may.
///
/// # Examples
///
/// ```
/// # use heap_handle::SharedHandle;
/// let a = SharedHandle::<String>::from_box(Box::new(String::from("hello")));
/// let b = a.clone();
/// assert_eq!(SharedHandle::count(&a), 2);
/// drop(a);
/// assert_eq!(SharedHandle::count(&b), 1);
/// assert_eq!(*b, "hello");
/// ```
pub struct SharedHandle<T, C: Counter = LocalCount>
{
    binding: Option<Binding<T, C>>,

    /// Tells the drop checker that we may drop a `T`.
    _owns: PhantomData<T>,
}

/// Shared handle whose counter is updated atomically,
/// so that owners may live on different threads.
pub type AtomicSharedHandle<T> = SharedHandle<T, AtomicCount>;

// SAFETY: The counter is atomic, and any owner may drop or borrow the
//         resource, hence requiring both Send and Sync, as does Arc.
unsafe impl<T: Send + Sync> Send for SharedHandle<T, AtomicCount> {}
unsafe impl<T: Send + Sync> Sync for SharedHandle<T, AtomicCount> {}

impl<T, C: Counter> SharedHandle<T, C>
{
    /// Create a handle that owns nothing.
    ///
    /// No counter is allocated until the handle is bound to a resource;
    /// the count of an empty handle reads as zero.
    #[inline]
    pub const fn empty() -> Self
    {
        Self{binding: None, _owns: PhantomData}
    }

    /// Take ownership of a boxed resource.
    ///
    /// A new counter is allocated, with a count of one.
    pub fn from_box(resource: Box<T>) -> Self
    {
        let counter = Box::new(C::new(1));

        // SAFETY: Box::into_raw never returns null.
        let binding = unsafe {
            Binding{
                resource: NonNull::new_unchecked(Box::into_raw(resource)),
                counter: NonNull::new_unchecked(Box::into_raw(counter)),
            }
        };

        Self{binding: Some(binding), _owns: PhantomData}
    }

    /// Take ownership of a resource given by pointer.
    ///
    /// A null pointer results in an empty handle.
    ///
    /// # Safety
    ///
    /// A non-null pointer must have been obtained from [`Box::into_raw`],
    /// and nothing else may use or release the resource afterwards.
    pub unsafe fn from_raw(resource: *mut T) -> Self
    {
        if resource.is_null() {
            Self::empty()
        } else {
            Self::from_box(Box::from_raw(resource))
        }
    }

    /// Whether the handle owns nothing.
    #[inline]
    pub fn is_empty(this: &Self) -> bool
    {
        this.binding.is_none()
    }

    /// Number of handles that own the resource, this one included.
    ///
    /// Empty handles own nothing, so their count is zero.
    #[inline]
    pub fn count(this: &Self) -> usize
    {
        match this.binding {
            // SAFETY: This handle is live.
            Some(binding) => unsafe { binding.counter().get() },
            None => 0,
        }
    }

    /// Pointer to the resource, or null if the handle is empty.
    ///
    /// The pointer is valid as long as any owner of the resource is.
    #[inline]
    pub fn as_ptr(this: &Self) -> *const T
    {
        match this.binding {
            Some(binding) => binding.resource.as_ptr(),
            None => ptr::null(),
        }
    }

    /// Whether both handles own the same resource,
    /// or are both empty.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool
    {
        Self::as_ptr(this) == Self::as_ptr(other)
    }

    /// Borrow the resource, if there is one.
    #[inline]
    pub fn get(this: &Self) -> Option<&T>
    {
        // SAFETY: This handle keeps the resource alive.
        this.binding.map(|binding| unsafe { &*binding.resource.as_ptr() })
    }

    /// Like [`get`][`Self::get`], but report an error when empty.
    #[inline]
    pub fn try_get(this: &Self) -> Result<&T, EmptyHandleError>
    {
        Self::get(this).ok_or(EmptyHandleError)
    }

    /// Borrow the resource without checking that there is one.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    /// In debug mode, an empty handle causes a panic.
    #[inline]
    pub unsafe fn get_unchecked(this: &Self) -> &T
    {
        debug_assert!(!Self::is_empty(this), "{}", EMPTY_DEREF);
        &*Self::as_ptr(this)
    }

    /// Mutably borrow the resource,
    /// provided that this handle is its only owner.
    pub fn get_mut(this: &mut Self) -> Option<&mut T>
    {
        match this.binding {
            // SAFETY: No other handle can observe the resource.
            Some(binding) if Self::count(this) == 1 =>
                Some(unsafe { &mut *binding.resource.as_ptr() }),
            _ => None,
        }
    }

    /// Move the resource out into a new handle,
    /// leaving this handle empty.
    ///
    /// The count does not change, as the number of owners does not change.
    #[inline]
    pub fn take(this: &mut Self) -> Self
    {
        Self{binding: this.binding.take(), _owns: PhantomData}
    }

    /// Move the ownership of `source` into `this`.
    ///
    /// `this` first gives up what it owned before, if anything,
    /// exactly as when it is dropped.
    /// Afterwards, `source` is empty and the count of
    /// the resource it owned is unchanged.
    pub fn move_from(this: &mut Self, source: &mut Self)
    {
        Self::reset(this);
        this.binding = source.binding.take();
    }

    /// Give up ownership of the resource, leaving the handle empty.
    ///
    /// The counter is decremented, and if this was the last owner,
    /// the resource and the counter are released.
    /// Does nothing if the handle is already empty.
    pub fn reset(this: &mut Self)
    {
        // Empty the handle first, so that it cannot decrement twice
        // even if releasing the resource panics.
        let binding = match this.binding.take() {
            Some(binding) => binding,
            None => return,
        };

        // SAFETY: The handle was live and counted as an owner.
        let remaining = unsafe { binding.counter().decrement() };
        if remaining != 0 {
            return;
        }

        trace!("last owner releasing shared resource at {:p}", binding.resource);

        // SAFETY: No other handle remains, and both allocations came from a Box.
        unsafe {
            defer! { drop(Box::from_raw(binding.counter.as_ptr())); }
            drop(Box::from_raw(binding.resource.as_ptr()));
        }
    }

    /// Move the resource out of the heap,
    /// provided that this handle is its only owner.
    ///
    /// Otherwise, the handle is returned unchanged.
    /// An empty handle is also returned unchanged.
    pub fn try_unwrap(mut this: Self) -> Result<T, Self>
    {
        match this.binding {
            Some(binding) if Self::count(&this) == 1 => {
                this.binding = None;
                // SAFETY: No other handle remains; both came from a Box.
                unsafe {
                    drop(Box::from_raw(binding.counter.as_ptr()));
                    Ok(*Box::from_raw(binding.resource.as_ptr()))
                }
            },
            _ => Err(this),
        }
    }

    /// Whether both handles share the same counter.
    #[inline]
    fn shares_counter(this: &Self, other: &Self) -> bool
    {
        let this = this.binding.map(|binding| binding.counter);
        let other = other.binding.map(|binding| binding.counter);
        this == other
    }
}

impl<T, C: Counter> Clone for SharedHandle<T, C>
{
    fn clone(&self) -> Self
    {
        if let Some(binding) = self.binding {
            // SAFETY: This handle is live.
            unsafe { binding.counter().increment(); }
        }
        Self{binding: self.binding, _owns: PhantomData}
    }

    /// Make this handle an owner of the resource `source` owns.
    ///
    /// Does nothing if both handles already share a counter.
    /// Otherwise this handle first gives up what it owned before.
    fn clone_from(&mut self, source: &Self)
    {
        if Self::shares_counter(self, source) {
            return;
        }

        Self::reset(self);

        if let Some(binding) = source.binding {
            // SAFETY: The source handle is live.
            unsafe { binding.counter().increment(); }
        }
        self.binding = source.binding;
    }
}

impl<T, C: Counter> Drop for SharedHandle<T, C>
{
    fn drop(&mut self)
    {
        Self::reset(self);
    }
}

impl<T, C: Counter> Default for SharedHandle<T, C>
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl<T, C: Counter> From<Box<T>> for SharedHandle<T, C>
{
    fn from(resource: Box<T>) -> Self
    {
        Self::from_box(resource)
    }
}

/// Dereferencing an empty handle panics.
impl<T, C: Counter> Deref for SharedHandle<T, C>
{
    type Target = T;

    fn deref(&self) -> &T
    {
        match Self::get(self) {
            Some(resource) => resource,
            None => panic!("{}", EMPTY_DEREF),
        }
    }
}

impl<T: fmt::Debug, C: Counter> fmt::Debug for SharedHandle<T, C>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match Self::get(self) {
            Some(resource) =>
                f.debug_struct("SharedHandle")
                    .field("resource", resource)
                    .field("count", &Self::count(self))
                    .finish(),
            None => f.write_str("SharedHandle(Empty)"),
        }
    }
}
