use crate::error::EmptyHandleError;
use super::EMPTY_DEREF;

use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ops::DerefMut;
use core::ptr;
use core::ptr::NonNull;
use log::trace;

/// Sole owner of a resource on the heap.
///
/// The resource is released when the handle is dropped,
/// or when another resource is moved into the handle.
/// Exclusive handles cannot be duplicated;
/// ownership can only be moved from one handle to another.
///
/// Apart from its constructors, the handle has associated functions
/// rather than methods, so that methods of the resource
/// are never shadowed when called through [`Deref`].
///
/// ```
/// # use heap_handle::ExclusiveHandle;
/// let mut slot = ExclusiveHandle::from_box(Box::new(Some(5)));
/// assert_eq!(slot.take(), Some(5));
/// assert!(!ExclusiveHandle::is_empty(&slot));
/// ```
///
/// ```compile_fail
/// # use heap_handle::ExclusiveHandle;
/// let a = ExclusiveHandle::from_box(Box::new(1));
/// let b = ExclusiveHandle::clone(&a);
/// ```
pub struct ExclusiveHandle<T>
{
    resource: Option<NonNull<T>>,

    /// Tells the drop checker that we own a `T`.
    _owns: PhantomData<T>,
}

// SAFETY: The handle owns its resource like a Box does.
unsafe impl<T: Send> Send for ExclusiveHandle<T> {}
unsafe impl<T: Sync> Sync for ExclusiveHandle<T> {}

impl<T> ExclusiveHandle<T>
{
    /// Create a handle that owns nothing.
    #[inline]
    pub const fn empty() -> Self
    {
        Self{resource: None, _owns: PhantomData}
    }

    /// Take ownership of a boxed resource.
    #[inline]
    pub fn from_box(resource: Box<T>) -> Self
    {
        // SAFETY: Box::into_raw never returns null.
        let resource = unsafe { NonNull::new_unchecked(Box::into_raw(resource)) };
        Self{resource: Some(resource), _owns: PhantomData}
    }

    /// Take ownership of a resource given by pointer.
    ///
    /// A null pointer results in an empty handle.
    ///
    /// # Safety
    ///
    /// A non-null pointer must have been obtained from [`Box::into_raw`],
    /// and nothing else may use or release the resource afterwards.
    #[inline]
    pub unsafe fn from_raw(resource: *mut T) -> Self
    {
        Self{resource: NonNull::new(resource), _owns: PhantomData}
    }

    /// Whether the handle owns nothing.
    #[inline]
    pub fn is_empty(this: &Self) -> bool
    {
        this.resource.is_none()
    }

    /// Pointer to the resource, or null if the handle is empty.
    ///
    /// The pointer is valid until the handle releases the resource.
    #[inline]
    pub fn as_ptr(this: &Self) -> *mut T
    {
        match this.resource {
            Some(resource) => resource.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Borrow the resource, if there is one.
    #[inline]
    pub fn get(this: &Self) -> Option<&T>
    {
        // SAFETY: The handle owns the resource.
        this.resource.map(|resource| unsafe { &*resource.as_ptr() })
    }

    /// Mutably borrow the resource, if there is one.
    #[inline]
    pub fn get_mut(this: &mut Self) -> Option<&mut T>
    {
        // SAFETY: The handle owns the resource, and is borrowed mutably.
        this.resource.map(|resource| unsafe { &mut *resource.as_ptr() })
    }

    /// Like [`get`][`Self::get`], but report an error when empty.
    #[inline]
    pub fn try_get(this: &Self) -> Result<&T, EmptyHandleError>
    {
        Self::get(this).ok_or(EmptyHandleError)
    }

    /// Like [`get_mut`][`Self::get_mut`], but report an error when empty.
    #[inline]
    pub fn try_get_mut(this: &mut Self) -> Result<&mut T, EmptyHandleError>
    {
        Self::get_mut(this).ok_or(EmptyHandleError)
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

    /// Mutably borrow the resource without checking that there is one.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    /// In debug mode, an empty handle causes a panic.
    #[inline]
    pub unsafe fn get_unchecked_mut(this: &mut Self) -> &mut T
    {
        debug_assert!(!Self::is_empty(this), "{}", EMPTY_DEREF);
        &mut *Self::as_ptr(this)
    }

    /// Move the resource out into a new handle,
    /// leaving this handle empty.
    #[inline]
    pub fn take(this: &mut Self) -> Self
    {
        Self{resource: this.resource.take(), _owns: PhantomData}
    }

    /// Move the resource of `source` into `this`.
    ///
    /// The resource `this` owned before, if any,
    /// is released before the transfer.
    /// Afterwards, `source` is empty.
    pub fn move_from(this: &mut Self, source: &mut Self)
    {
        Self::reset(this);
        this.resource = source.resource.take();
    }

    /// Release the resource now, leaving the handle empty.
    ///
    /// Does nothing if the handle is already empty.
    pub fn reset(this: &mut Self)
    {
        // Empty the handle first, so that a panicking
        // destructor cannot lead to a second release.
        if let Some(resource) = this.resource.take() {
            trace!("releasing exclusive resource at {:p}", resource);
            // SAFETY: The handle owned the resource, which came from a Box.
            unsafe { drop(Box::from_raw(resource.as_ptr())); }
        }
    }

    /// Give up ownership of the resource, returning it as a box.
    #[inline]
    pub fn into_box(mut this: Self) -> Option<Box<T>>
    {
        // SAFETY: The handle owned the resource, which came from a Box.
        this.resource.take().map(|resource| unsafe { Box::from_raw(resource.as_ptr()) })
    }

    /// Give up ownership of the resource, returning it as a pointer.
    ///
    /// The pointer is null if the handle was empty.
    /// Otherwise, the caller is responsible for releasing the resource,
    /// for instance by passing the pointer to [`from_raw`][`Self::from_raw`].
    #[inline]
    pub fn into_raw(mut this: Self) -> *mut T
    {
        match this.resource.take() {
            Some(resource) => resource.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

impl<T> Drop for ExclusiveHandle<T>
{
    fn drop(&mut self)
    {
        Self::reset(self);
    }
}

impl<T> Default for ExclusiveHandle<T>
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl<T> From<Box<T>> for ExclusiveHandle<T>
{
    fn from(resource: Box<T>) -> Self
    {
        Self::from_box(resource)
    }
}

/// Dereferencing an empty handle panics.
impl<T> Deref for ExclusiveHandle<T>
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

impl<T> DerefMut for ExclusiveHandle<T>
{
    fn deref_mut(&mut self) -> &mut T
    {
        match Self::get_mut(self) {
            Some(resource) => resource,
            None => panic!("{}", EMPTY_DEREF),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match Self::get(self) {
            Some(resource) => f.debug_tuple("ExclusiveHandle").field(resource).finish(),
            None => f.write_str("ExclusiveHandle(Empty)"),
        }
    }
}
