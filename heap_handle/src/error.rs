//! Errors reported by checked handle access.

use core::fmt;

/// Raised when accessing the resource of a handle that owns nothing.
///
/// Only the checked accessors report this.
/// Dereferencing an empty handle panics instead,
/// and the unchecked accessors assume the handle is not empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyHandleError;

impl fmt::Display for EmptyHandleError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str("handle does not own a resource")
    }
}

impl core::error::Error for EmptyHandleError
{
}
