//! Owning handles and their construction helpers.
//!
//! # Handles
//!
//! A handle is an optional non-null pointer to a resource on the heap.
//! The handle owns the resource and releases it when the handle is dropped,
//! so there is no explicit free operation.
//! There are different types of handles.
//! They differ in how many owners a resource may have.
//! These differences are summarized in the table below.
//!
//! | Handle type            | Owners per resource | Duplicated by                 | Thread-safe |
//! |------------------------|---------------------|-------------------------------|-------------|
//! | [`ExclusiveHandle`]    | One                 | Cannot be duplicated          | Like `T`    |
//! | [`SharedHandle`]       | Any number          | [`Clone`], counted locally    | No          |
//! | [`AtomicSharedHandle`] | Any number          | [`Clone`], counted atomically | Yes         |
//!
//! Every handle may also be empty, owning nothing.
//! Taking the contents of a handle leaves it empty,
//! and dropping an empty handle does nothing.

pub use self::counter::*;
pub use self::exclusive::*;
pub use self::init::*;
pub use self::shared::*;

mod counter;
mod exclusive;
mod init;
mod shared;

#[cfg(test)]
mod testing;

/// Message of the panic raised when dereferencing an empty handle.
pub (crate) const EMPTY_DEREF: &str = "dereferenced an empty handle";
