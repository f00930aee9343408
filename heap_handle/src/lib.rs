//! This crate implements owning handles to heap-allocated values.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
extern crate core;

pub mod error;
pub mod handle;

pub use self::error::EmptyHandleError;
pub use self::handle::*;
