//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): failures of individual forward and
//!   reverse lookups
//! - [`IoResultExt`](context::IoResultExt): attaches domain or address
//!   context to I/O errors

pub mod context;
pub mod neterror;
