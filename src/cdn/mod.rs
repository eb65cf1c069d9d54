//! CDN detection.
//!
//! A read-only table of provider address blocks, built once at startup,
//! and the classifier that maps resolved addresses onto it.

mod prefix;
mod table;

pub use prefix::{IpPrefix, PrefixError};
pub use table::{CdnProvider, CdnTable};
