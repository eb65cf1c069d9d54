//! # sanresolver
//!
//! Finds origin servers hidden behind certificate SANs.
//!
//! Input is a stream of `IP:PORT [DOMAIN]` records, typically produced by a
//! certificate scanner: a service at `IP:PORT` presented a certificate
//! naming `DOMAIN`. Each domain is resolved through a chain of independent
//! DNS strategies and compared with the address it was seen on. Records
//! where the domain does not point back at that address are reported,
//! tagged with the CDN the domain resolves into when there is one.
//!
//! ## Output
//!
//! One line per reported record:
//!
//! ```text
//! 203.0.113.5:443 [shop.example] CDN_MISMATCH_CLOUDFLARE 104.16.1.1
//! 203.0.113.9:443 [api.example] IP_MISMATCH 198.51.100.7[web1.example]
//! 203.0.113.9:8443 [gone.example] DNS_FAILURE
//! garbage MALFORMED
//! ```
//!
//! Matching records are not printed.
//!
//! ## Modules
//!
//! - [`base`] - Error types and result extensions
//! - [`dns`] - Resolution strategies, the strategy chain and reverse lookups
//! - [`cdn`] - CDN prefix table and classification
//! - [`scan`] - The bounded producer / worker / sink pipeline
//! - [`config`] - Run configuration
//! - [`args`] - Command line parsing

pub mod args;
pub mod base;
pub mod cdn;
pub mod config;
pub mod dns;
pub mod scan;
