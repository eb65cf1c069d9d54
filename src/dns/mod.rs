//! DNS Resolution Module
//!
//! Provides the lookup capabilities the scan pipeline is built from:
//! - System resolver (getaddrinfo via thread pool)
//! - Async hickory-dns resolvers (system nameservers or one pinned server)
//! - Generic host lookup used as the last-resort fallback
//! - Fixed-order strategy chain under an umbrella deadline
//! - Concurrent reverse-lookup enrichment
//!
//! # Architecture
//!
//! `Resolve` and `ReverseResolve` are the seams: every strategy, and every
//! test double, plugs in behind them. The chain and the enricher only ever
//! see trait objects.
//!
//! # Example
//!
//! ```rust,ignore
//! use sanresolver::config::ScanConfig;
//! use sanresolver::dns::{Name, StrategyChain};
//! use tokio::time::Instant;
//!
//! let config = ScanConfig::default();
//! let chain = StrategyChain::from_config(&config);
//! let deadline = Instant::now() + config.forward_deadline();
//! let resolution = chain.resolve(&Name::new("example.com"), deadline).await?;
//! println!("{:?} via {}", resolution.addrs, resolution.strategy);
//! ```

mod chain;
mod gai;
mod hickory;
mod resolve;
mod reverse;

pub use chain::{Resolution, Strategy, StrategyChain, StrategyId};
pub use gai::{GaiResolver, HostLookup};
pub use hickory::HickoryResolver;
pub use resolve::{Addrs, Name, Resolve, Resolving, ReverseResolve, Reversing};
pub use reverse::{AnnotatedAddr, ReverseEnricher};
