use std::{io, net::IpAddr, sync::Arc, time::Duration};
use thiserror::Error;

/// Errors raised while resolving a single name or address.
///
/// None of these are fatal to a run: the strategy chain advances to the next
/// strategy, and the reverse enricher drops the annotation.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    /// The resolver answered with an error for this domain.
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The resolver succeeded but returned no addresses.
    #[error("Empty answer for {domain}")]
    EmptyAnswer { domain: String },

    /// A single attempt exceeded its own budget.
    #[error("Lookup for {domain} timed out after {budget:?}")]
    TimedOut { domain: String, budget: Duration },

    /// The umbrella deadline for the whole chain is spent.
    #[error("Resolution deadline exceeded for {domain}")]
    DeadlineExceeded { domain: String },

    /// No PTR record, or the PTR query itself failed.
    #[error("Reverse lookup failed for {addr}: {reason}")]
    ReverseLookupFailed { addr: IpAddr, reason: String },

    /// The blocking resolver task panicked or was cancelled.
    #[error("Name resolution task failed")]
    ResolverTaskFailed,
}

impl NetError {
    /// Wrap an I/O failure for `domain`.
    pub fn dns_failed(domain: &str, err: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(err),
        }
    }

    /// Wrap a resolver-library failure that only carries a message.
    pub fn dns_failed_msg(domain: &str, msg: impl Into<String>) -> Self {
        Self::dns_failed(domain, io::Error::new(io::ErrorKind::NotFound, msg.into()))
    }

    /// Whether this failure came from a clock rather than from an answer.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            NetError::TimedOut { .. } | NetError::DeadlineExceeded { .. }
        )
    }
}
