//! Best-effort reverse-lookup annotation of resolved addresses.

use super::ReverseResolve;
use std::{fmt, net::IpAddr, sync::Arc, time::Duration};
use tokio::{task::JoinSet, time::Instant};

/// An address with the hostname its PTR record points to, if one was found
/// in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedAddr {
    pub addr: IpAddr,
    pub hostname: Option<String>,
}

impl AnnotatedAddr {
    /// An address without annotation.
    pub fn bare(addr: IpAddr) -> Self {
        Self {
            addr,
            hostname: None,
        }
    }
}

impl fmt::Display for AnnotatedAddr {
    /// Renders `addr` or `addr[hostname]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hostname {
            Some(host) => write!(f, "{}[{}]", self.addr, host),
            None => write!(f, "{}", self.addr),
        }
    }
}

/// Concurrent reverse-lookup fan-out.
///
/// One task per address, each under `per_address`, all joined against the
/// caller's deadline. Lookups still running when the deadline hits are
/// aborted and their addresses stay bare. Failures never propagate.
#[derive(Clone)]
pub struct ReverseEnricher {
    resolver: Arc<dyn ReverseResolve>,
    per_address: Duration,
}

impl ReverseEnricher {
    /// Default budget for a single PTR lookup.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(resolver: Arc<dyn ReverseResolve>, per_address: Duration) -> Self {
        Self {
            resolver,
            per_address,
        }
    }

    /// Annotates `addrs`, preserving their order.
    pub async fn annotate(&self, addrs: &[IpAddr], deadline: Instant) -> Vec<AnnotatedAddr> {
        let mut annotated: Vec<AnnotatedAddr> =
            addrs.iter().copied().map(AnnotatedAddr::bare).collect();

        let mut tasks = JoinSet::new();
        for (idx, &addr) in addrs.iter().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let budget = self.per_address;
            tasks.spawn(async move {
                let hostname = match tokio::time::timeout(budget, resolver.reverse(addr)).await {
                    Ok(Ok(raw)) => normalize_hostname(&raw),
                    Ok(Err(e)) => {
                        tracing::debug!(addr = %addr, error = %e, "reverse lookup failed");
                        None
                    }
                    Err(_) => {
                        tracing::debug!(addr = %addr, budget = ?budget, "reverse lookup timed out");
                        None
                    }
                };
                (idx, hostname)
            });
        }

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((idx, hostname)))) => annotated[idx].hostname = hostname,
                Ok(Some(Err(e))) => {
                    tracing::debug!(error = %e, "reverse lookup task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::debug!(
                        pending = tasks.len(),
                        "deadline reached before all reverse lookups finished"
                    );
                    break;
                }
            }
        }
        // Dropping the set aborts whatever is still running.
        drop(tasks);

        annotated
    }
}

impl fmt::Debug for ReverseEnricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReverseEnricher")
            .field("per_address", &self.per_address)
            .finish_non_exhaustive()
    }
}

/// Strips the trailing root label; empty answers count as no answer.
fn normalize_hostname(raw: &str) -> Option<String> {
    let host = raw.strip_suffix('.').unwrap_or(raw);
    (!host.is_empty()).then(|| host.to_string())
}
