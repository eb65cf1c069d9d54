//! System DNS resolvers using getaddrinfo.
//!
//! Both resolvers here go through the operating system's native resolution
//! path, so they honour `/etc/nsswitch.conf`, the hosts file and any local
//! caching daemon.
//!
//! - [`GaiResolver`] is the first strategy in the chain.
//! - [`HostLookup`] is the generic host lookup used as the last-resort
//!   fallback once every configured strategy has failed.

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::{context::IoResultExt, neterror::NetError};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// System DNS resolver using `getaddrinfo` in a thread pool.
///
/// This resolver wraps the standard library's `ToSocketAddrs` trait and
/// executes resolution in `tokio::task::spawn_blocking` to avoid blocking
/// the async runtime.
///
/// # Cancellation
///
/// Dropping the returned future stops waiting for the answer, but the
/// blocking `getaddrinfo` call itself runs to completion on its thread.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    /// Creates a new `GaiResolver`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.map(|sa| sa.ip()).collect::<Vec<_>>())
            })
            .await;

            // Handle task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "DNS resolution task failed");
                    NetError::ResolverTaskFailed
                })?
                .dns_context(&domain)?;

            into_addrs(&domain, addrs)
        })
    }
}

/// Generic host lookup through tokio's resolver entry point.
///
/// Kept distinct from [`GaiResolver`] so that the final fallback does not
/// simply replay the first strategy's code path.
#[derive(Clone, Debug, Default)]
pub struct HostLookup;

impl HostLookup {
    /// Creates a new `HostLookup`.
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for HostLookup {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let domain = name.as_str().to_string();
            tracing::debug!(domain = %domain, "resolving via generic host lookup");

            let addrs = tokio::net::lookup_host((domain.as_str(), 0u16))
                .await
                .dns_context(&domain)?
                .map(|sa: SocketAddr| sa.ip())
                .collect::<Vec<_>>();

            into_addrs(&domain, addrs)
        })
    }
}

fn into_addrs(domain: &str, addrs: Vec<IpAddr>) -> Result<Addrs, NetError> {
    if addrs.is_empty() {
        return Err(NetError::EmptyAnswer {
            domain: domain.to_string(),
        });
    }

    tracing::debug!(domain = %domain, count = addrs.len(), "DNS resolution complete");
    Ok(Box::new(addrs.into_iter()) as Addrs)
}
