//! Async DNS resolver using hickory-dns.
//!
//! Two flavours are built from the same type:
//!
//! - [`HickoryResolver::system`] reads the system nameserver list but talks
//!   to those servers directly, bypassing libc, nscd and similar OS caches.
//! - [`HickoryResolver::nameserver`] pins every query to one public server.
//!
//! Both disable the in-process answer cache so that every call reflects
//! what the upstream server says right now.

use super::{Addrs, Name, Resolve, Resolving, ReverseResolve, Reversing};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::{
    net::IpAddr,
    sync::Arc,
    time::Duration,
};

/// Async DNS resolver backed by hickory-dns.
///
/// Cloning is cheap; clones share the underlying resolver and its
/// connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use sanresolver::dns::{HickoryResolver, Name, Resolve};
/// use std::time::Duration;
///
/// let google = HickoryResolver::nameserver("8.8.8.8".parse()?, Duration::from_secs(5));
/// let addrs = google.resolve(Name::new("example.com")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a resolver from the system DNS configuration.
    ///
    /// If the system configuration cannot be read, it falls back to
    /// hickory's default upstream set.
    pub fn system(timeout: Duration) -> Self {
        let builder = match TokioResolver::builder_tokio() {
            Ok(builder) => {
                tracing::debug!("Using system DNS configuration");
                builder
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to read system DNS config, using defaults"
                );
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };

        Self {
            resolver: Arc::new(builder.with_options(uncached_opts(timeout)).build()),
        }
    }

    /// Creates a resolver that only ever queries `server` on port 53.
    pub fn nameserver(server: IpAddr, timeout: Duration) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(&[server], 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(uncached_opts(timeout))
                .build();

        Self {
            resolver: Arc::new(resolver),
        }
    }
}

fn uncached_opts(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    // The strategy chain does the retrying.
    opts.attempts = 1;
    opts.cache_size = 0;
    opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
    opts
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, "resolving via hickory-dns");

            let lookup = resolver.resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns lookup failed");
                NetError::dns_failed_msg(domain, e.to_string())
            })?;

            let addrs: Vec<IpAddr> = lookup.iter().collect();

            if addrs.is_empty() {
                return Err(NetError::EmptyAnswer {
                    domain: domain.to_string(),
                });
            }

            tracing::debug!(domain = %domain, count = addrs.len(), "hickory-dns resolution complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

impl ReverseResolve for HickoryResolver {
    fn reverse(&self, addr: IpAddr) -> Reversing {
        let resolver = self.clone();
        Box::pin(async move {
            let lookup = resolver
                .resolver
                .reverse_lookup(addr)
                .await
                .map_err(|e| NetError::ReverseLookupFailed {
                    addr,
                    reason: e.to_string(),
                })?;

            lookup
                .iter()
                .next()
                .map(|ptr| ptr.to_string())
                .ok_or_else(|| NetError::ReverseLookupFailed {
                    addr,
                    reason: "no PTR records".to_string(),
                })
        })
    }
}
