//! Core DNS resolution types and traits.
//!
//! This module defines the `Resolve` and `ReverseResolve` traits that every
//! lookup strategy implements, plus the `Name` wrapper they accept.

use crate::base::neterror::NetError;
use std::{fmt, future::Future, net::IpAddr, pin::Pin, sync::Arc};

/// A domain name to resolve into IP addresses.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over resolved addresses.
pub type Addrs = Box<dyn Iterator<Item = IpAddr> + Send>;

/// Alias for the `Future` type returned by a forward resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Alias for the `Future` type returned by a reverse resolver.
pub type Reversing = Pin<Box<dyn Future<Output = Result<String, NetError>> + Send>>;

/// A forward lookup capability: domain name to address set.
///
/// Implementations are stateless between calls and shared by every worker,
/// so they take `&self` and must be thread-safe.
///
/// # Design Notes
///
/// - An `Ok` carrying zero addresses is treated as a failure by callers.
/// - Deadlines are applied by the caller; implementations may run unbounded.
/// - Returns boxed futures for trait object compatibility.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// A reverse lookup capability: address to the first PTR hostname.
///
/// The returned hostname is the raw answer; a trailing root-label dot may
/// still be present.
pub trait ReverseResolve: Send + Sync {
    /// Resolves an address to a hostname.
    fn reverse(&self, addr: IpAddr) -> Reversing;
}

impl<R: ReverseResolve + ?Sized> ReverseResolve for Arc<R> {
    fn reverse(&self, addr: IpAddr) -> Reversing {
        (**self).reverse(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_name_from_str() {
        let name = Name::from("example.com");
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.to_string(), "example.com");
    }

    #[test]
    fn test_name_from_string() {
        let domain = String::from("test.example.com");
        let name = Name::from(domain);
        assert_eq!(name.as_str(), "test.example.com");
    }

    #[test]
    fn test_name_equality() {
        let name1 = Name::new("example.com");
        let name2 = Name::new("example.com");
        let name3 = Name::new("other.com");

        assert_eq!(name1, name2);
        assert_ne!(name1, name3);
    }

    struct FixedResolver {
        response: Vec<IpAddr>,
    }

    impl Resolve for FixedResolver {
        fn resolve(&self, _name: Name) -> Resolving {
            let addrs = self.response.clone();
            Box::pin(async move { Ok(Box::new(addrs.into_iter()) as Addrs) })
        }
    }

    struct FixedReverse;

    impl ReverseResolve for FixedReverse {
        fn reverse(&self, addr: IpAddr) -> Reversing {
            Box::pin(async move { Ok(format!("host-{}.example.", addr)) })
        }
    }

    #[tokio::test]
    async fn test_arc_resolver_delegates() {
        let resolver: Arc<dyn Resolve> = Arc::new(FixedResolver {
            response: vec![IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))],
        });

        let addrs: Vec<_> = resolver
            .resolve(Name::new("example.com"))
            .await
            .unwrap()
            .collect();

        assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))]);
    }

    #[tokio::test]
    async fn test_arc_reverse_delegates() {
        let reverse: Arc<dyn ReverseResolve> = Arc::new(FixedReverse);
        let host = reverse
            .reverse(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)))
            .await
            .unwrap();
        assert_eq!(host, "host-192.0.2.7.example.");
    }
}
