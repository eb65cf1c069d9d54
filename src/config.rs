//! Run configuration.
//!
//! Built once at startup (normally from the command line) and shared
//! read-only by every pipeline stage for the lifetime of the process.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use thiserror::Error;

/// Public resolvers the chain can query directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PublicResolver {
    /// Google Public DNS, 8.8.8.8
    Google,
    /// Cloudflare, 1.1.1.1
    Cloudflare,
    /// Quad9, 9.9.9.9
    Quad9,
    /// OpenDNS, 208.67.222.222
    #[value(name = "opendns")]
    OpenDns,
}

impl PublicResolver {
    /// Every public resolver, in chain order.
    pub const ALL: [PublicResolver; 4] = [
        PublicResolver::Google,
        PublicResolver::Cloudflare,
        PublicResolver::Quad9,
        PublicResolver::OpenDns,
    ];

    /// The nameserver queried for this resolver.
    pub fn addr(&self) -> IpAddr {
        match self {
            PublicResolver::Google => IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            PublicResolver::Cloudflare => IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            PublicResolver::Quad9 => IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)),
            PublicResolver::OpenDns => IpAddr::V4(Ipv4Addr::new(208, 67, 222, 222)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicResolver::Google => "google",
            PublicResolver::Cloudflare => "cloudflare",
            PublicResolver::Quad9 => "quad9",
            PublicResolver::OpenDns => "opendns",
        }
    }
}

impl fmt::Display for PublicResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid run configuration. Reported before any input is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker pool size must be at least 1")]
    NoWorkers,
    #[error("queue capacity must be at least 1")]
    NoQueueCapacity,
    #[error("DNS timeout must be greater than zero")]
    ZeroTimeout,
    #[error("deadline multiplier must be at least 1")]
    ZeroDeadlineMultiplier,
    #[error("reverse lookup timeout {reverse:?} must be shorter than the forward deadline {forward:?}")]
    ReverseTimeoutTooLong { reverse: Duration, forward: Duration },
    #[error("only one resolver pin may be given, got {0} and {1}")]
    ConflictingResolvers(PublicResolver, PublicResolver),
}

/// Process-wide scan settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Number of concurrent resolution workers (default: 50)
    pub workers: usize,
    /// Capacity of both the request and the result queue (default: 1000)
    pub queue_capacity: usize,
    /// Budget for a single strategy attempt (default: 5s)
    pub dns_timeout: Duration,
    /// Umbrella deadline per request, in multiples of `dns_timeout` (default: 3)
    pub deadline_multiplier: u32,
    /// How long an enqueue may wait before falling back inline (default: 1s)
    pub enqueue_grace: Duration,
    /// Pause between failed strategy attempts (default: 50ms)
    pub attempt_delay: Duration,
    /// Budget for a single reverse lookup (default: 2s)
    pub reverse_timeout: Duration,
    /// Use only this public resolver
    pub only_resolver: Option<PublicResolver>,
    /// Leave out the system and builtin strategies
    pub skip_system_resolver: bool,
    /// Tag mismatch statuses with the strategy that answered
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            queue_capacity: 1000,
            dns_timeout: Duration::from_secs(5),
            deadline_multiplier: 3,
            enqueue_grace: Duration::from_secs(1),
            attempt_delay: Duration::from_millis(50),
            reverse_timeout: Duration::from_secs(2),
            only_resolver: None,
            skip_system_resolver: false,
            verbose: false,
        }
    }
}

impl ScanConfig {
    /// Umbrella budget for resolving one request, strategies and fallback
    /// included.
    pub fn forward_deadline(&self) -> Duration {
        self.dns_timeout.saturating_mul(self.deadline_multiplier)
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::NoQueueCapacity);
        }
        if self.dns_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.deadline_multiplier == 0 {
            return Err(ConfigError::ZeroDeadlineMultiplier);
        }
        if self.reverse_timeout >= self.forward_deadline() {
            return Err(ConfigError::ReverseTimeoutTooLong {
                reverse: self.reverse_timeout,
                forward: self.forward_deadline(),
            });
        }
        Ok(())
    }
}
