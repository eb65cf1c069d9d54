//! Command line surface.

use crate::config::{ConfigError, PublicResolver, ScanConfig};
use clap::Parser;
use std::time::Duration;

/// Reads `IP:PORT [DOMAIN]` records from stdin, resolves each domain and
/// prints the ones whose addresses do not include the expected IP.
#[derive(Parser, Debug, Clone)]
#[command(name = "san-resolver", version)]
pub struct Args {
    /// Number of concurrent resolution workers
    #[arg(long, default_value_t = 50)]
    pub workers: usize,

    /// Capacity of the request and result queues
    #[arg(long, default_value_t = 1000)]
    pub buffer: usize,

    /// Per-strategy DNS timeout in seconds (fractions allowed)
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,

    /// How long a full queue is waited on before falling back, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub grace_ms: u64,

    /// Per-address reverse lookup timeout, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub reverse_timeout_ms: u64,

    /// Resolve only through this public resolver
    #[arg(long, value_enum)]
    pub only_resolver: Option<PublicResolver>,

    /// Shorthand for --only-resolver google
    #[arg(long)]
    pub force_google: bool,

    /// Shorthand for --only-resolver cloudflare
    #[arg(long)]
    pub force_cloudflare: bool,

    /// Skip the system and builtin resolvers
    #[arg(long)]
    pub no_system_dns: bool,

    /// Tag mismatches with the strategy that answered
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// The public resolver pinned by one of the three flags. At most one
    /// of them may be given, even when they name the same resolver.
    fn pinned_resolver(&self) -> Result<Option<PublicResolver>, ConfigError> {
        let mut pins = self
            .only_resolver
            .into_iter()
            .chain(self.force_google.then_some(PublicResolver::Google))
            .chain(self.force_cloudflare.then_some(PublicResolver::Cloudflare));

        let pinned = pins.next();
        match (pinned, pins.next()) {
            (Some(first), Some(second)) => Err(ConfigError::ConflictingResolvers(first, second)),
            _ => Ok(pinned),
        }
    }

    /// Builds and validates the run configuration.
    pub fn into_config(self) -> Result<ScanConfig, ConfigError> {
        // Negative or non-finite values map to zero and fail validation.
        let dns_timeout = Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO);

        let config = ScanConfig {
            workers: self.workers,
            queue_capacity: self.buffer,
            dns_timeout,
            enqueue_grace: Duration::from_millis(self.grace_ms),
            reverse_timeout: Duration::from_millis(self.reverse_timeout_ms),
            only_resolver: self.pinned_resolver()?,
            skip_system_resolver: self.no_system_dns,
            verbose: self.verbose,
            ..ScanConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
