//! Ordered fallback chain of resolution strategies.
//!
//! The chain tries each strategy in a fixed order under one umbrella
//! deadline and stops at the first non-empty answer. Local caches,
//! split-horizon setups and censoring middleboxes tend to fool only some
//! resolution paths, so walking several of them makes a final failure or
//! mismatch more likely to reflect the public answer.

use super::{GaiResolver, HickoryResolver, HostLookup, Name, Resolve};
use crate::base::neterror::NetError;
use crate::config::{PublicResolver, ScanConfig};
use std::{fmt, net::IpAddr, sync::Arc, time::Duration};
use tokio::time::Instant;

/// Identity of the strategy that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    /// Platform `getaddrinfo`.
    System,
    /// In-process resolver on the system nameservers.
    Builtin,
    /// A single public nameserver.
    Public(PublicResolver),
    /// Generic host lookup after every strategy failed.
    Fallback,
}

impl StrategyId {
    /// Lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::System => "system",
            StrategyId::Builtin => "builtin",
            StrategyId::Public(public) => public.as_str(),
            StrategyId::Fallback => "fallback",
        }
    }

    /// Uppercase tag appended to statuses in verbose mode.
    pub fn tag(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named lookup capability.
#[derive(Clone)]
pub struct Strategy {
    id: StrategyId,
    resolver: Arc<dyn Resolve>,
}

impl Strategy {
    /// Pair a resolver with its identity.
    pub fn new(id: StrategyId, resolver: Arc<dyn Resolve>) -> Self {
        Self { id, resolver }
    }

    pub fn id(&self) -> StrategyId {
        self.id
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A successful forward resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// De-duplicated addresses in answer order. Never empty.
    pub addrs: Vec<IpAddr>,
    /// Which strategy produced them.
    pub strategy: StrategyId,
}

/// Fixed-order strategy chain with a final generic-lookup fallback.
#[derive(Debug, Clone)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
    fallback: Strategy,
    attempt_timeout: Duration,
    attempt_delay: Duration,
}

impl StrategyChain {
    /// Default pause between two failed attempts.
    pub const DEFAULT_ATTEMPT_DELAY: Duration = Duration::from_millis(50);

    /// Creates a chain over `strategies` followed by `fallback`.
    pub fn new(strategies: Vec<Strategy>, fallback: Strategy, attempt_timeout: Duration) -> Self {
        Self {
            strategies,
            fallback,
            attempt_timeout,
            attempt_delay: Self::DEFAULT_ATTEMPT_DELAY,
        }
    }

    /// Overrides the pause between failed attempts.
    pub fn with_attempt_delay(mut self, delay: Duration) -> Self {
        self.attempt_delay = delay;
        self
    }

    /// Builds the real chain for a run.
    ///
    /// With a pinned public resolver only that resolver is used. Otherwise
    /// the order is system, builtin (unless the system resolver is skipped),
    /// then every public resolver in [`PublicResolver::ALL`] order.
    pub fn from_config(config: &ScanConfig) -> Self {
        let timeout = config.dns_timeout;
        let public = |p: PublicResolver| {
            Strategy::new(
                StrategyId::Public(p),
                Arc::new(HickoryResolver::nameserver(p.addr(), timeout)),
            )
        };

        let mut strategies = Vec::new();
        match config.only_resolver {
            Some(only) => strategies.push(public(only)),
            None => {
                if !config.skip_system_resolver {
                    strategies.push(Strategy::new(StrategyId::System, Arc::new(GaiResolver::new())));
                    strategies.push(Strategy::new(
                        StrategyId::Builtin,
                        Arc::new(HickoryResolver::system(timeout)),
                    ));
                }
                strategies.extend(PublicResolver::ALL.into_iter().map(public));
            }
        }

        tracing::debug!(
            strategies = ?strategies.iter().map(Strategy::id).collect::<Vec<_>>(),
            "strategy chain configured"
        );

        Self::new(
            strategies,
            Strategy::new(StrategyId::Fallback, Arc::new(HostLookup::new())),
            timeout,
        )
        .with_attempt_delay(config.attempt_delay)
    }

    /// Strategy identities in the order they will be tried.
    pub fn order(&self) -> Vec<StrategyId> {
        self.strategies
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(Strategy::id)
            .collect()
    }

    /// Resolves `name`, giving up once `deadline` passes.
    ///
    /// Each attempt is bounded by the per-attempt timeout or by what is left
    /// of the umbrella deadline, whichever is shorter. The pause between
    /// failed attempts also counts against the deadline. Returns the last
    /// attempt's error when everything fails.
    pub async fn resolve(&self, name: &Name, deadline: Instant) -> Result<Resolution, NetError> {
        let mut last_err = NetError::DeadlineExceeded {
            domain: name.to_string(),
        };

        for (i, strategy) in self.strategies.iter().enumerate() {
            if i > 0 && !self.pause(deadline).await {
                break;
            }
            match self.attempt(strategy, name, deadline).await {
                Ok(resolution) => return Ok(resolution),
                Err(e) => last_err = e,
            }
        }

        if !self.strategies.is_empty() && !self.pause(deadline).await {
            tracing::debug!(domain = %name, "no budget left for fallback lookup");
            return Err(last_err);
        }

        self.attempt(&self.fallback, name, deadline).await
    }

    async fn attempt(
        &self,
        strategy: &Strategy,
        name: &Name,
        deadline: Instant,
    ) -> Result<Resolution, NetError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(NetError::DeadlineExceeded {
                domain: name.to_string(),
            });
        }
        let budget = self.attempt_timeout.min(remaining);

        let result =
            match tokio::time::timeout(budget, strategy.resolver.resolve(name.clone())).await {
                Ok(result) => result,
                Err(_) => Err(NetError::TimedOut {
                    domain: name.to_string(),
                    budget,
                }),
            };

        let outcome = result.and_then(|addrs| {
            let mut unique: Vec<IpAddr> = Vec::new();
            for addr in addrs {
                let addr = addr.to_canonical();
                if !unique.contains(&addr) {
                    unique.push(addr);
                }
            }
            if unique.is_empty() {
                Err(NetError::EmptyAnswer {
                    domain: name.to_string(),
                })
            } else {
                Ok(Resolution {
                    addrs: unique,
                    strategy: strategy.id,
                })
            }
        });

        match &outcome {
            Ok(resolution) => tracing::debug!(
                domain = %name,
                strategy = %strategy.id,
                count = resolution.addrs.len(),
                "strategy succeeded"
            ),
            Err(e) => tracing::debug!(
                domain = %name,
                strategy = %strategy.id,
                error = %e,
                "strategy failed"
            ),
        }
        outcome
    }

    /// Sleeps the inter-attempt delay. Returns false if the deadline
    /// leaves no room for another attempt.
    async fn pause(&self, deadline: Instant) -> bool {
        let wake = (Instant::now() + self.attempt_delay).min(deadline);
        tokio::time::sleep_until(wake).await;
        Instant::now() < deadline
    }
}
