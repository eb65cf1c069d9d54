//! Per-request resolution: strategy chain, comparison, CDN
//! classification and reverse enrichment.

use super::{outcome::Outcome, request::ResolutionRequest};
use crate::cdn::CdnTable;
use crate::config::ScanConfig;
use crate::dns::{AnnotatedAddr, HickoryResolver, ReverseEnricher, ReverseResolve, StrategyChain};
use std::{
    net::IpAddr,
    sync::Arc,
    time::Duration,
};
use tokio::time::Instant;

/// Everything a worker needs to turn a request into an outcome.
///
/// Cheap to clone; every field is shared and read-only.
#[derive(Debug, Clone)]
pub struct Processor {
    chain: Arc<StrategyChain>,
    cdn: Arc<CdnTable>,
    enricher: ReverseEnricher,
    forward_deadline: Duration,
    verbose: bool,
}

impl Processor {
    pub fn new(
        chain: Arc<StrategyChain>,
        cdn: Arc<CdnTable>,
        reverse: Arc<dyn ReverseResolve>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            chain,
            cdn,
            enricher: ReverseEnricher::new(reverse, config.reverse_timeout),
            forward_deadline: config.forward_deadline(),
            verbose: config.verbose,
        }
    }

    /// The production wiring: real strategies, the builtin CDN table and
    /// PTR lookups through the system nameservers.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            Arc::new(StrategyChain::from_config(config)),
            Arc::new(CdnTable::builtin()),
            Arc::new(HickoryResolver::system(config.reverse_timeout)),
            config,
        )
    }

    /// Resolves and classifies one request. Never fails: every error is
    /// folded into the outcome.
    pub async fn process(&self, request: &ResolutionRequest) -> Outcome {
        let deadline = Instant::now() + self.forward_deadline;

        let resolution = match self.chain.resolve(&request.domain, deadline).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::debug!(domain = %request.domain, error = %e, "all strategies failed");
                return Outcome::dns_failure(&request.line);
            }
        };

        let expected = IpAddr::V4(request.expected);
        if resolution.addrs.contains(&expected) {
            let addrs = resolution.addrs.into_iter().map(AnnotatedAddr::bare).collect();
            return Outcome::matched(&request.line, addrs, resolution.strategy);
        }

        let cdn = self.cdn.classify(&resolution.addrs).map(|p| p.tag());
        tracing::debug!(
            domain = %request.domain,
            expected = %expected,
            cdn = ?cdn,
            strategy = %resolution.strategy,
            "address mismatch"
        );

        let addrs = self.enricher.annotate(&resolution.addrs, deadline).await;
        let outcome = Outcome::mismatch(&request.line, cdn, addrs, resolution.strategy);
        if self.verbose {
            outcome
        } else {
            outcome.without_strategy()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::outcome::Status;
    use crate::scan::request::{parse_line, ParsedLine};
    use crate::scan::testing::{processor, TablePtr, TableResolver};

    fn request(line: &str) -> ResolutionRequest {
        match parse_line(line) {
            ParsedLine::Request(req) => req,
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_match_is_not_emitted_even_with_other_addresses() {
        let resolver = Arc::new(TableResolver::default().with("example.com", &["9.9.9.9", "1.2.3.4"]));
        let p = processor(resolver, TablePtr::default(), &ScanConfig::default());

        let outcome = p.process(&request("1.2.3.4:443 [example.com]")).await;

        assert_eq!(outcome.status(), &Status::Match);
        assert!(!outcome.should_emit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_is_dns_failure() {
        let resolver = Arc::new(TableResolver::default());
        let p = processor(resolver, TablePtr::default(), &ScanConfig::default());

        let outcome = p.process(&request("1.2.3.4:443 [example.com]")).await;

        assert_eq!(outcome.to_string(), "1.2.3.4:443 [example.com] DNS_FAILURE");
        assert!(outcome.addrs().is_empty());
    }

    #[tokio::test]
    async fn test_cdn_mismatch_with_reverse_name() {
        let resolver = Arc::new(TableResolver::default().with("example.com", &["23.32.0.1"]));
        let ptr = TablePtr::default().with("23.32.0.1", "a23-32-0-1.deploy.akamaitechnologies.com.");
        let p = processor(resolver, ptr, &ScanConfig::default());

        let outcome = p.process(&request("1.2.3.4:443 [example.com]")).await;

        assert_eq!(
            outcome.to_string(),
            "1.2.3.4:443 [example.com] CDN_MISMATCH_AKAMAI 23.32.0.1[a23-32-0-1.deploy.akamaitechnologies.com]"
        );
    }

    #[tokio::test]
    async fn test_plain_mismatch_without_reverse_name() {
        let resolver = Arc::new(TableResolver::default().with("example.com", &["192.0.2.80", "192.0.2.81"]));
        let p = processor(resolver, TablePtr::default(), &ScanConfig::default());

        let outcome = p.process(&request("1.2.3.4:443 [example.com]")).await;

        assert_eq!(
            outcome.to_string(),
            "1.2.3.4:443 [example.com] IP_MISMATCH 192.0.2.80,192.0.2.81"
        );
    }

    #[tokio::test]
    async fn test_verbose_tags_strategy() {
        let resolver = Arc::new(TableResolver::default().with("example.com", &["192.0.2.80"]));
        let config = ScanConfig {
            verbose: true,
            ..Default::default()
        };
        let p = processor(resolver, TablePtr::default(), &config);

        let outcome = p.process(&request("1.2.3.4:443 [example.com]")).await;

        assert_eq!(
            outcome.to_string(),
            "1.2.3.4:443 [example.com] IP_MISMATCH_VIA_SYSTEM 192.0.2.80"
        );
    }
}
