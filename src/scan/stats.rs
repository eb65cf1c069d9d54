//! Run counters.

use super::outcome::{Outcome, Status};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by the producer, the workers and the sink.
#[derive(Debug, Default)]
pub struct PipelineStats {
    accepted: AtomicUsize,
    malformed: AtomicUsize,
    matches: AtomicUsize,
    mismatches: AtomicUsize,
    dns_failures: AtomicUsize,
    inline_processed: AtomicUsize,
    direct_emits: AtomicUsize,
    emitted: AtomicUsize,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSummary {
    /// Well-formed requests handed to resolution.
    pub accepted: usize,
    pub malformed: usize,
    pub matches: usize,
    /// `IP_MISMATCH` and `CDN_MISMATCH_*` together.
    pub mismatches: usize,
    pub dns_failures: usize,
    /// Requests resolved on the producer because the request queue was full.
    pub inline_processed: usize,
    /// Outcomes written without going through the sink.
    pub direct_emits: usize,
    /// Lines actually written.
    pub emitted: usize,
}

impl PipelineSummary {
    /// Outcomes produced for all input lines, emitted or not.
    pub fn outcomes(&self) -> usize {
        self.malformed + self.matches + self.mismatches + self.dns_failures
    }
}

impl PipelineStats {
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inline(&self) {
        self.inline_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_direct_emit(&self) {
        self.direct_emits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an outcome by its classification.
    pub fn record_outcome(&self, outcome: &Outcome) {
        let counter = match outcome.status() {
            Status::Match => &self.matches,
            Status::IpMismatch | Status::CdnMismatch(_) => &self.mismatches,
            Status::DnsFailure => &self.dns_failures,
            Status::Malformed => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineSummary {
        PipelineSummary {
            accepted: self.accepted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
            dns_failures: self.dns_failures.load(Ordering::Relaxed),
            inline_processed: self.inline_processed.load(Ordering::Relaxed),
            direct_emits: self.direct_emits.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
        }
    }
}
