//! Backpressure control between the producer, the workers and the sink.
//!
//! Both queues are bounded. Every enqueue is a try-with-deadline: if the
//! queue does not take the item within the grace period, the caller does
//! the work itself instead of waiting longer or dropping it.
//!
//! - Request queue full: the producer resolves the request inline.
//! - Result queue full: the outcome is written straight to the output,
//!   bypassing the sink. Output order is not preserved on this path.

use super::{
    outcome::Outcome,
    processor::Processor,
    request::{ParsedLine, ResolutionRequest},
    sink::Emitter,
    stats::PipelineStats,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::{self, error::SendTimeoutError};

/// How a request left the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Taken by the request queue.
    Queued,
    /// Resolved on the producer's own task.
    Inline,
}

/// How an outcome reached the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Taken by the result queue; the sink will write it.
    Queued,
    /// Written (or, for a match, discarded) by the caller.
    Direct,
}

/// Producer-side handle on the result queue, shared with every worker.
#[derive(Debug, Clone)]
pub struct ResultSender {
    results: mpsc::Sender<Outcome>,
    emitter: Emitter,
    stats: Arc<PipelineStats>,
    grace: Duration,
}

impl ResultSender {
    pub fn new(
        results: mpsc::Sender<Outcome>,
        emitter: Emitter,
        stats: Arc<PipelineStats>,
        grace: Duration,
    ) -> Self {
        Self {
            results,
            emitter,
            stats,
            grace,
        }
    }

    /// Offers `outcome` to the result queue for at most the grace period,
    /// then emits it directly.
    pub async fn deliver(&self, outcome: Outcome) -> Delivery {
        self.stats.record_outcome(&outcome);

        let outcome = match self.results.send_timeout(outcome, self.grace).await {
            Ok(()) => return Delivery::Queued,
            Err(SendTimeoutError::Timeout(outcome)) => {
                tracing::warn!(line = %outcome.line(), "result queue saturated, emitting directly");
                outcome
            }
            Err(SendTimeoutError::Closed(outcome)) => {
                tracing::warn!(line = %outcome.line(), "result queue closed, emitting directly");
                outcome
            }
        };

        if outcome.should_emit() {
            self.stats.record_direct_emit();
            let emitter = self.emitter.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || emitter.emit(&outcome)).await {
                tracing::error!(error = %e, "direct emit failed");
            }
        }
        Delivery::Direct
    }
}

/// Routes parsed input lines into the pipeline.
#[derive(Debug)]
pub struct Dispatcher {
    requests: mpsc::Sender<ResolutionRequest>,
    results: ResultSender,
    processor: Processor,
    stats: Arc<PipelineStats>,
    grace: Duration,
}

impl Dispatcher {
    pub fn new(
        requests: mpsc::Sender<ResolutionRequest>,
        results: ResultSender,
        processor: Processor,
        stats: Arc<PipelineStats>,
        grace: Duration,
    ) -> Self {
        Self {
            requests,
            results,
            processor,
            stats,
            grace,
        }
    }

    /// Handles one input line. Blank lines are dropped; malformed lines go
    /// straight to the result path; requests are submitted for resolution.
    pub async fn dispatch(&self, parsed: ParsedLine) {
        match parsed {
            ParsedLine::Blank => {}
            ParsedLine::Malformed(line) => {
                tracing::debug!(line = %line, "malformed input record");
                self.results.deliver(Outcome::malformed(line)).await;
            }
            ParsedLine::Request(request) => {
                self.submit(request).await;
            }
        }
    }

    /// Enqueues `request`, or resolves it inline if the queue stays full
    /// for the whole grace period.
    pub async fn submit(&self, request: ResolutionRequest) -> Submission {
        self.stats.record_accepted();

        let request = match self.requests.send_timeout(request, self.grace).await {
            Ok(()) => return Submission::Queued,
            Err(SendTimeoutError::Timeout(request)) => {
                tracing::warn!(
                    domain = %request.domain,
                    grace = ?self.grace,
                    "request queue saturated, resolving inline"
                );
                request
            }
            Err(SendTimeoutError::Closed(request)) => {
                tracing::warn!(domain = %request.domain, "request queue closed, resolving inline");
                request
            }
        };

        self.stats.record_inline();
        let outcome = self.processor.process(&request).await;
        self.results.deliver(outcome).await;
        Submission::Inline
    }
}
