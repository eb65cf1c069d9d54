//! The resolution pipeline.
//!
//! A single producer reads records and parses them, a fixed pool of workers
//! resolves and classifies them, and a single sink writes the results.
//! Both hops are bounded queues; see [`dispatch`] for what happens when
//! either is full.

pub mod dispatch;
pub mod outcome;
pub mod pipeline;
pub mod processor;
pub mod request;
pub mod sink;
pub mod stats;
pub mod worker;

#[cfg(test)]
mod testing;

pub use dispatch::{Delivery, Dispatcher, ResultSender, Submission};
pub use outcome::{Outcome, Status};
pub use pipeline::Pipeline;
pub use processor::Processor;
pub use request::{parse_line, ParsedLine, ResolutionRequest};
pub use sink::{run_sink, spawn_sink, Emitter};
pub use stats::{PipelineStats, PipelineSummary};
pub use worker::WorkerPool;
