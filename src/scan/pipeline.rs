//! End-to-end wiring: reader, dispatcher, worker pool and sink.

use super::{
    dispatch::{Dispatcher, ResultSender},
    processor::Processor,
    request::parse_line,
    sink::{spawn_sink, Emitter},
    stats::{PipelineStats, PipelineSummary},
    worker::WorkerPool,
};
use crate::config::{ConfigError, ScanConfig};
use std::{io::Write, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};

/// One configured scan. [`Pipeline::run`] can be called more than once;
/// each run gets fresh queues, workers and counters.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScanConfig,
    processor: Processor,
}

impl Pipeline {
    pub fn new(config: ScanConfig, processor: Processor) -> Self {
        Self { config, processor }
    }

    /// Validates `config` and wires the real resolvers.
    pub fn from_config(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let processor = Processor::from_config(&config);
        Ok(Self::new(config, processor))
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Reads records from `input` until end of stream, then drains both
    /// queues and returns the run's counters.
    ///
    /// Records are split on `\n` as raw bytes. Invalid UTF-8 is replaced
    /// rather than rejected, so such a line comes out `MALFORMED` instead of
    /// ending the run.
    ///
    /// When this returns every outcome has been written to `writer` (or
    /// deliberately suppressed) and flushed.
    pub async fn run<R>(&self, input: R, writer: Box<dyn Write + Send>) -> PipelineSummary
    where
        R: AsyncBufRead + Unpin,
    {
        let stats = Arc::new(PipelineStats::default());
        let emitter = Emitter::new(writer, stats.clone());

        let (request_tx, request_rx) = mpsc::channel(self.config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(self.config.queue_capacity);

        let sink = spawn_sink(result_rx, emitter.clone());
        let results = ResultSender::new(
            result_tx,
            emitter.clone(),
            stats.clone(),
            self.config.enqueue_grace,
        );
        let workers = WorkerPool::spawn(
            self.config.workers,
            request_rx,
            self.processor.clone(),
            results.clone(),
        );
        let dispatcher = Dispatcher::new(
            request_tx,
            results,
            self.processor.clone(),
            stats.clone(),
            self.config.enqueue_grace,
        );

        tracing::debug!(
            workers = workers.len(),
            capacity = self.config.queue_capacity,
            "pipeline started"
        );

        let mut records = input.split(b'\n');
        loop {
            match records.next_segment().await {
                Ok(Some(raw)) => {
                    let line = String::from_utf8_lossy(&raw);
                    dispatcher.dispatch(parse_line(&line)).await;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read input, stopping");
                    break;
                }
            }
        }

        // Closing the request queue lets workers finish; once they and the
        // dispatcher have dropped their result senders the sink drains.
        drop(dispatcher);
        workers.join().await;
        if sink.await.is_err() {
            tracing::error!("output sink exited before draining");
        }
        if let Err(e) = tokio::task::spawn_blocking(move || emitter.flush()).await {
            tracing::error!(error = %e, "final flush failed");
        }

        let summary = stats.snapshot();
        tracing::debug!(?summary, "pipeline drained");
        summary
    }
}
