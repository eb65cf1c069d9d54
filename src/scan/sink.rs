//! Output side: the shared line writer and the single queue consumer.
//!
//! Writes are blocking. They only ever happen on the sink's own thread or,
//! for direct emits, on tokio's blocking pool; never on a runtime worker.

use super::{outcome::Outcome, stats::PipelineStats};
use std::{
    io::Write,
    sync::{Arc, Mutex},
    thread,
};
use tokio::sync::{mpsc, oneshot};

/// Cloneable handle over the one writer results go to.
///
/// Each emitted outcome is written as one whole line under a lock, so the
/// sink and producer-side fallbacks never interleave partial lines.
#[derive(Clone)]
pub struct Emitter {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    stats: Arc<PipelineStats>,
}

impl Emitter {
    pub fn new(writer: Box<dyn Write + Send>, stats: Arc<PipelineStats>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            stats,
        }
    }

    /// Writes `outcome` if it is flagged for emission.
    ///
    /// Write failures are logged and swallowed; a closed pipe downstream
    /// must not stall the resolution side.
    pub fn emit(&self, outcome: &Outcome) {
        if !outcome.should_emit() {
            return;
        }

        let line = format!("{outcome}\n");
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match writer.write_all(line.as_bytes()) {
            Ok(()) => self.stats.record_emitted(),
            Err(e) => tracing::warn!(error = %e, line = %outcome.line(), "failed to write result"),
        }
    }

    pub fn flush(&self) {
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.flush() {
            tracing::warn!(error = %e, "failed to flush results");
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}

/// Drains the result queue in arrival order until every sender is gone.
///
/// Blocks the calling thread; see [`spawn_sink`].
pub fn run_sink(mut results: mpsc::Receiver<Outcome>, emitter: Emitter) {
    while let Some(outcome) = results.blocking_recv() {
        emitter.emit(&outcome);
    }
    emitter.flush();
    tracing::debug!("output sink drained");
}

/// Runs [`run_sink`] on a dedicated thread. The returned receiver resolves
/// once the queue is drained and flushed.
///
/// If the thread cannot be started the queue receiver is dropped with it,
/// so every delivery sees a closed queue and is emitted directly.
pub fn spawn_sink(results: mpsc::Receiver<Outcome>, emitter: Emitter) -> oneshot::Receiver<()> {
    let (done_tx, done_rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("result-sink".into())
        .spawn(move || {
            run_sink(results, emitter);
            let _ = done_tx.send(());
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "failed to start output sink, emitting directly");
    }
    done_rx
}
