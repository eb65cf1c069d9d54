//! Fixed-size pool of resolution workers draining the request queue.

use super::{dispatch::ResultSender, processor::Processor, request::ResolutionRequest};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};

type SharedRequests = Arc<Mutex<mpsc::Receiver<ResolutionRequest>>>;

/// Handles on the spawned workers.
///
/// Workers exit once the request queue is closed and drained; [`join`]
/// waits for that.
///
/// [`join`]: WorkerPool::join
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers sharing `requests`. Each one holds its own
    /// clone of the result sender, so the result queue stays open until
    /// the last worker is done.
    pub fn spawn(
        size: usize,
        requests: mpsc::Receiver<ResolutionRequest>,
        processor: Processor,
        results: ResultSender,
    ) -> Self {
        let requests: SharedRequests = Arc::new(Mutex::new(requests));
        let handles = (0..size)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    requests.clone(),
                    processor.clone(),
                    results.clone(),
                ))
            })
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker to finish. A panicked worker is logged, not
    /// propagated.
    pub async fn join(self) {
        for result in futures::future::join_all(self.handles).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "resolution worker failed");
            }
        }
    }
}

async fn run_worker(
    id: usize,
    requests: SharedRequests,
    processor: Processor,
    results: ResultSender,
) {
    let mut handled = 0usize;
    loop {
        // The lock is only held while waiting for the next item.
        let next = requests.lock().await.recv().await;
        let Some(request) = next else { break };

        let outcome = processor.process(&request).await;
        results.deliver(outcome).await;
        handled += 1;
    }
    tracing::trace!(worker = id, handled, "worker exiting");
}
