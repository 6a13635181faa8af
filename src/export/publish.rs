use std::fmt;
use std::sync::mpsc;
use std::thread::JoinHandle;

use super::{Archiver, ContentStore, Ledger, Snapshot, ARCHIVE_FILE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Archive,
    Upload,
    Ledger,
    /// The worker thread ended without producing a report.
    Worker,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Archive => "archive",
            Self::Upload => "upload",
            Self::Ledger => "ledger",
            Self::Worker => "worker",
        };
        f.write_str(name)
    }
}

/// Outcome of one publish run. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReport {
    Published { hash: String, transaction: String },
    Failed { stage: PublishStage, message: String },
}

impl PublishReport {
    fn failed(stage: PublishStage, err: impl fmt::Display) -> Self {
        let message = err.to_string();
        tracing::warn!(%stage, %message, "publish failed");
        Self::Failed { stage, message }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Archive, upload, then record the content hash. Each stage runs once.
#[derive(Debug, Clone)]
pub struct PublishPipeline<A, C, L> {
    archiver: A,
    store: C,
    ledger: L,
}

impl<A, C, L> PublishPipeline<A, C, L>
where
    A: Archiver,
    C: ContentStore,
    L: Ledger,
{
    pub const fn new(archiver: A, store: C, ledger: L) -> Self {
        Self {
            archiver,
            store,
            ledger,
        }
    }

    pub fn publish(&self, snapshot: &Snapshot) -> PublishReport {
        let archive = match self.archiver.archive(snapshot) {
            Ok(bytes) => bytes,
            Err(err) => return PublishReport::failed(PublishStage::Archive, err),
        };
        let hash = match self.store.put(ARCHIVE_FILE_NAME, &archive) {
            Ok(hash) => hash,
            Err(err) => return PublishReport::failed(PublishStage::Upload, err),
        };
        match self.ledger.store_hash(&hash) {
            Ok(transaction) => {
                tracing::info!(%hash, %transaction, "drawing published");
                PublishReport::Published { hash, transaction }
            }
            Err(err) => PublishReport::failed(PublishStage::Ledger, err),
        }
    }
}

/// A publish running on a worker thread.
#[derive(Debug)]
pub struct PendingPublish {
    receiver: mpsc::Receiver<PublishReport>,
    worker: Option<JoinHandle<()>>,
}

impl PendingPublish {
    /// Non-blocking poll; `None` while the worker is still busy.
    pub fn try_report(&mut self) -> Option<PublishReport> {
        match self.receiver.try_recv() {
            Ok(report) => {
                self.join_worker();
                Some(report)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.join_worker();
                Some(worker_lost())
            }
        }
    }

    pub fn wait(mut self) -> PublishReport {
        let report = self.receiver.recv().unwrap_or_else(|_| worker_lost());
        self.join_worker();
        report
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("publish worker panicked");
            }
        }
    }
}

fn worker_lost() -> PublishReport {
    PublishReport::failed(PublishStage::Worker, "publish worker exited without a report")
}

/// Runs `pipeline` on its own thread so the caller never blocks on the network.
pub fn spawn_publish<A, C, L>(pipeline: PublishPipeline<A, C, L>, snapshot: Snapshot) -> PendingPublish
where
    A: Archiver + Send + 'static,
    C: ContentStore + Send + 'static,
    L: Ledger + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let worker = std::thread::spawn(move || {
        let report = pipeline.publish(&snapshot);
        let _ = tx.send(report);
    });
    PendingPublish {
        receiver: rx,
        worker: Some(worker),
    }
}
