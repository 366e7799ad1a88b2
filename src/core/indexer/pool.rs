//! Bounded pool of folder indexing workers.
//!
//! A worker slot is checked out with [`FolderIndexerWorkerPool::get_indexer`]
//! and bound to exactly one subtree job by [`FolderIndexerWorker::start`],
//! which runs the job on its own OS thread. The slot returns to the idle
//! set when the job ends, including when it panics.
//!
//! Back-pressure policy: when every slot is running, `get_indexer` waits
//! on a condition variable for at most the configured acquire timeout and
//! then fails with [`IndexerError::PoolExhausted`]. It never blocks
//! forever. After [`FolderIndexerWorkerPool::cancel`] no new work is
//! handed out and in-flight walks stop at their next leaf.

use crate::core::config::IndexingConfig;
use crate::core::error::{IndexerError, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Fixed-size set of reusable folder indexing workers
pub struct FolderIndexerWorkerPool {
    disabled: bool,
    capacity: usize,
    acquire_timeout: Duration,
    running: Mutex<usize>,
    slot_freed: Condvar,
    cancelled: AtomicBool,
    handles: Mutex<Vec<JoinHandle<Result<()>>>>,
    next_worker_id: AtomicUsize,
}

impl FolderIndexerWorkerPool {
    /// Create a pool from the indexing configuration
    pub fn new(config: &IndexingConfig) -> Self {
        Self::with_capacity(
            config.worker_pool_size,
            Duration::from_millis(config.worker_acquire_timeout_ms),
            !config.multi_threaded,
        )
    }

    pub fn with_capacity(capacity: usize, acquire_timeout: Duration, disabled: bool) -> Self {
        Self {
            disabled,
            capacity: capacity.max(1),
            acquire_timeout,
            running: Mutex::new(0),
            slot_freed: Condvar::new(),
            cancelled: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
            next_worker_id: AtomicUsize::new(0),
        }
    }

    /// Multi-threaded mode is off; all indexing happens on the caller
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check out an idle worker, waiting up to the acquire timeout
    pub fn get_indexer(self: &Arc<Self>) -> Result<FolderIndexerWorker> {
        if self.disabled {
            return Err(IndexerError::ConfigError(
                "Folder indexer pool is disabled".to_string(),
            ));
        }

        let deadline = Instant::now() + self.acquire_timeout;
        let mut running = self.running.lock();
        loop {
            if self.is_cancelled() {
                return Err(IndexerError::Interrupted(
                    "Folder indexer pool was cancelled".to_string(),
                ));
            }
            if *running < self.capacity {
                break;
            }
            if self
                .slot_freed
                .wait_until(&mut running, deadline)
                .timed_out()
                && *running >= self.capacity
            {
                return Err(IndexerError::PoolExhausted(format!(
                    "all {} folder indexers busy after {}ms",
                    self.capacity,
                    self.acquire_timeout.as_millis()
                )));
            }
        }

        *running += 1;
        let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "Checked out folder indexer {} ({}/{} running)",
            id,
            *running,
            self.capacity
        );

        Ok(FolderIndexerWorker {
            id,
            slot: WorkerSlot {
                pool: Arc::clone(self),
            },
        })
    }

    pub fn number_of_running_indexer(&self) -> usize {
        *self.running.lock()
    }

    pub fn number_of_available_indexer(&self) -> usize {
        self.capacity.saturating_sub(*self.running.lock())
    }

    /// Stop handing out work and ask in-flight walks to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _running = self.running.lock();
        self.slot_freed.notify_all();
        tracing::info!("Folder indexer pool cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation before a new run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Join every dispatched worker.
    ///
    /// Returns the first error a worker ended with; later errors are
    /// logged. A panicked worker counts as an interruption of its branch.
    pub fn await_completion(&self) -> Result<()> {
        let mut first_error: Option<IndexerError> = None;

        loop {
            let handles = std::mem::take(&mut *self.handles.lock());
            if handles.is_empty() {
                break;
            }

            for handle in handles {
                let name = handle
                    .thread()
                    .name()
                    .unwrap_or("folder-indexer")
                    .to_string();
                let error = match handle.join() {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => e,
                    Err(_) => {
                        tracing::error!("{} panicked", name);
                        IndexerError::Interrupted(format!("{name} panicked"))
                    }
                };

                if first_error.is_none() {
                    first_error = Some(error);
                } else {
                    tracing::warn!("{} ended with error: {}", name, error);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn release_slot(&self) {
        {
            let mut running = self.running.lock();
            *running = running.saturating_sub(1);
        }
        self.slot_freed.notify_one();
    }

    fn register(&self, handle: JoinHandle<Result<()>>) {
        self.handles.lock().push(handle);
    }
}

/// Returns its slot to the pool when dropped
struct WorkerSlot {
    pool: Arc<FolderIndexerWorkerPool>,
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.pool.release_slot();
    }
}

/// A checked-out worker, bound to one job once started
pub struct FolderIndexerWorker {
    id: usize,
    slot: WorkerSlot,
}

impl FolderIndexerWorker {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Run `job` on a new thread; the slot is released when it ends
    pub fn start<F>(self, job: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let FolderIndexerWorker { id, slot } = self;
        let pool = Arc::clone(&slot.pool);

        let handle = thread::Builder::new()
            .name(format!("folder-indexer-{id}"))
            .spawn(move || {
                let _slot = slot;
                tracing::debug!("Folder indexer {} started", id);

                let result = job();
                match &result {
                    Ok(()) => tracing::debug!("Folder indexer {} finished", id),
                    Err(e) if e.is_interrupted() => {
                        tracing::info!("Folder indexer {} interrupted: {}", id, e)
                    }
                    Err(e) => tracing::error!("Folder indexer {} failed: {}", id, e),
                }
                result
            })?;

        pool.register(handle);
        Ok(())
    }
}
