//! Progress and metrics of a full indexing run.
//!
//! Counters are incremented from arbitrary worker threads while a run
//! is in progress. They use atomics and a concurrent map, are reset only
//! by [`FullIndexerStatus::indexing_started`] and never decrease within
//! a run. Read accessors are pure views and fail with
//! [`IndexerError::StatusNotStarted`] until the first run has started.

use crate::core::error::{IndexerError, Result};
use crate::core::indexer::file_document::FileDocumentFactory;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle of the full indexer.
///
/// `Sleeping` is entered and left by the external scheduler between
/// runs; the run itself moves `Stopped -> Running -> Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexerState {
    Stopped,
    Running,
    Finished,
    Sleeping,
}

#[derive(Debug, Default)]
struct RunTiming {
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    full_indexing_time_ms: u64,
}

/// Process-wide counters and timers of the full indexer
pub struct FullIndexerStatus {
    state: RwLock<IndexerState>,
    timing: RwLock<RunTiming>,
    document_count: AtomicU64,
    part_document_counters: Vec<AtomicU64>,
    document_counters: DashMap<String, u64>,
    file_type_counters: DashMap<String, u64>,
    index_queue_size: AtomicU64,
    file_documents: Arc<FileDocumentFactory>,
}

/// Serializable point-in-time view of the status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: IndexerState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub full_indexing_time_ms: u64,
    pub document_count: u64,
    pub index_per_minute: u64,
    pub part_document_counts: Vec<u64>,
    pub document_counters: BTreeMap<String, u64>,
    pub file_type_counters: BTreeMap<String, u64>,
    pub excluded_document_count: u64,
    pub index_queue_size: u64,
}

impl FullIndexerStatus {
    /// Create a status with one part counter per partial indexer
    pub fn new(parts: usize, file_documents: Arc<FileDocumentFactory>) -> Self {
        Self {
            state: RwLock::new(IndexerState::Stopped),
            timing: RwLock::new(RunTiming::default()),
            document_count: AtomicU64::new(0),
            part_document_counters: (0..parts).map(|_| AtomicU64::new(0)).collect(),
            document_counters: DashMap::new(),
            file_type_counters: DashMap::new(),
            index_queue_size: AtomicU64::new(0),
            file_documents,
        }
    }

    /// Start a run: reset every counter and switch to `Running`
    pub fn indexing_started(&self) {
        self.document_count.store(0, Ordering::SeqCst);
        for counter in &self.part_document_counters {
            counter.store(0, Ordering::SeqCst);
        }
        self.document_counters.clear();
        self.file_type_counters.clear();
        self.index_queue_size.store(0, Ordering::SeqCst);
        self.file_documents.reset_excluded_count();

        {
            let mut timing = self.timing.write();
            timing.started_at = Some(Utc::now());
            timing.finished_at = None;
            timing.full_indexing_time_ms = 0;
        }
        *self.state.write() = IndexerState::Running;

        tracing::info!("Full indexing started");
    }

    /// Finish a run: record the end time and the elapsed duration
    pub fn indexing_finished(&self) -> Result<()> {
        let elapsed_ms = {
            let mut timing = self.timing.write();
            let started_at = timing.started_at.ok_or(IndexerError::StatusNotStarted)?;
            let finished_at = Utc::now();
            let elapsed = finished_at
                .signed_duration_since(started_at)
                .num_milliseconds()
                .max(0) as u64;
            timing.finished_at = Some(finished_at);
            timing.full_indexing_time_ms = elapsed;
            elapsed
        };
        *self.state.write() = IndexerState::Finished;

        tracing::info!(
            "Full indexing finished: {} documents in {}ms",
            self.document_count.load(Ordering::SeqCst),
            elapsed_ms
        );
        Ok(())
    }

    pub fn set_sleeping(&self) {
        *self.state.write() = IndexerState::Sleeping;
    }

    pub fn set_stopped(&self) {
        *self.state.write() = IndexerState::Stopped;
    }

    pub fn state(&self) -> IndexerState {
        *self.state.read()
    }

    /// Count one appended document, returning the new total
    pub fn increment_document_count(&self) -> u64 {
        self.document_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Count one document for the given partial indexer
    pub fn increment_part_document_count(&self, part: usize) {
        match self.part_document_counters.get(part) {
            Some(counter) => {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            None => tracing::debug!("No counter for partial indexer {}", part),
        }
    }

    pub fn increment_document_type(&self, document_type: &str) {
        *self
            .document_counters
            .entry(document_type.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_file_type(&self, file_type: &str) {
        *self
            .file_type_counters
            .entry(file_type.to_string())
            .or_insert(0) += 1;
    }

    /// A document entered the writer queue
    pub fn queue_entered(&self) {
        self.index_queue_size.fetch_add(1, Ordering::SeqCst);
    }

    /// A document left the writer queue
    pub fn queue_left(&self) {
        let _ = self
            .index_queue_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
    }

    pub fn number_of_parts(&self) -> usize {
        self.part_document_counters.len()
    }

    fn ensure_started(&self) -> Result<()> {
        if self.timing.read().started_at.is_none() {
            return Err(IndexerError::StatusNotStarted);
        }
        Ok(())
    }

    pub fn document_count(&self) -> Result<u64> {
        self.ensure_started()?;
        Ok(self.document_count.load(Ordering::SeqCst))
    }

    pub fn part_document_counts(&self) -> Result<Vec<u64>> {
        self.ensure_started()?;
        Ok(self
            .part_document_counters
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .collect())
    }

    pub fn document_counters(&self) -> Result<BTreeMap<String, u64>> {
        self.ensure_started()?;
        Ok(collect_counters(&self.document_counters))
    }

    /// Per-type counts as `type=count` lines sorted by type
    pub fn document_counters_text(&self) -> Result<String> {
        Ok(format_counters(&self.document_counters()?))
    }

    pub fn file_type_counters(&self) -> Result<BTreeMap<String, u64>> {
        self.ensure_started()?;
        Ok(collect_counters(&self.file_type_counters))
    }

    pub fn file_type_counters_text(&self) -> Result<String> {
        Ok(format_counters(&self.file_type_counters()?))
    }

    /// Files the document factory refused during this run
    pub fn excluded_document_count(&self) -> Result<u64> {
        self.ensure_started()?;
        Ok(self.file_documents.excluded_count())
    }

    pub fn index_queue_size(&self) -> u64 {
        self.index_queue_size.load(Ordering::SeqCst)
    }

    /// End time of the last finished run
    pub fn last_full_index_time(&self) -> Option<DateTime<Utc>> {
        self.timing.read().finished_at
    }

    /// Duration of the last run, or elapsed time while running
    pub fn full_indexing_time_ms(&self) -> Result<u64> {
        let timing = self.timing.read();
        let started_at = timing.started_at.ok_or(IndexerError::StatusNotStarted)?;
        if self.state() == IndexerState::Running {
            return Ok(Utc::now()
                .signed_duration_since(started_at)
                .num_milliseconds()
                .max(0) as u64);
        }
        Ok(timing.full_indexing_time_ms)
    }

    /// Documents indexed per minute over the run so far
    pub fn index_per_minute(&self) -> Result<u64> {
        let documents = self.document_count()?;
        let elapsed_ms = self.full_indexing_time_ms()?;
        if elapsed_ms == 0 {
            return Ok(0);
        }
        Ok((documents as f64 * 60_000.0 / elapsed_ms as f64) as u64)
    }

    pub fn snapshot(&self) -> Result<StatusSnapshot> {
        let (started_at, finished_at) = {
            let timing = self.timing.read();
            (timing.started_at, timing.finished_at)
        };

        Ok(StatusSnapshot {
            state: self.state(),
            started_at,
            finished_at,
            full_indexing_time_ms: self.full_indexing_time_ms()?,
            document_count: self.document_count()?,
            index_per_minute: self.index_per_minute()?,
            part_document_counts: self.part_document_counts()?,
            document_counters: self.document_counters()?,
            file_type_counters: self.file_type_counters()?,
            excluded_document_count: self.excluded_document_count()?,
            index_queue_size: self.index_queue_size(),
        })
    }
}

fn collect_counters(map: &DashMap<String, u64>) -> BTreeMap<String, u64> {
    map.iter()
        .map(|entry| (entry.key().clone(), *entry.value()))
        .collect()
}

fn format_counters(counters: &BTreeMap<String, u64>) -> String {
    counters
        .iter()
        .map(|(name, count)| format!("{name}={count}"))
        .collect::<Vec<_>>()
        .join("\n")
}
