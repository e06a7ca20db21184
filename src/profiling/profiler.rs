/*!
 * Allocation Profiler
 * Shadow map from live heap pointers to birth metadata
 */

use super::telemetry::{LifespanSample, TelemetryLog};
use crate::core::types::{SiteId, Size};
use crate::memory::types::{HeapPtr, MemoryResult};
use ahash::RandomState;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Birth metadata for one live allocation
#[derive(Debug, Clone, Copy)]
pub struct AllocationRecord {
    pub site_id: SiteId,
    /// Requested bytes
    pub size: Size,
    pub birth_time: Instant,
}

/// Lifetime profiler attached to the heap's alloc/free paths
///
/// Records that are never freed stay in the shadow map and are never
/// written to the log.
#[derive(Debug)]
pub struct Profiler {
    shadow: HashMap<HeapPtr, AllocationRecord, RandomState>,
    log: TelemetryLog,
}

impl Profiler {
    /// Open (truncating) the telemetry log at `path`
    pub fn open(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let log = TelemetryLog::create(path)?;
        info!(
            "Profiling enabled: logging allocation lifetimes to {}",
            log.path().display()
        );
        Ok(Self {
            shadow: HashMap::with_hasher(RandomState::new()),
            log,
        })
    }

    /// Record the birth of the allocation at `ptr`
    pub fn record_birth(&mut self, ptr: HeapPtr, site_id: SiteId, size: Size) {
        self.shadow.insert(
            ptr,
            AllocationRecord {
                site_id,
                size,
                birth_time: Instant::now(),
            },
        );
    }

    /// Retire the record for `ptr` and append its lifespan to the log
    ///
    /// Returns `None` when no record exists for `ptr`.
    pub fn record_death(&mut self, ptr: HeapPtr) -> MemoryResult<Option<LifespanSample>> {
        let Some(record) = self.shadow.remove(&ptr) else {
            return Ok(None);
        };

        let lifespan_ns = u64::try_from(record.birth_time.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let sample = LifespanSample {
            site_id: record.site_id,
            size: record.size,
            lifespan_ns,
        };
        self.log.append(&sample)?;
        Ok(Some(sample))
    }

    /// Metadata for a live allocation
    pub fn record(&self, ptr: HeapPtr) -> Option<&AllocationRecord> {
        self.shadow.get(&ptr)
    }

    /// Allocations born but not yet freed
    pub fn live_records(&self) -> usize {
        self.shadow.len()
    }

    /// Lifetimes written to the log so far
    pub fn completed(&self) -> u64 {
        self.log.rows()
    }

    pub fn flush(&mut self) -> MemoryResult<()> {
        self.log.flush()
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }
}
