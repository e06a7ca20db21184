/*!
 * Heap Configuration
 *
 * Values are read once when the heap is initialized.
 *
 * Environment variables (see `HeapConfig::from_env`):
 * - LIFESPAN_HEAP_SIZE: region size in bytes
 * - LIFESPAN_PROFILING: enable the allocation profiler ("1" or "true")
 * - LIFESPAN_TELEMETRY_PATH: telemetry log location
 */

use crate::core::limits::{DEFAULT_HEAP_SIZE, DEFAULT_TELEMETRY_PATH};
use crate::core::types::Size;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_HEAP_SIZE: &str = "LIFESPAN_HEAP_SIZE";
pub const ENV_PROFILING: &str = "LIFESPAN_PROFILING";
pub const ENV_TELEMETRY_PATH: &str = "LIFESPAN_TELEMETRY_PATH";

/// Heap construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapConfig {
    /// Size of the OS region backing the heap
    pub heap_size: Size,
    /// Record allocation lifetimes to the telemetry log
    pub profiling: bool,
    /// Where the telemetry log is written when profiling
    pub telemetry_path: PathBuf,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            profiling: cfg!(feature = "profiling"),
            telemetry_path: PathBuf::from(DEFAULT_TELEMETRY_PATH),
        }
    }
}

impl HeapConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn apply_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENV_HEAP_SIZE) {
            match raw.trim().parse::<Size>() {
                Ok(size) => self.heap_size = size,
                Err(_) => warn!("Ignoring {}={:?}: not a byte count", ENV_HEAP_SIZE, raw),
            }
        }
        if let Ok(raw) = std::env::var(ENV_PROFILING) {
            self.profiling = matches!(raw.trim(), "1" | "true");
        }
        if let Ok(path) = std::env::var(ENV_TELEMETRY_PATH) {
            self.telemetry_path = PathBuf::from(path);
        }
        self
    }

    pub fn with_heap_size(mut self, heap_size: Size) -> Self {
        self.heap_size = heap_size;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    pub fn with_telemetry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.telemetry_path = path.into();
        self
    }
}
