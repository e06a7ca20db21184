/*!
 * Telemetry Log
 * Append-only CSV sink for completed allocation lifetimes
 */

use crate::core::limits::TELEMETRY_HEADER;
use crate::core::types::{SiteId, Size};
use crate::memory::types::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One completed allocation lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifespanSample {
    pub site_id: SiteId,
    /// Requested bytes
    pub size: Size,
    pub lifespan_ns: u64,
}

impl std::fmt::Display for LifespanSample {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{},{},{}", self.site_id, self.size, self.lifespan_ns)
    }
}

/// Buffered CSV writer, truncated on open
#[derive(Debug)]
pub struct TelemetryLog {
    writer: BufWriter<File>,
    path: PathBuf,
    rows: u64,
}

impl TelemetryLog {
    /// Create (or truncate) the log at `path` and write the header row
    pub fn create(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| telemetry_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", TELEMETRY_HEADER).map_err(|e| telemetry_error(&path, e))?;
        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn append(&mut self, sample: &LifespanSample) -> MemoryResult<()> {
        writeln!(self.writer, "{}", sample).map_err(|e| telemetry_error(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> MemoryResult<()> {
        self.writer
            .flush()
            .map_err(|e| telemetry_error(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written since open
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

fn telemetry_error(path: &Path, err: std::io::Error) -> MemoryError {
    MemoryError::Telemetry(format!("{}: {}", path.display(), err))
}
