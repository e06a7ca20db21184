/*!
 * Memory Types
 * Common types for heap and arena management
 */

use crate::core::limits::{PRESSURE_CRITICAL, PRESSURE_HIGH, PRESSURE_MEDIUM};
use crate::core::types::{Offset, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, largest free block {largest_free} bytes")]
    OutOfMemory { requested: usize, largest_free: usize },

    #[error("Arena overflow: requested {requested} bytes, {remaining} of {capacity} bytes remaining")]
    ArenaOverflow {
        requested: usize,
        remaining: usize,
        capacity: usize,
    },

    #[error("Size class too large: requested {size} bytes, largest slab class is {max} bytes")]
    ClassTooLarge { size: usize, max: usize },

    #[error("Heap region of {size} bytes unavailable: {reason}")]
    RegionUnavailable { size: usize, reason: String },

    #[error("Invalid memory address: 0x{0:x}")]
    InvalidAddress(usize),

    #[error("Memory corruption detected at offset 0x{0:x}")]
    CorruptionDetected(usize),

    #[error("Unknown arena handle: 0x{0:x}")]
    UnknownArena(u64),

    #[error("Invalid lifetime policy: {0}")]
    InvalidPolicy(u32),

    #[error("Telemetry log error: {0}")]
    Telemetry(String),
}

/// Payload location inside a heap region
///
/// Stored as an offset from the region base; converted to a raw address
/// only at the external boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapPtr(Offset);

impl HeapPtr {
    pub(crate) const fn from_offset(offset: Offset) -> Self {
        Self(offset)
    }

    /// Offset of the payload from the region base
    #[inline]
    pub const fn offset(self) -> Offset {
        self.0
    }

    /// Pointer `bytes` further into the region
    #[inline]
    pub(crate) const fn add(self, bytes: Size) -> Self {
        Self(self.0 + bytes)
    }
}

/// Snapshot of one block in the heap list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Offset of the block header
    pub offset: Offset,
    /// Payload bytes, excluding the header
    pub size: Size,
    pub in_use: bool,
}

impl BlockInfo {
    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> Offset {
        self.offset + crate::core::limits::BLOCK_HEADER_SIZE
    }
}

/// Heap statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeapStats {
    pub total_memory: usize,
    /// Payload bytes in live blocks
    pub used_memory: usize,
    /// Payload bytes in free blocks
    pub free_memory: usize,
    /// Bytes spent on block headers
    pub header_overhead: usize,
    pub block_count: usize,
    pub free_blocks: usize,
    pub largest_free: usize,
    pub usage_percentage: f64,
    /// Successful heap allocations since init
    pub allocations: u64,
    /// Heap frees since init
    pub frees: u64,
}

impl HeapStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.usage_percentage / 100.0)
    }

    /// Share of free bytes outside the largest free block, 0.0 when unfragmented
    pub fn fragmentation(&self) -> f64 {
        if self.free_memory == 0 {
            return 0.0;
        }
        1.0 - self.largest_free as f64 / self.free_memory as f64
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= PRESSURE_CRITICAL {
            MemoryPressure::Critical
        } else if ratio >= PRESSURE_HIGH {
            MemoryPressure::High
        } else if ratio >= PRESSURE_MEDIUM {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
