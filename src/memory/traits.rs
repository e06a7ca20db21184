/*!
 * Memory Traits
 * Memory management abstractions
 */

use super::types::*;
use crate::core::types::{SiteId, Size};

/// Allocator interface
///
/// Single-threaded: every operation takes `&mut self`.
pub trait Allocator {
    /// Allocate `size` bytes for the call site `site_id`
    fn allocate(&mut self, size: Size, site_id: SiteId) -> MemoryResult<HeapPtr>;

    /// Release an allocation
    fn deallocate(&mut self, ptr: HeapPtr) -> MemoryResult<()>;

    /// Get the size of the block owning `ptr`
    fn block_size(&self, ptr: HeapPtr) -> Option<Size>;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryResult<HeapStats>;

    /// Get memory info as (total, used, free)
    fn info(&self) -> MemoryResult<(Size, Size, Size)>;

    /// Get memory pressure level
    fn pressure(&self) -> MemoryResult<MemoryPressure> {
        Ok(self.stats()?.memory_pressure())
    }
}
