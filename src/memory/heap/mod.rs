/*!
 * Heap Manager
 *
 * First-fit allocator over one fixed-size OS region.
 *
 * ## Layout
 *
 * The region is tiled by blocks, each an in-band header followed by its
 * payload. The `next` link of every header names the physically following
 * block, so walking the list from offset 0 visits the whole region in
 * address order and `Σ(size + header) == region size` at all times.
 *
 * ## Operations
 *
 * - **alloc**: first free block that fits; split when the leftover exceeds
 *   one header plus `SPLIT_SLACK`, otherwise hand over the whole block
 * - **free**: mark free, then merge with following free blocks only
 *   (a free predecessor is left alone; see `defragment`)
 * - **profiling**: optional shadow map of live allocations with lifespans
 *   logged on free
 */

mod allocator;
mod block;
mod defrag;
mod inspect;

use super::region::HeapRegion;
use super::traits::{Allocator, MemoryInfo};
use super::types::{HeapPtr, HeapStats, MemoryError, MemoryResult};
use crate::config::HeapConfig;
use crate::core::limits::{BLOCK_HEADER_SIZE, MIN_HEAP_SIZE};
use crate::core::types::{Address, SiteId, Size};
use crate::profiling::Profiler;
use block::BlockHeader;
use log::info;

/// Heap context: the region, its block list, and the optional profiler
#[derive(Debug)]
pub struct Heap {
    region: HeapRegion,
    profiler: Option<Profiler>,
    /// Payload bytes in live blocks
    used: Size,
    allocations: u64,
    frees: u64,
}

impl Heap {
    /// Map the region and install a single free block spanning it
    pub fn init(config: &HeapConfig) -> MemoryResult<Self> {
        if config.heap_size < MIN_HEAP_SIZE {
            return Err(MemoryError::RegionUnavailable {
                size: config.heap_size,
                reason: format!("region must hold at least {} bytes", MIN_HEAP_SIZE),
            });
        }

        let mut region = HeapRegion::map(config.heap_size)?;
        BlockHeader::free(config.heap_size - BLOCK_HEADER_SIZE, None).write(&mut region, 0)?;

        let profiler = if config.profiling {
            Some(Profiler::open(&config.telemetry_path)?)
        } else {
            None
        };

        info!(
            "Heap initialized with {} bytes (overhead per block: {} bytes, profiling: {})",
            config.heap_size,
            BLOCK_HEADER_SIZE,
            profiler.is_some()
        );

        Ok(Self {
            region,
            profiler,
            used: 0,
            allocations: 0,
            frees: 0,
        })
    }

    /// Create an unprofiled heap of `size` bytes (useful for testing)
    pub fn with_capacity(size: Size) -> MemoryResult<Self> {
        Self::init(&HeapConfig::default().with_heap_size(size).with_profiling(false))
    }

    /// Total region size
    #[inline]
    pub fn capacity(&self) -> Size {
        self.region.len()
    }

    /// Payload bytes currently handed out
    #[inline]
    pub fn used(&self) -> Size {
        self.used
    }

    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    /// Flush buffered telemetry rows, if profiling
    pub fn flush_telemetry(&mut self) -> MemoryResult<()> {
        match self.profiler.as_mut() {
            Some(profiler) => profiler.flush(),
            None => Ok(()),
        }
    }

    /// Raw address of a payload pointer
    #[inline]
    pub fn address_of(&self, ptr: HeapPtr) -> Address {
        self.region.base_address() + ptr.offset() as Address
    }

    /// Translate a raw address from the boundary back into this heap
    pub fn resolve(&self, address: Address) -> MemoryResult<HeapPtr> {
        let base = self.region.base_address();
        match address.checked_sub(base) {
            Some(delta) if delta < self.region.len() as Address => {
                Ok(HeapPtr::from_offset(delta as usize))
            }
            _ => Err(MemoryError::InvalidAddress(address as usize)),
        }
    }

    /// Payload size of the block owning `ptr`
    pub fn block_size(&self, ptr: HeapPtr) -> Option<Size> {
        let offset = ptr.offset().checked_sub(BLOCK_HEADER_SIZE)?;
        BlockHeader::read(&self.region, offset)
            .ok()
            .map(|header| header.size)
    }

    /// Borrow `len` bytes starting at `ptr`
    ///
    /// Bounds are checked against the region, not the owning block.
    pub fn payload(&self, ptr: HeapPtr, len: Size) -> MemoryResult<&[u8]> {
        let start = ptr.offset();
        start
            .checked_add(len)
            .and_then(|end| self.region.as_slice().get(start..end))
            .ok_or(MemoryError::InvalidAddress(start))
    }

    /// Mutably borrow `len` bytes starting at `ptr`
    pub fn payload_mut(&mut self, ptr: HeapPtr, len: Size) -> MemoryResult<&mut [u8]> {
        let start = ptr.offset();
        start
            .checked_add(len)
            .and_then(|end| self.region.as_mut_slice().get_mut(start..end))
            .ok_or(MemoryError::InvalidAddress(start))
    }

    pub(crate) fn region(&self) -> &HeapRegion {
        &self.region
    }

    pub(crate) fn region_mut(&mut self) -> &mut HeapRegion {
        &mut self.region
    }
}

// Implement trait interfaces
impl Allocator for Heap {
    fn allocate(&mut self, size: Size, site_id: SiteId) -> MemoryResult<HeapPtr> {
        Heap::alloc(self, size, site_id)
    }

    fn deallocate(&mut self, ptr: HeapPtr) -> MemoryResult<()> {
        Heap::free(self, ptr)
    }

    fn block_size(&self, ptr: HeapPtr) -> Option<Size> {
        Heap::block_size(self, ptr)
    }
}

impl MemoryInfo for Heap {
    fn stats(&self) -> MemoryResult<HeapStats> {
        Heap::stats(self)
    }

    fn info(&self) -> MemoryResult<(Size, Size, Size)> {
        let stats = Heap::stats(self)?;
        Ok((stats.total_memory, stats.used_memory, stats.free_memory))
    }
}
