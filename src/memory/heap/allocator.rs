/*!
 * Heap Allocator Implementation
 * First-fit allocation, splitting, and forward coalescing
 */

use super::block::BlockHeader;
use super::Heap;
use crate::core::limits::{BLOCK_HEADER_SIZE, MIN_ALIGN, SPLIT_SLACK};
use crate::core::types::{align_up, Offset, SiteId, Size};
use crate::memory::types::{HeapPtr, MemoryError, MemoryResult};
use log::{debug, error, warn};

impl Heap {
    /// Allocate `size` bytes tagged with `site_id`
    ///
    /// Requests are rounded up to `MIN_ALIGN`; the profiler still records
    /// the requested size.
    pub fn alloc(&mut self, size: Size, site_id: SiteId) -> MemoryResult<HeapPtr> {
        if size > self.capacity() {
            return Err(self.out_of_memory(size, None));
        }
        let request = align_up(size.max(MIN_ALIGN), MIN_ALIGN);

        let mut cursor = Some(0);
        let mut largest_free = 0;

        while let Some(offset) = cursor {
            let mut header = BlockHeader::read(self.region(), offset)?;

            if !header.in_use && header.size >= request {
                if header.size > request + BLOCK_HEADER_SIZE + SPLIT_SLACK {
                    let split_at = offset + BLOCK_HEADER_SIZE + request;
                    let remainder =
                        BlockHeader::free(header.size - request - BLOCK_HEADER_SIZE, header.next);
                    remainder.write(self.region_mut(), split_at)?;

                    header.size = request;
                    header.next = Some(split_at);
                    debug!(
                        "Split block at 0x{:x}: allocated {} bytes, {} bytes remain at 0x{:x}",
                        offset, request, remainder.size, split_at
                    );
                } else {
                    debug!(
                        "Took whole block at 0x{:x}: {} bytes for a {} byte request",
                        offset, header.size, size
                    );
                }

                header.in_use = true;
                header.write(self.region_mut(), offset)?;

                self.used += header.size;
                self.allocations += 1;

                let ptr = HeapPtr::from_offset(offset + BLOCK_HEADER_SIZE);
                if let Some(profiler) = self.profiler.as_mut() {
                    profiler.record_birth(ptr, site_id, size);
                }
                return Ok(ptr);
            }

            if !header.in_use {
                largest_free = largest_free.max(header.size);
            }
            cursor = header.next;
        }

        Err(self.out_of_memory(size, Some(largest_free)))
    }

    /// Free the block owning `ptr` and merge it with following free blocks
    ///
    /// `ptr` must come from `alloc` on this heap. Pointers without a block
    /// header in front of them are rejected; freeing an already free block
    /// is a logged no-op.
    pub fn free(&mut self, ptr: HeapPtr) -> MemoryResult<()> {
        let payload = ptr.offset();
        let offset = payload
            .checked_sub(BLOCK_HEADER_SIZE)
            .ok_or(MemoryError::InvalidAddress(payload))?;
        let mut header = BlockHeader::read(self.region(), offset)
            .map_err(|_| MemoryError::InvalidAddress(payload))?;

        if !header.in_use {
            warn!("Ignoring free of already free block at 0x{:x}", payload);
            return Ok(());
        }

        if let Some(profiler) = self.profiler.as_mut() {
            if let Err(e) = profiler.record_death(ptr) {
                error!("Failed to log lifespan for 0x{:x}: {}", payload, e);
            }
        }

        header.in_use = false;
        self.used -= header.size;
        self.frees += 1;

        let merged = self.absorb_following(offset, &mut header)?;
        header.write(self.region_mut(), offset)?;

        debug!(
            "Freed block at 0x{:x}: now {} bytes after {} merge(s)",
            offset, header.size, merged
        );
        Ok(())
    }

    /// Merge every free block directly after `header` into it
    ///
    /// The caller writes `header` back afterwards.
    pub(super) fn absorb_following(
        &mut self,
        offset: Offset,
        header: &mut BlockHeader,
    ) -> MemoryResult<usize> {
        let mut merged = 0;
        while let Some(next_offset) = header.next {
            let next = BlockHeader::read(self.region(), next_offset)?;
            if next.in_use {
                break;
            }
            header.size += next.size + BLOCK_HEADER_SIZE;
            header.next = next.next;
            BlockHeader::retire(self.region_mut(), next_offset);
            merged += 1;
            debug!(
                "Coalesced block at 0x{:x} into 0x{:x}",
                next_offset, offset
            );
        }
        Ok(merged)
    }

    fn out_of_memory(&self, requested: Size, largest_free: Option<Size>) -> MemoryError {
        let largest_free = largest_free
            .or_else(|| self.stats().ok().map(|stats| stats.largest_free))
            .unwrap_or(0);
        error!(
            "OOM: requested {} bytes, largest free block {} bytes ({} used / {} total)",
            requested,
            largest_free,
            self.used,
            self.capacity()
        );
        MemoryError::OutOfMemory {
            requested,
            largest_free,
        }
    }
}
