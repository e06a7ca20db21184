/*!
 * Arena Allocation
 * Bump and slab strategies, slab free, and reset
 */

use super::slab::{class_size, slab_index};
use super::{Arena, Lifetime};
use crate::core::limits::{MIN_ALIGN, SLAB_CARVE_COUNT, SLAB_MAX_CLASS};
use crate::core::types::{checked_align_up, SiteId, Size};
use crate::memory::heap::Heap;
use crate::memory::types::{HeapPtr, MemoryError, MemoryResult};
use log::{debug, trace, warn};

impl Arena {
    /// Allocate `size` bytes (rounded up to 8) according to the arena policy
    ///
    /// Slab arenas resolve the size class before looking at capacity, so an
    /// oversized request is always `ClassTooLarge`. `site_id` is carried for
    /// tracing only; arena allocations are not individually profiled.
    pub fn alloc(&mut self, heap: &mut Heap, size: Size, site_id: SiteId) -> MemoryResult<HeapPtr> {
        let ptr = match self.policy {
            Lifetime::Transient | Lifetime::Persistent => {
                let rounded = checked_align_up(size, MIN_ALIGN)
                    .filter(|&rounded| rounded <= self.capacity)
                    .ok_or_else(|| self.overflow(size))?;
                self.bump(rounded)?
            }
            Lifetime::Intermediate => self.slab_alloc(heap, size)?,
        };
        self.sync_record(heap)?;

        trace!(
            "Arena 0x{:x} served {} bytes at 0x{:x} (site {})",
            self.base.offset(),
            size,
            ptr.offset(),
            site_id
        );
        Ok(ptr)
    }

    /// Return a slab slot to its class free list
    ///
    /// `size` must be the size originally requested for `ptr`; the class is
    /// derived from it. No-op for bump-policy arenas.
    pub fn free(&mut self, heap: &mut Heap, ptr: HeapPtr, size: Size) -> MemoryResult<()> {
        let Some(slabs) = self.slabs.as_mut() else {
            trace!(
                "Ignoring free on {} arena at 0x{:x}",
                self.policy,
                self.base.offset()
            );
            return Ok(());
        };

        let Some(index) = slab_index(size) else {
            warn!(
                "Ignoring slab free of {} bytes: larger than any size class",
                size
            );
            return Ok(());
        };

        let start = self.base.offset();
        if !(start..start + self.capacity).contains(&ptr.offset()) {
            return Err(MemoryError::InvalidAddress(ptr.offset()));
        }

        slabs.push(heap.region_mut(), index, ptr)?;
        self.sync_record(heap)
    }

    /// Rewind the arena so all of its memory can be handed out again
    ///
    /// Persistent arenas reject this with a warning and are left untouched.
    pub fn reset(&mut self, heap: &mut Heap) -> MemoryResult<()> {
        if !self.policy.is_resettable() {
            warn!(
                "Reset rejected: arena at 0x{:x} is persistent",
                self.base.offset()
            );
            return Ok(());
        }

        self.current = self.base.offset();
        self.size = 0;
        if let Some(slabs) = self.slabs.as_mut() {
            slabs.clear();
        }
        debug!(
            "Reset {} arena at 0x{:x}",
            self.policy,
            self.base.offset()
        );
        self.sync_record(heap)
    }

    /// Advance the bump cursor by `size` bytes
    fn bump(&mut self, size: Size) -> MemoryResult<HeapPtr> {
        if size > self.remaining() {
            return Err(self.overflow(size));
        }
        let ptr = HeapPtr::from_offset(self.current);
        self.current += size;
        self.size += size;
        Ok(ptr)
    }

    fn slab_alloc(&mut self, heap: &mut Heap, size: Size) -> MemoryResult<HeapPtr> {
        let rounded = checked_align_up(size, MIN_ALIGN);
        let index = rounded
            .and_then(slab_index)
            .ok_or(MemoryError::ClassTooLarge {
                size: rounded.unwrap_or(size),
                max: SLAB_MAX_CLASS,
            })?;

        if let Some(slabs) = self.slabs.as_mut() {
            if let Some(slot) = slabs.pop(heap.region(), index)? {
                return Ok(slot);
            }
        }

        // Empty class: carve a fresh chunk, keep the first slot, thread the rest
        let slot_size = class_size(index);
        let chunk = self.bump(slot_size * SLAB_CARVE_COUNT)?;
        if let Some(slabs) = self.slabs.as_mut() {
            for i in 1..SLAB_CARVE_COUNT {
                slabs.push(heap.region_mut(), index, chunk.add(i * slot_size))?;
            }
        }
        debug!(
            "Carved {} slots of {} bytes at 0x{:x}",
            SLAB_CARVE_COUNT,
            slot_size,
            chunk.offset()
        );
        Ok(chunk)
    }

    fn overflow(&self, requested: Size) -> MemoryError {
        warn!(
            "Arena overflow: requested {} bytes, {} of {} bytes remaining",
            requested,
            self.remaining(),
            self.capacity
        );
        MemoryError::ArenaOverflow {
            requested,
            remaining: self.remaining(),
            capacity: self.capacity,
        }
    }
}
