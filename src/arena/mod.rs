/*!
 * Arena Subsystem
 *
 * Sub-allocators carved from the heap, one lifetime policy each:
 *
 * - **Transient**: bump pointer, bulk-freed in O(1) by `reset`
 * - **Intermediate**: segregated slab classes with LIFO free lists,
 *   refilled 64 slots at a time from the bump region
 * - **Persistent**: bump pointer, released only by `destroy`
 *
 * Creating an arena performs two heap allocations: the arena record and
 * its backing region. `destroy` returns both. The record block holds a copy
 * of the arena's bookkeeping (see `ArenaRecord`), refreshed on every change.
 */

mod allocator;
mod policy;
mod record;
mod slab;

pub use policy::Lifetime;
pub use record::ArenaRecord;
pub use slab::{class_size, slab_index, SlabCache};

use crate::core::limits::ARENA_RECORD_SIZE;
use crate::core::types::{Offset, Size, INTERNAL_SITE};
use crate::memory::heap::Heap;
use crate::memory::types::{HeapPtr, MemoryResult};
use log::{debug, error};

/// One arena's bookkeeping
///
/// Offsets point into the owning heap's region. An `Arena` is only
/// meaningful together with the `Heap` it was created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    record: HeapPtr,
    base: HeapPtr,
    current: Offset,
    size: Size,
    capacity: Size,
    policy: Lifetime,
    slabs: Option<SlabCache>,
}

impl Arena {
    /// Allocate the arena record and a `capacity`-byte backing region
    pub fn create(heap: &mut Heap, capacity: Size, policy: Lifetime) -> MemoryResult<Self> {
        let record = heap.alloc(ARENA_RECORD_SIZE, INTERNAL_SITE)?;
        let base = match heap.alloc(capacity, INTERNAL_SITE) {
            Ok(base) => base,
            Err(e) => {
                error!(
                    "Arena backing allocation of {} bytes failed: {}",
                    capacity, e
                );
                heap.free(record)?;
                return Err(e);
            }
        };

        debug!(
            "Created {} arena at 0x{:x} ({} bytes)",
            policy,
            base.offset(),
            capacity
        );

        let arena = Self {
            record,
            base,
            current: base.offset(),
            size: 0,
            capacity,
            policy,
            slabs: policy.uses_slabs().then(SlabCache::new),
        };
        arena.sync_record(heap)?;
        Ok(arena)
    }

    /// Return the backing region, then the record, to the heap
    pub fn destroy(self, heap: &mut Heap) -> MemoryResult<()> {
        heap.free(self.base)?;
        heap.free(self.record)?;
        debug!("Destroyed {} arena at 0x{:x}", self.policy, self.base.offset());
        Ok(())
    }

    /// Heap allocation holding the arena record
    #[inline]
    pub fn record(&self) -> HeapPtr {
        self.record
    }

    #[inline]
    pub fn base(&self) -> HeapPtr {
        self.base
    }

    /// Bump cursor
    #[inline]
    pub fn current(&self) -> HeapPtr {
        HeapPtr::from_offset(self.current)
    }

    /// Bytes handed out from the bump region since creation or last reset
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn capacity(&self) -> Size {
        self.capacity
    }

    /// Bump space left
    #[inline]
    pub fn remaining(&self) -> Size {
        self.base.offset() + self.capacity - self.current
    }

    #[inline]
    pub fn policy(&self) -> Lifetime {
        self.policy
    }

    pub fn slabs(&self) -> Option<&SlabCache> {
        self.slabs.as_ref()
    }

    /// Whether `ptr` lies inside the backing region
    pub fn contains(&self, ptr: HeapPtr) -> bool {
        let start = self.base.offset();
        (start..start + self.capacity).contains(&ptr.offset())
    }
}
