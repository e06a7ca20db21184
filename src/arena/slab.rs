/*!
 * Slab Cache
 *
 * Eight power-of-two size classes (32..=4096 bytes), each with a LIFO free
 * list. A slot on a free list holds the offset of the next free slot in its
 * first word; once popped, the slot is opaque payload and its first word is
 * never read as a link again.
 */

use crate::core::limits::{SLAB_CLASS_COUNT, SLAB_MAX_CLASS, SLAB_MIN_CLASS};
use crate::core::types::{Offset, Size};
use crate::memory::region::HeapRegion;
use crate::memory::types::{HeapPtr, MemoryError, MemoryResult};

/// Link value marking the end of a free list
pub(crate) const NO_LINK: u64 = u64::MAX;

/// Size class index for `size`, or `None` above the largest class
#[inline]
pub fn slab_index(size: Size) -> Option<usize> {
    if size > SLAB_MAX_CLASS {
        return None;
    }
    if size <= SLAB_MIN_CLASS {
        return Some(0);
    }
    // Round up to a power of two, then count doublings above the smallest class
    Some((size.next_power_of_two().trailing_zeros() - SLAB_MIN_CLASS.trailing_zeros()) as usize)
}

/// Slot size of class `index`
#[inline]
pub const fn class_size(index: usize) -> Size {
    SLAB_MIN_CLASS << index
}

/// Per-class free-list heads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlabCache {
    heads: [Option<Offset>; SLAB_CLASS_COUNT],
}

impl SlabCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every free list
    pub fn clear(&mut self) {
        self.heads = [None; SLAB_CLASS_COUNT];
    }

    /// Current head of every class list
    pub fn heads(&self) -> [Option<Offset>; SLAB_CLASS_COUNT] {
        self.heads
    }

    #[inline]
    pub fn is_empty(&self, index: usize) -> bool {
        self.heads[index].is_none()
    }

    /// Pop the most recently pushed slot of class `index`
    pub fn pop(&mut self, region: &HeapRegion, index: usize) -> MemoryResult<Option<HeapPtr>> {
        let Some(slot) = self.heads[index] else {
            return Ok(None);
        };
        let link = region
            .read_u64(slot)
            .ok_or(MemoryError::CorruptionDetected(slot))?;
        self.heads[index] = decode_link(slot, link)?;
        Ok(Some(HeapPtr::from_offset(slot)))
    }

    /// Push `ptr` onto the free list of class `index`
    pub fn push(&mut self, region: &mut HeapRegion, index: usize, ptr: HeapPtr) -> MemoryResult<()> {
        let link = self.heads[index].map_or(NO_LINK, |next| next as u64);
        if !region.write_u64(ptr.offset(), link) {
            return Err(MemoryError::InvalidAddress(ptr.offset()));
        }
        self.heads[index] = Some(ptr.offset());
        Ok(())
    }

    /// Number of slots on the free list of class `index`
    pub fn free_slots(&self, region: &HeapRegion, index: usize) -> MemoryResult<usize> {
        let mut count = 0;
        let mut cursor = self.heads[index];
        while let Some(slot) = cursor {
            count += 1;
            let link = region
                .read_u64(slot)
                .ok_or(MemoryError::CorruptionDetected(slot))?;
            cursor = decode_link(slot, link)?;
        }
        Ok(count)
    }
}

fn decode_link(slot: Offset, link: u64) -> MemoryResult<Option<Offset>> {
    match link {
        NO_LINK => Ok(None),
        raw => usize::try_from(raw)
            .map(Some)
            .map_err(|_| MemoryError::CorruptionDetected(slot)),
    }
}
