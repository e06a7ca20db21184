/*!
 * Arena Record
 * In-heap image of an arena's bookkeeping
 *
 * Layout (little-endian words, `ARENA_RECORD_SIZE` bytes):
 * - word 0: base offset
 * - word 1: bump cursor
 * - word 2: bytes handed out from the bump region
 * - word 3: capacity
 * - word 4: policy code
 * - words 5..13: slab free-list heads, `NO_LINK` when empty
 *
 * The record is rewritten after every operation that changes the arena, so
 * the block behind an `ArenaHandle` always mirrors the live state.
 */

use super::slab::NO_LINK;
use super::{Arena, Lifetime};
use crate::core::limits::SLAB_CLASS_COUNT;
use crate::core::types::{Offset, Size};
use crate::memory::heap::Heap;
use crate::memory::types::{HeapPtr, MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};

const BASE_WORD: usize = 0;
const CURRENT_WORD: usize = 1;
const SIZE_WORD: usize = 2;
const CAPACITY_WORD: usize = 3;
const POLICY_WORD: usize = 4;
const HEADS_WORD: usize = 5;

/// Decoded arena record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaRecord {
    pub base: Offset,
    pub current: Offset,
    pub size: Size,
    pub capacity: Size,
    pub policy: Lifetime,
    pub heads: [Option<Offset>; SLAB_CLASS_COUNT],
}

impl ArenaRecord {
    /// Read the record stored at `record`
    pub fn load(heap: &Heap, record: HeapPtr) -> MemoryResult<Self> {
        let region = heap.region();
        let word = |index: usize| {
            region
                .read_u64(record.offset() + index * 8)
                .ok_or(MemoryError::CorruptionDetected(record.offset()))
        };
        let offset = |index: usize| {
            usize::try_from(word(index)?).map_err(|_| MemoryError::CorruptionDetected(record.offset()))
        };

        let code = u32::try_from(word(POLICY_WORD)?)
            .map_err(|_| MemoryError::CorruptionDetected(record.offset()))?;
        let mut heads = [None; SLAB_CLASS_COUNT];
        for (index, head) in heads.iter_mut().enumerate() {
            *head = match word(HEADS_WORD + index)? {
                NO_LINK => None,
                _ => Some(offset(HEADS_WORD + index)?),
            };
        }

        Ok(Self {
            base: offset(BASE_WORD)?,
            current: offset(CURRENT_WORD)?,
            size: offset(SIZE_WORD)?,
            capacity: offset(CAPACITY_WORD)?,
            policy: Lifetime::try_from(code)?,
            heads,
        })
    }

    /// Write this record at `record`
    pub fn store(&self, heap: &mut Heap, record: HeapPtr) -> MemoryResult<()> {
        let region = heap.region_mut();
        let mut words = [0u64; HEADS_WORD + SLAB_CLASS_COUNT];
        words[BASE_WORD] = self.base as u64;
        words[CURRENT_WORD] = self.current as u64;
        words[SIZE_WORD] = self.size as u64;
        words[CAPACITY_WORD] = self.capacity as u64;
        words[POLICY_WORD] = self.policy as u32 as u64;
        for (index, head) in self.heads.iter().enumerate() {
            words[HEADS_WORD + index] = head.map_or(NO_LINK, |h| h as u64);
        }

        for (index, value) in words.into_iter().enumerate() {
            if !region.write_u64(record.offset() + index * 8, value) {
                return Err(MemoryError::InvalidAddress(record.offset()));
            }
        }
        Ok(())
    }
}

impl Arena {
    /// Snapshot of the in-memory state in record form
    pub fn to_record(&self) -> ArenaRecord {
        ArenaRecord {
            base: self.base.offset(),
            current: self.current,
            size: self.size,
            capacity: self.capacity,
            policy: self.policy,
            heads: self
                .slabs
                .as_ref()
                .map_or([None; SLAB_CLASS_COUNT], |slabs| slabs.heads()),
        }
    }

    /// Rewrite the heap record from the in-memory state
    pub(super) fn sync_record(&self, heap: &mut Heap) -> MemoryResult<()> {
        self.to_record().store(heap, self.record)
    }
}
