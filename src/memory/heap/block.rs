/*!
 * Block Headers
 * In-band header encoding for the heap's block list
 *
 * Layout (little-endian, 24 bytes):
 * - word 0: payload size
 * - word 1: tag (magic in the upper half, in-use bit in bit 0)
 * - word 2: offset of the next block, or `NO_NEXT`
 */

use crate::core::limits::BLOCK_HEADER_SIZE;
use crate::core::types::{Offset, Size};
use crate::memory::region::HeapRegion;
use crate::memory::types::{MemoryError, MemoryResult};

const BLOCK_MAGIC: u64 = 0x5AFE_B10C;
const IN_USE_BIT: u64 = 1;
const NO_NEXT: u64 = u64::MAX;

const SIZE_WORD: Offset = 0;
const TAG_WORD: Offset = 8;
const NEXT_WORD: Offset = 16;

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub size: Size,
    pub in_use: bool,
    pub next: Option<Offset>,
}

impl BlockHeader {
    pub fn free(size: Size, next: Option<Offset>) -> Self {
        Self {
            size,
            in_use: false,
            next,
        }
    }

    /// Decode the header at `offset`
    pub fn read(region: &HeapRegion, offset: Offset) -> MemoryResult<Self> {
        let word = |at: Offset| {
            region
                .read_u64(offset + at)
                .ok_or(MemoryError::CorruptionDetected(offset))
        };

        let tag = word(TAG_WORD)?;
        if tag >> 32 != BLOCK_MAGIC {
            return Err(MemoryError::CorruptionDetected(offset));
        }

        let size = usize::try_from(word(SIZE_WORD)?)
            .map_err(|_| MemoryError::CorruptionDetected(offset))?;
        let next = match word(NEXT_WORD)? {
            NO_NEXT => None,
            raw => Some(
                usize::try_from(raw).map_err(|_| MemoryError::CorruptionDetected(offset))?,
            ),
        };

        // The list mirrors physical layout; anything else is a damaged header.
        if let Some(next) = next {
            if Some(next) != offset.checked_add(BLOCK_HEADER_SIZE + size) {
                return Err(MemoryError::CorruptionDetected(offset));
            }
        }

        Ok(Self {
            size,
            in_use: tag & IN_USE_BIT != 0,
            next,
        })
    }

    /// Encode this header at `offset`
    pub fn write(&self, region: &mut HeapRegion, offset: Offset) -> MemoryResult<()> {
        let tag = (BLOCK_MAGIC << 32) | if self.in_use { IN_USE_BIT } else { 0 };
        let next = self.next.map_or(NO_NEXT, |n| n as u64);

        let ok = region.write_u64(offset + SIZE_WORD, self.size as u64)
            && region.write_u64(offset + TAG_WORD, tag)
            && region.write_u64(offset + NEXT_WORD, next);
        if ok {
            Ok(())
        } else {
            Err(MemoryError::CorruptionDetected(offset))
        }
    }

    /// Erase the tag of a header absorbed by a merge
    pub fn retire(region: &mut HeapRegion, offset: Offset) {
        region.write_u64(offset + TAG_WORD, 0);
    }
}
