/*!
 * Heap Inspection
 * Block walks, statistics, and structural verification
 */

use super::block::BlockHeader;
use super::Heap;
use crate::core::limits::BLOCK_HEADER_SIZE;
use crate::memory::types::{BlockInfo, HeapStats, MemoryError, MemoryResult};

impl Heap {
    /// Walk the block list in address order
    pub fn blocks(&self) -> MemoryResult<Vec<BlockInfo>> {
        let mut blocks = Vec::new();
        let mut cursor = Some(0);
        while let Some(offset) = cursor {
            let header = BlockHeader::read(self.region(), offset)?;
            blocks.push(BlockInfo {
                offset,
                size: header.size,
                in_use: header.in_use,
            });
            cursor = header.next;
        }
        Ok(blocks)
    }

    /// Current heap statistics
    ///
    /// Fails with `CorruptionDetected` when the block walk hits a damaged
    /// header.
    pub fn stats(&self) -> MemoryResult<HeapStats> {
        let blocks = self.blocks()?;

        let total = self.capacity();
        let mut stats = HeapStats {
            total_memory: total,
            used_memory: self.used,
            block_count: blocks.len(),
            header_overhead: blocks.len() * BLOCK_HEADER_SIZE,
            allocations: self.allocations,
            frees: self.frees,
            ..Default::default()
        };
        for block in blocks.iter().filter(|b| !b.in_use) {
            stats.free_memory += block.size;
            stats.free_blocks += 1;
            stats.largest_free = stats.largest_free.max(block.size);
        }
        stats.usage_percentage = (total - stats.free_memory) as f64 / total as f64 * 100.0;
        Ok(stats)
    }

    /// Check the structural invariants of the block list
    ///
    /// - every header carries the block tag and links to its physical successor
    /// - the last block ends exactly at the region end
    /// - payload plus one header per block sums to the region size
    /// - the live-byte counter matches the in-use blocks
    pub fn verify(&self) -> MemoryResult<()> {
        let blocks = self.blocks()?;

        let mut accounted = 0;
        let mut live = 0;
        for block in &blocks {
            accounted += block.size + BLOCK_HEADER_SIZE;
            if block.in_use {
                live += block.size;
            }
        }

        let last = blocks.last().map_or(0, |b| b.offset);
        let end = blocks
            .last()
            .map_or(0, |b| b.offset + BLOCK_HEADER_SIZE + b.size);
        if end != self.capacity() || accounted != self.capacity() {
            return Err(MemoryError::CorruptionDetected(last));
        }
        if live != self.used {
            return Err(MemoryError::CorruptionDetected(0));
        }
        Ok(())
    }
}
