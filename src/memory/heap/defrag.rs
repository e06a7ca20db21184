/*!
 * Heap Defragmentation
 * Explicit full-coalescing sweep
 */

use super::block::BlockHeader;
use super::Heap;
use crate::memory::types::MemoryResult;
use log::info;

impl Heap {
    /// Merge every run of adjacent free blocks into one block
    ///
    /// `free` only merges forward, so a freed block whose predecessor is
    /// already free stays split from it until this sweep runs. Returns the
    /// number of blocks absorbed.
    pub fn defragment(&mut self) -> MemoryResult<usize> {
        let mut merged = 0;
        let mut cursor = Some(0);

        while let Some(offset) = cursor {
            let mut header = BlockHeader::read(self.region(), offset)?;
            if !header.in_use {
                let absorbed = self.absorb_following(offset, &mut header)?;
                if absorbed > 0 {
                    header.write(self.region_mut(), offset)?;
                    merged += absorbed;
                }
            }
            cursor = header.next;
        }

        if merged > 0 {
            info!("Defragmentation merged {} free blocks", merged);
        }
        Ok(merged)
    }
}
