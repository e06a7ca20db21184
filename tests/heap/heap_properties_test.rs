/*!
 * Heap Property Tests
 * Conservation and non-overlap over random alloc/free sequences
 */

use lifespan_alloc::core::limits::BLOCK_HEADER_SIZE;
use lifespan_alloc::memory::{Heap, HeapPtr, MemoryError};
use proptest::prelude::*;

const CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    Free(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..4096).prop_map(Op::Alloc),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn assert_conserved(heap: &Heap) -> Result<(), TestCaseError> {
    let total: usize = heap
        .blocks()
        .map_err(|e| TestCaseError::fail(e.to_string()))?
        .iter()
        .map(|b| b.size + BLOCK_HEADER_SIZE)
        .sum();
    prop_assert_eq!(total, heap.capacity());
    Ok(())
}

proptest! {
    #[test]
    fn block_sizes_conserve_capacity(ops in prop::collection::vec(arb_op(), 1..200)) {
        let mut heap = Heap::with_capacity(CAPACITY).unwrap();
        let mut live: Vec<HeapPtr> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc(size) => match heap.alloc(size, 1) {
                    Ok(ptr) => live.push(ptr),
                    Err(MemoryError::OutOfMemory { .. }) => {}
                    Err(e) => return Err(TestCaseError::fail(e.to_string())),
                },
                Op::Free(pick) if !live.is_empty() => {
                    let ptr = live.swap_remove(pick % live.len());
                    heap.free(ptr).unwrap();
                }
                Op::Free(_) => {}
            }
            assert_conserved(&heap)?;
        }
        prop_assert!(heap.verify().is_ok());
    }

    #[test]
    fn live_payloads_never_overlap(sizes in prop::collection::vec(1usize..2048, 1..64)) {
        let mut heap = Heap::with_capacity(CAPACITY).unwrap();
        let mut ranges = Vec::new();

        for size in sizes {
            if let Ok(ptr) = heap.alloc(size, 1) {
                let len = heap.block_size(ptr).unwrap();
                prop_assert!(len >= size);
                ranges.push((ptr.offset(), ptr.offset() + len));
            }
        }

        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].0, "overlap: {:?}", pair);
        }
    }

    #[test]
    fn freeing_everything_restores_capacity(sizes in prop::collection::vec(1usize..1024, 1..50)) {
        let mut heap = Heap::with_capacity(CAPACITY).unwrap();
        let ptrs: Vec<_> = sizes.iter().filter_map(|&s| heap.alloc(s, 1).ok()).collect();

        // Reverse order lets every free merge forward into its successor
        for ptr in ptrs.into_iter().rev() {
            heap.free(ptr).unwrap();
        }
        let blocks = heap.blocks().unwrap();
        prop_assert_eq!(blocks.len(), 1);
        prop_assert_eq!(heap.used(), 0);
    }
}
