/*!
 * Coalescing Tests
 * Forward-only merging on free and the explicit defragmentation sweep
 */

use lifespan_alloc::core::limits::BLOCK_HEADER_SIZE;
use lifespan_alloc::memory::Heap;
use pretty_assertions::assert_eq;

/// Heap laid out as A(free) B(used) C(free) D(used) rest(free)
fn a_b_c_heap() -> (Heap, [lifespan_alloc::HeapPtr; 4]) {
    let mut heap = Heap::with_capacity(16 * 1024).unwrap();
    let a = heap.alloc(64, 1).unwrap();
    let b = heap.alloc(64, 1).unwrap();
    let c = heap.alloc(64, 1).unwrap();
    let d = heap.alloc(64, 1).unwrap();
    heap.free(a).unwrap();
    heap.free(c).unwrap();
    (heap, [a, b, c, d])
}

#[test]
fn test_free_merges_forward_only() {
    let (mut heap, [a, b, _c, _d]) = a_b_c_heap();
    heap.free(b).unwrap();

    let blocks = heap.blocks().unwrap();
    // A stays separate; B absorbed C
    assert_eq!(blocks[0].payload_offset(), a.offset());
    assert_eq!(blocks[0].size, 64);
    assert!(!blocks[0].in_use);

    assert_eq!(blocks[1].payload_offset(), b.offset());
    assert_eq!(blocks[1].size, 64 + BLOCK_HEADER_SIZE + 64);
    assert!(!blocks[1].in_use);

    assert!(blocks[2].in_use);
    heap.verify().unwrap();
}

#[test]
fn test_free_merges_chain_of_successors() {
    let mut heap = Heap::with_capacity(16 * 1024).unwrap();
    let a = heap.alloc(64, 1).unwrap();
    let b = heap.alloc(64, 1).unwrap();
    let c = heap.alloc(64, 1).unwrap();
    heap.free(c).unwrap();
    heap.free(b).unwrap();
    heap.free(a).unwrap();

    let blocks = heap.blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].size, 16 * 1024 - BLOCK_HEADER_SIZE);
}

#[test]
fn test_backward_neighbour_needs_defragment() {
    let mut heap = Heap::with_capacity(16 * 1024).unwrap();
    let a = heap.alloc(64, 1).unwrap();
    let b = heap.alloc(64, 1).unwrap();
    heap.free(a).unwrap();
    heap.free(b).unwrap();

    // b merged with the tail, a did not merge with b
    assert_eq!(heap.blocks().unwrap().len(), 2);

    assert_eq!(heap.defragment().unwrap(), 1);
    let blocks = heap.blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(!blocks[0].in_use);
    heap.verify().unwrap();
}

#[test]
fn test_defragment_keeps_live_blocks() {
    let (mut heap, [_a, b, _c, d]) = a_b_c_heap();
    assert_eq!(heap.defragment().unwrap(), 0);
    assert_eq!(heap.block_size(b), Some(64));
    assert_eq!(heap.block_size(d), Some(64));
}
