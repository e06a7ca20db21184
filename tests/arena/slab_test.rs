/*!
 * Slab Arena Tests
 * Intermediate policy: size classes, carving, LIFO reuse
 */

use lifespan_alloc::arena::{slab_index, Arena, Lifetime};
use lifespan_alloc::core::limits::{SLAB_CARVE_COUNT, SLAB_MAX_CLASS};
use lifespan_alloc::memory::{Heap, MemoryError};
use pretty_assertions::assert_eq;

fn slab_arena(capacity: usize) -> (Heap, Arena) {
    let mut heap = Heap::with_capacity(4 << 20).unwrap();
    let arena = Arena::create(&mut heap, capacity, Lifetime::Intermediate).unwrap();
    (heap, arena)
}

#[test]
fn test_slab_lifo_reuse() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    let ptr1 = arena.alloc(&mut heap, 32, 1).unwrap();
    arena.free(&mut heap, ptr1, 32).unwrap();
    assert_eq!(arena.alloc(&mut heap, 32, 1).unwrap(), ptr1);
}

#[test]
fn test_odd_size_shares_class_slot() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    let ptr1 = arena.alloc(&mut heap, 40, 1).unwrap();
    arena.free(&mut heap, ptr1, 40).unwrap();

    // 40 and 64 both land in the 64-byte class
    assert_eq!(slab_index(40), slab_index(64));
    assert_eq!(arena.alloc(&mut heap, 64, 1).unwrap(), ptr1);
}

#[test]
fn test_lifo_order_over_several_frees() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    let ptrs: Vec<_> = (0..5)
        .map(|_| arena.alloc(&mut heap, 128, 1).unwrap())
        .collect();
    for &ptr in &ptrs {
        arena.free(&mut heap, ptr, 128).unwrap();
    }
    for &ptr in ptrs.iter().rev() {
        assert_eq!(arena.alloc(&mut heap, 128, 1).unwrap(), ptr);
    }
}

#[test]
fn test_one_carve_serves_a_full_batch() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    for _ in 0..SLAB_CARVE_COUNT {
        arena.alloc(&mut heap, 256, 1).unwrap();
    }
    assert_eq!(arena.size(), SLAB_CARVE_COUNT * 256);

    arena.alloc(&mut heap, 256, 1).unwrap();
    assert_eq!(arena.size(), 2 * SLAB_CARVE_COUNT * 256);
}

#[test]
fn test_slots_stay_inside_arena() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    for size in [1, 33, 65, 200, 300, 700, 1500, 3000] {
        let ptr = arena.alloc(&mut heap, size, 1).unwrap();
        assert!(arena.contains(ptr), "slot for {} bytes escaped the arena", size);
    }
}

#[test]
fn test_class_too_large() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    assert!(matches!(
        arena.alloc(&mut heap, SLAB_MAX_CLASS + 1, 1),
        Err(MemoryError::ClassTooLarge { .. })
    ));
    assert!(arena.alloc(&mut heap, SLAB_MAX_CLASS, 1).is_ok());
}

#[test]
fn test_oversized_request_in_small_arena_reports_class() {
    let (mut heap, mut arena) = slab_arena(SLAB_MAX_CLASS);
    assert_eq!(
        arena.alloc(&mut heap, 5000, 1),
        Err(MemoryError::ClassTooLarge {
            size: 5000,
            max: SLAB_MAX_CLASS,
        })
    );
    assert_eq!(arena.size(), 0);
}

#[test]
fn test_reset_recarves_from_base() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    let first = arena.alloc(&mut heap, 512, 1).unwrap();
    arena.alloc(&mut heap, 32, 1).unwrap();
    arena.reset(&mut heap).unwrap();

    assert_eq!(arena.size(), 0);
    assert_eq!(arena.alloc(&mut heap, 32, 1).unwrap(), first);
}

#[test]
fn test_slot_payload_survives_neighbour_free() {
    let (mut heap, mut arena) = slab_arena(1 << 20);
    let a = arena.alloc(&mut heap, 64, 1).unwrap();
    let b = arena.alloc(&mut heap, 64, 1).unwrap();
    heap.payload_mut(b, 64).unwrap().fill(0xCD);

    arena.free(&mut heap, a, 64).unwrap();
    assert!(heap.payload(b, 64).unwrap().iter().all(|&x| x == 0xCD));
}
