/*!
 * Engine Tests
 * Boundary operations on raw addresses and arena handles
 */

use lifespan_alloc::arena::Lifetime;
use lifespan_alloc::engine::{ArenaHandle, Engine};
use lifespan_alloc::memory::MemoryError;
use pretty_assertions::assert_eq;

#[test]
fn test_engines_are_independent() {
    let mut first = Engine::with_capacity(64 * 1024).unwrap();
    let mut second = Engine::with_capacity(64 * 1024).unwrap();

    let a = first.alloc(128, 1).unwrap();
    assert!(second.heap().resolve(a).is_err());
    assert_eq!(second.free(a), Err(MemoryError::InvalidAddress(a as usize)));
    assert_eq!(first.heap().used(), 128);
    assert_eq!(second.heap().used(), 0);
}

#[test]
fn test_heap_out_of_memory() {
    let mut engine = Engine::with_capacity(4096).unwrap();
    assert!(matches!(
        engine.alloc(1 << 20, 1),
        Err(MemoryError::OutOfMemory { .. })
    ));
}

#[test]
fn test_create_arena_out_of_memory() {
    let mut engine = Engine::with_capacity(4096).unwrap();
    assert!(matches!(
        engine.create_arena(1 << 20, Lifetime::Transient),
        Err(MemoryError::OutOfMemory { .. })
    ));
    assert_eq!(engine.arena_count(), 0);
    assert_eq!(engine.heap().used(), 0);
}

#[test]
fn test_slab_round_trip_through_addresses() {
    let mut engine = Engine::with_capacity(1 << 20).unwrap();
    let arena = engine.create_arena(64 * 1024, Lifetime::Intermediate).unwrap();

    let ptr1 = engine.arena_alloc(arena, 32, 5).unwrap();
    engine.arena_free(arena, ptr1, 32).unwrap();
    assert_eq!(engine.arena_alloc(arena, 32, 5).unwrap(), ptr1);
}

#[test]
fn test_arena_errors_surface() {
    let mut engine = Engine::with_capacity(1 << 20).unwrap();
    let bump = engine.create_arena(64, Lifetime::Transient).unwrap();
    let slab = engine.create_arena(64 * 1024, Lifetime::Intermediate).unwrap();

    assert!(matches!(
        engine.arena_alloc(bump, 128, 1),
        Err(MemoryError::ArenaOverflow { .. })
    ));
    assert!(matches!(
        engine.arena_alloc(slab, 8192, 1),
        Err(MemoryError::ClassTooLarge { .. })
    ));
}

#[test]
fn test_handles_are_record_addresses() {
    let mut engine = Engine::with_capacity(1 << 20).unwrap();
    let handle = engine.create_arena(1024, Lifetime::Persistent).unwrap();
    let record = engine.arena(handle).unwrap().record();
    assert_eq!(handle, ArenaHandle::from_raw(engine.heap().address_of(record)));
}

#[test]
fn test_destroy_all_restores_heap() {
    let mut engine = Engine::with_capacity(1 << 20).unwrap();
    let handles: Vec<_> = [Lifetime::Transient, Lifetime::Intermediate, Lifetime::Persistent]
        .into_iter()
        .map(|policy| engine.create_arena(16 * 1024, policy).unwrap())
        .collect();
    for &handle in &handles {
        engine.arena_alloc(handle, 100, 1).unwrap();
    }

    // Destroy in reverse so each free merges forward
    for handle in handles.into_iter().rev() {
        engine.destroy_arena(handle).unwrap();
    }
    let stats = engine.heap().stats().unwrap();
    assert_eq!(stats.used_memory, 0);
    assert_eq!(stats.block_count, 1);
}
