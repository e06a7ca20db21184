/*!
 * Profiler Tests
 * Lifespan telemetry written through the heap's alloc/free paths
 */

use lifespan_alloc::config::HeapConfig;
use lifespan_alloc::core::limits::TELEMETRY_HEADER;
use lifespan_alloc::memory::Heap;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn profiled_heap(path: &std::path::Path) -> Heap {
    let config = HeapConfig::default()
        .with_heap_size(256 * 1024)
        .with_profiling(true)
        .with_telemetry_path(path);
    Heap::init(&config).unwrap()
}

fn data_rows(path: &std::path::Path) -> Vec<(u32, usize, u64)> {
    let contents = fs::read_to_string(path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some(TELEMETRY_HEADER));
    lines
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 3, "malformed row {:?}", line);
            (
                fields[0].parse().unwrap(),
                fields[1].parse().unwrap(),
                fields[2].parse().unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_one_row_per_freed_allocation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("training_data.csv");
    let mut heap = profiled_heap(&path);

    let a = heap.alloc(10, 7).unwrap();
    let b = heap.alloc(300, 8).unwrap();
    let _leaked = heap.alloc(64, 9).unwrap();
    heap.free(b).unwrap();
    heap.free(a).unwrap();
    heap.flush_telemetry().unwrap();

    let rows = data_rows(&path);
    assert_eq!(rows.len(), 2);
    // Requested size, not the rounded block size
    assert_eq!((rows[0].0, rows[0].1), (8, 300));
    assert_eq!((rows[1].0, rows[1].1), (7, 10));
}

#[test]
fn test_shadow_map_tracks_live_allocations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lifespans.csv");
    let mut heap = profiled_heap(&path);

    let a = heap.alloc(48, 3).unwrap();
    let profiler = heap.profiler().unwrap();
    assert_eq!(profiler.live_records(), 1);
    let record = profiler.record(a).unwrap();
    assert_eq!(record.site_id, 3);
    assert_eq!(record.size, 48);

    heap.free(a).unwrap();
    let profiler = heap.profiler().unwrap();
    assert_eq!(profiler.live_records(), 0);
    assert_eq!(profiler.completed(), 1);
    assert_eq!(profiler.log_path(), path.as_path());
}

#[test]
fn test_double_free_logs_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lifespans.csv");
    let mut heap = profiled_heap(&path);

    let a = heap.alloc(16, 1).unwrap();
    let _guard = heap.alloc(16, 1).unwrap();
    heap.free(a).unwrap();
    heap.free(a).unwrap();
    heap.flush_telemetry().unwrap();

    assert_eq!(data_rows(&path).len(), 1);
}

#[test]
fn test_unprofiled_heap_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unused.csv");
    let config = HeapConfig::default()
        .with_heap_size(64 * 1024)
        .with_profiling(false)
        .with_telemetry_path(&path);
    let mut heap = Heap::init(&config).unwrap();

    let a = heap.alloc(16, 1).unwrap();
    heap.free(a).unwrap();
    heap.flush_telemetry().unwrap();
    assert!(heap.profiler().is_none());
    assert!(!path.exists());
}

#[test]
fn test_unwritable_log_fails_init() {
    let dir = tempdir().unwrap();
    let config = HeapConfig::default()
        .with_heap_size(64 * 1024)
        .with_profiling(true)
        .with_telemetry_path(dir.path().join("missing").join("log.csv"));
    assert!(Heap::init(&config).is_err());
}
