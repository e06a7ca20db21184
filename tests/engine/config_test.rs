/*!
 * Configuration Tests
 * Environment overrides (serialised: they touch the process environment)
 */

use lifespan_alloc::config::{HeapConfig, ENV_HEAP_SIZE, ENV_PROFILING, ENV_TELEMETRY_PATH};
use lifespan_alloc::core::limits::DEFAULT_HEAP_SIZE;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::PathBuf;

fn clear_env() {
    std::env::remove_var(ENV_HEAP_SIZE);
    std::env::remove_var(ENV_PROFILING);
    std::env::remove_var(ENV_TELEMETRY_PATH);
}

#[test]
#[serial]
fn test_env_overrides_apply() {
    clear_env();
    std::env::set_var(ENV_HEAP_SIZE, "1048576");
    std::env::set_var(ENV_PROFILING, "true");
    std::env::set_var(ENV_TELEMETRY_PATH, "/tmp/lifespans.csv");

    let config = HeapConfig::from_env();
    clear_env();

    assert_eq!(config.heap_size, 1 << 20);
    assert!(config.profiling);
    assert_eq!(config.telemetry_path, PathBuf::from("/tmp/lifespans.csv"));
}

#[test]
#[serial]
fn test_bad_heap_size_keeps_default() {
    clear_env();
    std::env::set_var(ENV_HEAP_SIZE, "lots");
    let config = HeapConfig::from_env();
    clear_env();

    assert_eq!(config.heap_size, DEFAULT_HEAP_SIZE);
}

#[test]
#[serial]
fn test_profiling_flag_values() {
    clear_env();
    std::env::set_var(ENV_PROFILING, "0");
    assert!(!HeapConfig::from_env().profiling);
    std::env::set_var(ENV_PROFILING, "1");
    assert!(HeapConfig::from_env().profiling);
    clear_env();
}

#[test]
#[serial]
fn test_no_env_matches_default() {
    clear_env();
    assert_eq!(HeapConfig::from_env(), HeapConfig::default());
}
