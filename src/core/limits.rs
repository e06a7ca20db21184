/*!
 * Engine Limits and Constants
 *
 * Centralized location for sizes, thresholds, and layout constants.
 * Organized by subsystem.
 */

use super::types::Size;

// =============================================================================
// HEAP LAYOUT
// =============================================================================

/// Default heap region size (64MB)
pub const DEFAULT_HEAP_SIZE: Size = 64 * 1024 * 1024;

/// Smallest region the heap will accept: one header plus one minimal payload
pub const MIN_HEAP_SIZE: Size = BLOCK_HEADER_SIZE + MIN_ALIGN;

/// In-band block header: size word, tag word, next word
pub const BLOCK_HEADER_SIZE: Size = 24;

/// Leftover space a split must exceed beyond one header
/// [PERF] Prevents carving fragments too small to ever satisfy a request
pub const SPLIT_SLACK: Size = 32;

/// Alignment applied to every request
pub const MIN_ALIGN: Size = 8;

/// Memory pressure thresholds (fraction of region in use)
pub const PRESSURE_MEDIUM: f64 = 0.60;
pub const PRESSURE_HIGH: f64 = 0.80;
pub const PRESSURE_CRITICAL: f64 = 0.95;

// =============================================================================
// ARENA LAYOUT
// =============================================================================

/// Heap bytes reserved for each arena record
/// Five words of bump state plus one free-list head per slab class
/// (layout in `arena::ArenaRecord`)
pub const ARENA_RECORD_SIZE: Size = (5 + SLAB_CLASS_COUNT) * 8;

/// Number of slab size classes
pub const SLAB_CLASS_COUNT: usize = 8;

/// Smallest slab class (must hold one free-list link)
pub const SLAB_MIN_CLASS: Size = 32;

/// Largest slab class
pub const SLAB_MAX_CLASS: Size = SLAB_MIN_CLASS << (SLAB_CLASS_COUNT - 1);

/// Slots carved per refill of an empty class
pub const SLAB_CARVE_COUNT: usize = 64;

// =============================================================================
// PROFILING
// =============================================================================

/// Default telemetry log, relative to the working directory
pub const DEFAULT_TELEMETRY_PATH: &str = "training_data.csv";

/// Header row of the telemetry log
pub const TELEMETRY_HEADER: &str = "site_id,size,lifespan_ns";
