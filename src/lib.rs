/*!
 * Lifespan Allocator Library
 * First-fit heap, lifetime-policy arenas, and allocation profiling
 */

pub mod arena;
pub mod config;
pub mod core;
pub mod engine;
pub mod memory;
pub mod monitoring;
pub mod profiling;
pub mod simulation;

// Re-exports
pub use arena::{Arena, ArenaRecord, Lifetime, SlabCache};
pub use config::HeapConfig;
pub use engine::{ArenaHandle, Engine};
pub use memory::{
    Allocator, BlockInfo, Heap, HeapPtr, HeapStats, MemoryError, MemoryInfo, MemoryPressure,
    MemoryResult,
};
pub use monitoring::init_tracing;
pub use profiling::{LifespanSample, Profiler};
pub use simulation::{run_scenario, Scenario, WorkloadConfig, WorkloadReport};
