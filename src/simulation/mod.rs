/*!
 * Workload Simulation
 *
 * Synthetic server traffic driven against an `Engine`:
 *
 * - **base**: every request allocates and frees its objects on the heap
 * - **arena**: every request creates a transient arena, bumps its objects
 *   out of it, then destroys it
 * - **hybrid**: sessions live in a slab arena with random login/logout
 *   churn, requests use short-lived transient arenas, and a persistent
 *   arena holds a cache filled once at startup
 *
 * Runs are deterministic for a given seed.
 */

mod report;
mod workloads;

pub use report::{render_table, WorkloadReport};
pub use workloads::{run_arena, run_base, run_hybrid};

use crate::core::types::Size;
use crate::engine::Engine;
use crate::memory::types::MemoryResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workload to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Base,
    Arena,
    Hybrid,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Arena, Scenario::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Base => "base",
            Scenario::Arena => "arena",
            Scenario::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Scenario::Base),
            "arena" => Ok(Scenario::Arena),
            "hybrid" => Ok(Scenario::Hybrid),
            other => Err(format!(
                "unknown scenario '{}' (expected base, arena or hybrid)",
                other
            )),
        }
    }
}

/// Workload parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Requests for base/arena, total operations for hybrid
    pub requests: usize,
    /// Objects allocated per request (base/arena)
    pub ops_per_request: usize,
    /// Object size (base/arena)
    pub alloc_size: Size,
    /// Per-request arena capacity (arena)
    pub request_arena_size: Size,
    /// Session cap (hybrid)
    pub max_sessions: usize,
    /// Session object size (hybrid)
    pub session_size: Size,
    /// Slab arena capacity for sessions (hybrid)
    pub session_arena_size: Size,
    /// Persistent cache arena capacity (hybrid)
    pub cache_arena_size: Size,
    /// Entries written to the persistent cache at startup (hybrid)
    pub cache_entries: usize,
    /// Size of one cache entry (hybrid)
    pub cache_entry_size: Size,
    /// Transient arena capacity per hybrid request
    pub scratch_arena_size: Size,
    /// Work done inside each hybrid request arena
    pub scratch_size: Size,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests: 10_000,
            ops_per_request: 100,
            alloc_size: 64,
            request_arena_size: 8 * 1024,
            max_sessions: 10_000,
            session_size: 128,
            session_arena_size: 10 * 1024 * 1024,
            cache_arena_size: 5 * 1024 * 1024,
            cache_entries: 1_000,
            cache_entry_size: 100,
            scratch_arena_size: 4 * 1024,
            scratch_size: 2 * 1024,
            seed: 0x5EED,
        }
    }
}

impl WorkloadConfig {
    pub fn with_requests(mut self, requests: usize) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Request count the hybrid scenario uses by default
    pub const HYBRID_OPERATIONS: usize = 1_000_000;
}

/// Run one scenario against `engine`
pub fn run_scenario(
    engine: &mut Engine,
    scenario: Scenario,
    config: &WorkloadConfig,
) -> MemoryResult<WorkloadReport> {
    match scenario {
        Scenario::Base => run_base(engine, config),
        Scenario::Arena => run_arena(engine, config),
        Scenario::Hybrid => run_hybrid(engine, config),
    }
}
