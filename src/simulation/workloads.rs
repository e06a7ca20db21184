/*!
 * Scenario Drivers
 */

use super::report::WorkloadReport;
use super::{Scenario, WorkloadConfig};
use crate::arena::Lifetime;
use crate::core::types::{Address, SiteId};
use crate::engine::Engine;
use crate::memory::types::{MemoryError, MemoryResult};
use crate::monitoring::ScenarioSpan;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SITE_BASE_OBJECT: SiteId = 1;
pub const SITE_REQUEST_OBJECT: SiteId = 2;
pub const SITE_SESSION: SiteId = 10;
pub const SITE_SCRATCH: SiteId = 11;
pub const SITE_CACHE: SiteId = 12;

/// Probability of a login per hybrid operation
const LOGIN_RATIO: f64 = 0.3;
/// Cumulative probability of login or logout
const LOGOUT_RATIO: f64 = 0.6;

/// Allocate and free every request's objects on the heap
pub fn run_base(engine: &mut Engine, config: &WorkloadConfig) -> MemoryResult<WorkloadReport> {
    let span = ScenarioSpan::new(Scenario::Base.as_str(), config.requests, config.seed);
    let _entered = span.enter();

    let mut addresses: Vec<Address> = Vec::with_capacity(config.ops_per_request);
    let mut allocations = 0u64;
    let mut peak_used = 0;

    for _ in 0..config.requests {
        for _ in 0..config.ops_per_request {
            addresses.push(engine.alloc(config.alloc_size, SITE_BASE_OBJECT)?);
        }
        allocations += addresses.len() as u64;
        peak_used = peak_used.max(engine.heap().used());
        for address in addresses.drain(..) {
            engine.free(address)?;
        }
    }

    Ok(WorkloadReport::new(
        Scenario::Base,
        config.requests,
        allocations,
        span.elapsed(),
        peak_used,
        0,
    ))
}

/// Create, bump, and destroy one transient arena per request
pub fn run_arena(engine: &mut Engine, config: &WorkloadConfig) -> MemoryResult<WorkloadReport> {
    let span = ScenarioSpan::new(Scenario::Arena.as_str(), config.requests, config.seed);
    let _entered = span.enter();

    let mut allocations = 0u64;
    let mut peak_used = 0;

    for _ in 0..config.requests {
        let arena = engine.create_arena(config.request_arena_size, Lifetime::Transient)?;
        allocations += 2;
        for _ in 0..config.ops_per_request {
            engine.arena_alloc(arena, config.alloc_size, SITE_REQUEST_OBJECT)?;
            allocations += 1;
        }
        peak_used = peak_used.max(engine.heap().used());
        engine.destroy_arena(arena)?;
    }

    Ok(WorkloadReport::new(
        Scenario::Arena,
        config.requests,
        allocations,
        span.elapsed(),
        peak_used,
        0,
    ))
}

/// Session churn on a slab arena, scratch arenas per request, and a
/// persistent cache
pub fn run_hybrid(engine: &mut Engine, config: &WorkloadConfig) -> MemoryResult<WorkloadReport> {
    let span = ScenarioSpan::new(Scenario::Hybrid.as_str(), config.requests, config.seed);
    let _entered = span.enter();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let session_arena = engine.create_arena(config.session_arena_size, Lifetime::Intermediate)?;
    let cache_arena = engine.create_arena(config.cache_arena_size, Lifetime::Persistent)?;
    let mut allocations = 4u64;

    for _ in 0..config.cache_entries {
        engine.arena_alloc(cache_arena, config.cache_entry_size, SITE_CACHE)?;
        allocations += 1;
    }
    debug!("Persistent cache filled with {} entries", config.cache_entries);

    let mut sessions: Vec<Address> = Vec::with_capacity(config.max_sessions);
    let mut peak_used = engine.heap().used();
    let mut peak_sessions = 0;

    for _ in 0..config.requests {
        let roll: f64 = rng.gen();

        if roll < LOGIN_RATIO {
            if sessions.len() < config.max_sessions {
                match engine.arena_alloc(session_arena, config.session_size, SITE_SESSION) {
                    Ok(address) => {
                        sessions.push(address);
                        allocations += 1;
                    }
                    Err(e @ MemoryError::ArenaOverflow { .. }) => {
                        warn!("Session store full: {}", e);
                    }
                    Err(e) => return Err(e),
                }
            }
        } else if roll < LOGOUT_RATIO {
            if !sessions.is_empty() {
                let victim = rng.gen_range(0..sessions.len());
                let address = sessions.swap_remove(victim);
                engine.arena_free(session_arena, address, config.session_size)?;
            }
        } else {
            let scratch = engine.create_arena(config.scratch_arena_size, Lifetime::Transient)?;
            engine.arena_alloc(scratch, config.scratch_size, SITE_SCRATCH)?;
            allocations += 3;
            peak_used = peak_used.max(engine.heap().used());
            engine.destroy_arena(scratch)?;
        }

        peak_sessions = peak_sessions.max(sessions.len());
    }

    engine.destroy_arena(session_arena)?;
    engine.destroy_arena(cache_arena)?;

    Ok(WorkloadReport::new(
        Scenario::Hybrid,
        config.requests,
        allocations,
        span.elapsed(),
        peak_used,
        peak_sessions,
    ))
}
