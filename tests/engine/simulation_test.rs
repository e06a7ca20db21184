/*!
 * Simulation Tests
 * Scenarios run end to end on one engine
 */

use lifespan_alloc::engine::Engine;
use lifespan_alloc::simulation::{run_scenario, Scenario, WorkloadConfig};

fn config() -> WorkloadConfig {
    WorkloadConfig {
        requests: 100,
        ops_per_request: 20,
        session_arena_size: 512 * 1024,
        cache_arena_size: 128 * 1024,
        ..WorkloadConfig::default()
    }
}

#[test]
fn test_all_scenarios_share_one_engine() {
    let mut engine = Engine::with_capacity(4 << 20).unwrap();
    for scenario in Scenario::ALL {
        let report = run_scenario(&mut engine, scenario, &config()).unwrap();
        assert_eq!(report.scenario, scenario);
        assert_eq!(report.requests, 100);
        assert!(report.allocations > 0);
    }
    assert_eq!(engine.arena_count(), 0);
    assert_eq!(engine.heap().used(), 0);
    engine.heap().verify().unwrap();
}

#[test]
fn test_report_json_shape() {
    let mut engine = Engine::with_capacity(4 << 20).unwrap();
    let report = run_scenario(&mut engine, Scenario::Base, &config()).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["scenario"], "base");
    assert_eq!(value["allocations"], 2000);
    assert!(value["requests_per_sec"].is_number());
}

#[test]
fn test_same_seed_repeats_hybrid_traffic() {
    let run = |seed| {
        let mut engine = Engine::with_capacity(4 << 20).unwrap();
        run_scenario(&mut engine, Scenario::Hybrid, &config().with_seed(seed)).unwrap()
    };
    let a = run(1);
    let b = run(1);
    assert_eq!(a.allocations, b.allocations);
    assert_eq!(a.peak_sessions, b.peak_sessions);
}
