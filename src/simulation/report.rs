/*!
 * Workload Reports
 */

use super::Scenario;
use crate::core::types::Size;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;

/// Outcome of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub scenario: Scenario,
    pub requests: usize,
    /// Successful allocations of any kind
    pub allocations: u64,
    pub elapsed_ms: f64,
    pub requests_per_sec: f64,
    /// Highest heap payload usage observed
    pub peak_used: Size,
    /// Highest number of live sessions (hybrid only)
    pub peak_sessions: usize,
}

impl WorkloadReport {
    pub fn new(
        scenario: Scenario,
        requests: usize,
        allocations: u64,
        elapsed: Duration,
        peak_used: Size,
        peak_sessions: usize,
    ) -> Self {
        let secs = elapsed.as_secs_f64();
        let requests_per_sec = if secs > 0.0 {
            requests as f64 / secs
        } else {
            0.0
        };
        Self {
            scenario,
            requests,
            allocations,
            elapsed_ms: secs * 1000.0,
            requests_per_sec,
            peak_used,
            peak_sessions,
        }
    }
}

/// Fixed-width table of reports, one row each
pub fn render_table(reports: &[WorkloadReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "scenario", "requests", "allocations", "time (ms)", "req/sec", "peak used", "sessions"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<8} {:>10} {:>12} {:>12.2} {:>12.0} {:>12} {:>10}",
            report.scenario,
            report.requests,
            report.allocations,
            report.elapsed_ms,
            report.requests_per_sec,
            report.peak_used,
            report.peak_sessions
        );
    }
    out
}
