/*!
 * Tracing
 * Subscriber setup for the simulation binary and timed spans for workloads
 *
 * The library logs through the `log` facade; records are bridged into the
 * `tracing` subscriber installed here.
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment variable selecting JSON output
pub const ENV_TRACE_JSON: &str = "LIFESPAN_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - LIFESPAN_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Tracing initialized");
    }
}

/// Span covering one workload run; logs its duration when dropped
pub struct ScenarioSpan {
    span: Span,
    start: Instant,
    scenario: String,
}

impl ScenarioSpan {
    /// Slower runs than this are reported at warn level
    pub const SLOW_THRESHOLD: Duration = Duration::from_secs(10);

    pub fn new(scenario: &str, requests: usize, seed: u64) -> Self {
        let span = span!(
            Level::INFO,
            "scenario",
            scenario = scenario,
            requests = requests,
            seed = seed,
            elapsed_ms = tracing::field::Empty,
        );
        {
            let _entered = span.enter();
            debug!(scenario, requests, seed, "scenario started");
        }
        Self {
            span,
            start: Instant::now(),
            scenario: scenario.to_string(),
        }
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScenarioSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("elapsed_ms", elapsed.as_millis() as u64);

        if elapsed > Self::SLOW_THRESHOLD {
            warn!(
                scenario = %self.scenario,
                elapsed_ms = elapsed.as_millis() as u64,
                slow = true,
                "slow scenario"
            );
        } else {
            debug!(
                scenario = %self.scenario,
                elapsed_ms = elapsed.as_millis() as u64,
                "scenario completed"
            );
        }
    }
}
