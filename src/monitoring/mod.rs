/*!
 * Monitoring
 * Tracing subscriber setup and workload spans
 */

mod tracer;

pub use tracer::{init_tracing, ScenarioSpan, ENV_TRACE_JSON};
