/*!
 * Allocation Profiling
 *
 * Per-allocation lifetime telemetry for the heap:
 * - Shadow map keyed by payload pointer, filled on alloc
 * - One CSV row (`site_id,size,lifespan_ns`) appended on the matching free
 */

mod profiler;
mod telemetry;

pub use profiler::{AllocationRecord, Profiler};
pub use telemetry::{LifespanSample, TelemetryLog};
