/*!
 * Memory Module
 * Heap region, block list allocator, and shared memory types
 */

pub mod heap;
pub mod region;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use heap::Heap;
pub use region::HeapRegion;
pub use traits::*;
pub use types::*;
