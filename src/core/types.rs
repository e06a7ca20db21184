/*!
 * Core Types
 * Common types used across the engine
 */

/// Byte offset into the heap region
pub type Offset = usize;

/// Raw address handed across the external boundary
pub type Address = u64;

/// Size type for memory operations
pub type Size = usize;

/// Caller-supplied allocation site tag
pub type SiteId = u32;

/// Site tag used for the engine's own bookkeeping allocations
pub const INTERNAL_SITE: SiteId = 0;

/// Round `value` up to the next multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_up(value: Size, align: Size) -> Size {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// `align_up` that returns `None` instead of wrapping near `usize::MAX`
#[inline(always)]
pub const fn checked_align_up(value: Size, align: Size) -> Option<Size> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(padded) => Some(padded & !(align - 1)),
        None => None,
    }
}
