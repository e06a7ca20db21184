/*!
 * Heap Region
 * One fixed-size anonymous mapping obtained from the OS
 */

use super::types::{MemoryError, MemoryResult};
use crate::core::types::{Address, Offset, Size};
use log::{error, info};
use std::ptr::NonNull;

/// Owned, zero-initialized memory region
///
/// All engine state addresses this region by offset. The raw base address
/// is only used to translate offsets at the external boundary.
pub struct HeapRegion {
    base: NonNull<u8>,
    len: Size,
}

impl HeapRegion {
    /// Map `len` bytes of anonymous read-write memory
    pub fn map(len: Size) -> MemoryResult<Self> {
        if len == 0 {
            return Err(MemoryError::RegionUnavailable {
                size: len,
                reason: "zero-length region".to_string(),
            });
        }

        match sys::map_anonymous(len) {
            Some(base) => {
                info!("Mapped heap region of {} bytes at {:p}", len, base);
                Ok(Self { base, len })
            }
            None => {
                let reason = std::io::Error::last_os_error().to_string();
                error!("Heap region mapping of {} bytes failed: {}", len, reason);
                Err(MemoryError::RegionUnavailable { size: len, reason })
            }
        }
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw address of the first byte
    #[inline]
    pub fn base_address(&self) -> Address {
        self.base.as_ptr() as usize as Address
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `base` points to `len` mapped bytes owned by `self`.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: `base` points to `len` mapped bytes, uniquely borrowed through `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr(), self.len) }
    }

    /// Read a little-endian word at `offset`
    #[inline]
    pub fn read_u64(&self, offset: Offset) -> Option<u64> {
        let bytes = self.as_slice().get(offset..offset.checked_add(8)?)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Some(u64::from_le_bytes(word))
    }

    /// Write a little-endian word at `offset`; false when out of bounds
    #[inline]
    pub fn write_u64(&mut self, offset: Offset, value: u64) -> bool {
        let Some(end) = offset.checked_add(8) else {
            return false;
        };
        match self.as_mut_slice().get_mut(offset..end) {
            Some(bytes) => {
                bytes.copy_from_slice(&value.to_le_bytes());
                true
            }
            None => false,
        }
    }
}

impl Drop for HeapRegion {
    fn drop(&mut self) {
        sys::unmap(self.base, self.len);
    }
}

impl std::fmt::Debug for HeapRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapRegion")
            .field("base", &format_args!("0x{:x}", self.base_address()))
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(unix)]
mod sys {
    use std::ptr::{self, NonNull};

    pub fn map_anonymous(len: usize) -> Option<NonNull<u8>> {
        // SAFETY: anonymous private mapping with no address hint; the result is checked.
        let result = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if result == libc::MAP_FAILED {
            None
        } else {
            NonNull::new(result as *mut u8)
        }
    }

    pub fn unmap(base: NonNull<u8>, len: usize) {
        // SAFETY: `base`/`len` came from `map_anonymous` and are unmapped exactly once.
        unsafe {
            libc::munmap(base.as_ptr() as *mut libc::c_void, len);
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::alloc::{alloc_zeroed, dealloc, Layout};
    use std::ptr::NonNull;

    fn layout(len: usize) -> Option<Layout> {
        Layout::from_size_align(len, 4096).ok()
    }

    pub fn map_anonymous(len: usize) -> Option<NonNull<u8>> {
        // SAFETY: layout has non-zero size (checked by the caller).
        NonNull::new(unsafe { alloc_zeroed(layout(len)?) })
    }

    pub fn unmap(base: NonNull<u8>, len: usize) {
        if let Some(layout) = layout(len) {
            // SAFETY: allocated in `map_anonymous` with the same layout.
            unsafe { dealloc(base.as_ptr(), layout) }
        }
    }
}
