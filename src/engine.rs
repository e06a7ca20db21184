/*!
 * Engine
 *
 * Context object owning one heap and the registry of arenas carved from it.
 * Every boundary operation goes through here: pointers cross as raw
 * addresses, arenas as handles.
 */

use crate::arena::{Arena, ArenaRecord, Lifetime};
use crate::config::HeapConfig;
use crate::core::types::{Address, SiteId, Size};
use crate::memory::heap::Heap;
use crate::memory::types::{MemoryError, MemoryResult};
use ahash::RandomState;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque arena handle: the address of the arena record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArenaHandle(Address);

impl ArenaHandle {
    #[inline]
    pub fn from_raw(raw: Address) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(&self) -> Address {
        self.0
    }
}

impl std::fmt::Display for ArenaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "arena@0x{:x}", self.0)
    }
}

#[derive(Debug)]
pub struct Engine {
    heap: Heap,
    arenas: HashMap<ArenaHandle, Arena, RandomState>,
}

impl Engine {
    /// Acquire the heap region and start with no arenas
    pub fn init(config: &HeapConfig) -> MemoryResult<Self> {
        let heap = Heap::init(config)?;
        info!("Engine ready: {} byte heap", heap.capacity());
        Ok(Self::with_heap(heap))
    }

    /// Unprofiled engine over a `size`-byte heap
    pub fn with_capacity(size: Size) -> MemoryResult<Self> {
        Ok(Self::with_heap(Heap::with_capacity(size)?))
    }

    pub fn with_heap(heap: Heap) -> Self {
        Self {
            heap,
            arenas: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Heap allocation; returns the payload address
    pub fn alloc(&mut self, size: Size, site_id: SiteId) -> MemoryResult<Address> {
        let ptr = self.heap.alloc(size, site_id)?;
        Ok(self.heap.address_of(ptr))
    }

    /// Heap free; address 0 is ignored
    pub fn free(&mut self, address: Address) -> MemoryResult<()> {
        if address == 0 {
            trace!("Ignoring free of null address");
            return Ok(());
        }
        let ptr = self.heap.resolve(address)?;
        self.heap.free(ptr)
    }

    pub fn create_arena(&mut self, capacity: Size, policy: Lifetime) -> MemoryResult<ArenaHandle> {
        let arena = Arena::create(&mut self.heap, capacity, policy)?;
        let handle = ArenaHandle(self.heap.address_of(arena.record()));
        self.arenas.insert(handle, arena);
        debug!("Registered {} ({} arenas live)", handle, self.arenas.len());
        Ok(handle)
    }

    /// Like `create_arena`, taking the policy as its numeric code
    pub fn create_arena_with_code(&mut self, capacity: Size, code: u32) -> MemoryResult<ArenaHandle> {
        self.create_arena(capacity, Lifetime::try_from(code)?)
    }

    pub fn arena_alloc(
        &mut self,
        handle: ArenaHandle,
        size: Size,
        site_id: SiteId,
    ) -> MemoryResult<Address> {
        let arena = self
            .arenas
            .get_mut(&handle)
            .ok_or(MemoryError::UnknownArena(handle.0))?;
        let ptr = arena.alloc(&mut self.heap, size, site_id)?;
        Ok(self.heap.address_of(ptr))
    }

    /// Return a slab slot; `size` must be the size it was allocated with
    pub fn arena_free(&mut self, handle: ArenaHandle, address: Address, size: Size) -> MemoryResult<()> {
        let arena = self
            .arenas
            .get_mut(&handle)
            .ok_or(MemoryError::UnknownArena(handle.0))?;
        let ptr = self.heap.resolve(address)?;
        arena.free(&mut self.heap, ptr, size)
    }

    pub fn reset_arena(&mut self, handle: ArenaHandle) -> MemoryResult<()> {
        let arena = self
            .arenas
            .get_mut(&handle)
            .ok_or(MemoryError::UnknownArena(handle.0))?;
        arena.reset(&mut self.heap)
    }

    /// Free the arena's memory and drop its handle
    pub fn destroy_arena(&mut self, handle: ArenaHandle) -> MemoryResult<()> {
        let arena = self
            .arenas
            .remove(&handle)
            .ok_or(MemoryError::UnknownArena(handle.0))?;
        arena.destroy(&mut self.heap)?;
        debug!("Released {} ({} arenas live)", handle, self.arenas.len());
        Ok(())
    }

    pub fn arena(&self, handle: ArenaHandle) -> Option<&Arena> {
        self.arenas.get(&handle)
    }

    /// Decode the record block behind `handle` from heap memory
    pub fn arena_record(&self, handle: ArenaHandle) -> MemoryResult<ArenaRecord> {
        let arena = self
            .arenas
            .get(&handle)
            .ok_or(MemoryError::UnknownArena(handle.0))?;
        ArenaRecord::load(&self.heap, arena.record())
    }

    #[inline]
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[inline]
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }
}
