/*!
 * Lifetime Policies
 */

use crate::memory::types::MemoryError;
use serde::{Deserialize, Serialize};

/// Lifetime policy of an arena
///
/// The numeric values are the policy codes used at the external boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Lifetime {
    /// Bump allocation, bulk-freed by `reset`
    Transient = 0,
    /// Slab allocation with per-class free lists
    Intermediate = 1,
    /// Bump allocation that lives until `destroy`
    Persistent = 2,
}

impl Lifetime {
    /// Whether this policy carries a slab cache
    #[inline]
    pub fn uses_slabs(self) -> bool {
        matches!(self, Lifetime::Intermediate)
    }

    /// Whether `reset` is permitted
    #[inline]
    pub fn is_resettable(self) -> bool {
        !matches!(self, Lifetime::Persistent)
    }
}

impl TryFrom<u32> for Lifetime {
    type Error = MemoryError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Lifetime::Transient),
            1 => Ok(Lifetime::Intermediate),
            2 => Ok(Lifetime::Persistent),
            other => Err(MemoryError::InvalidPolicy(other)),
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Lifetime::Transient => write!(f, "transient"),
            Lifetime::Intermediate => write!(f, "intermediate"),
            Lifetime::Persistent => write!(f, "persistent"),
        }
    }
}
