//! Shadow memory addressing
//!
//! Compressed metadata for a guarded address `addr` lives at
//!
//! ```text
//! spatial:  shadow_base + 2*addr
//! temporal: shadow_base + 2*addr + 8
//! ```
//!
//! where `shadow_base` is `ubounds` with the mode flag cleared. All
//! arithmetic wraps modulo 2^64. Spills and fills of the same half must go
//! through the same function here, otherwise a fill would miss what an
//! earlier spill wrote.

use hwst_spec::{SHADOW_SCALE, TEMPORAL_SLOT_OFFSET, UBOUNDS_MODE_FLAG};

/// Which half of a bounds pair a shadow slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Spatial,
    Temporal,
}

/// Snapshot of the `ubounds` CSR used for slot computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowMap {
    raw: u64,
}

impl ShadowMap {
    pub const fn from_csr(raw: u64) -> Self {
        Self { raw }
    }

    /// CSR value including the mode flag
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.raw
    }

    /// Mode flag (bit 63); carried but not interpreted by slot arithmetic
    #[inline]
    pub const fn mode_flag(&self) -> bool {
        self.raw & UBOUNDS_MODE_FLAG != 0
    }

    /// Base of the shadow region
    #[inline]
    pub const fn base(&self) -> u64 {
        self.raw & !UBOUNDS_MODE_FLAG
    }

    /// Spatial slot for a guarded address
    #[inline]
    pub const fn spatial_slot(&self, addr: u64) -> u64 {
        self.base().wrapping_add(addr.wrapping_mul(SHADOW_SCALE))
    }

    /// Temporal slot for a guarded address
    #[inline]
    pub const fn temporal_slot(&self, addr: u64) -> u64 {
        self.spatial_slot(addr).wrapping_add(TEMPORAL_SLOT_OFFSET)
    }

    pub const fn slot(&self, kind: SlotKind, addr: u64) -> u64 {
        match kind {
            SlotKind::Spatial => self.spatial_slot(addr),
            SlotKind::Temporal => self.temporal_slot(addr),
        }
    }
}

/// Guarded address formed from a base register and a signed offset
#[inline]
pub const fn effective_address(base: u64, imm: i32) -> u64 {
    base.wrapping_add(imm as i64 as u64)
}
