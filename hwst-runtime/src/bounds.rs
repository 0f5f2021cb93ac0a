//! Bounds Register File
//!
//! One [`BoundsPair`] per general-purpose register, indexed by the same
//! [`Register`]. Pairs only hold compressed words; decoding is the codec's
//! job. Unlike `x0`, pair 0 is an ordinary writable pair.

use hwst_spec::{Register, SpatialWord, TemporalWord, NUM_REGISTERS};
use serde::{Deserialize, Serialize};

/// Compressed metadata shadowing one general register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundsPair {
    pub spatial: SpatialWord,
    pub temporal: TemporalWord,
}

/// Bank of bounds pairs private to one execution context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsRegisterFile {
    pairs: [BoundsPair; NUM_REGISTERS],
}

impl BoundsRegisterFile {
    pub fn new() -> Self {
        Self {
            pairs: [BoundsPair::default(); NUM_REGISTERS],
        }
    }

    #[inline]
    pub fn pair(&self, reg: Register) -> BoundsPair {
        self.pairs[reg.index()]
    }

    #[inline]
    pub fn set_pair(&mut self, reg: Register, pair: BoundsPair) {
        self.pairs[reg.index()] = pair;
    }

    #[inline]
    pub fn spatial(&self, reg: Register) -> SpatialWord {
        self.pairs[reg.index()].spatial
    }

    #[inline]
    pub fn set_spatial(&mut self, reg: Register, word: SpatialWord) {
        self.pairs[reg.index()].spatial = word;
    }

    #[inline]
    pub fn temporal(&self, reg: Register) -> TemporalWord {
        self.pairs[reg.index()].temporal
    }

    #[inline]
    pub fn set_temporal(&mut self, reg: Register, word: TemporalWord) {
        self.pairs[reg.index()].temporal = word;
    }

    /// Copy both words of `src` into `dst` verbatim
    #[inline]
    pub fn copy(&mut self, dst: Register, src: Register) {
        self.pairs[dst.index()] = self.pairs[src.index()];
    }

    /// Clear every pair
    pub fn reset(&mut self) {
        self.pairs = [BoundsPair::default(); NUM_REGISTERS];
    }

    /// Registers whose pair holds any non-zero word
    pub fn live_registers(&self) -> Vec<Register> {
        Register::all()
            .filter(|r| self.pairs[r.index()] != BoundsPair::default())
            .collect()
    }
}

impl Default for BoundsRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
