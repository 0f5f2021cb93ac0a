//! # Field-Width Configuration for HWST
//!
//! The compressed spatial and temporal words are each split into two
//! left-justified fields. The widths of those fields are fixed per program
//! and must be identical between the producer and the consumer of any
//! compressed word, so they travel in the program header.
//!
//! ```text
//! spatial:   | base (base_bits) | range (range_bits) | unused |
//!            63                                              0
//! temporal:  | key  (key_bits)  | lock  (lock_bits)  | unused |
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Field widths of the two compressed metadata words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldWidths {
    /// High field of the spatial word (low bits of the base address)
    pub base_bits: u8,
    /// Field below the base holding `bound - base`
    pub range_bits: u8,
    /// High field of the temporal word
    pub key_bits: u8,
    /// Field below the key holding the lock address
    pub lock_bits: u8,
}

impl FieldWidths {
    /// Default layout: 32-bit base / 32-bit range, 32-bit key / 32-bit lock
    pub const DEFAULT: Self = Self {
        base_bits: 32,
        range_bits: 32,
        key_bits: 32,
        lock_bits: 32,
    };

    /// Create a new field layout with validation
    pub const fn new(
        base_bits: u8,
        range_bits: u8,
        key_bits: u8,
        lock_bits: u8,
    ) -> Result<Self, ConfigError> {
        let widths = Self {
            base_bits,
            range_bits,
            key_bits,
            lock_bits,
        };

        match widths.check() {
            Ok(()) => Ok(widths),
            Err(e) => Err(e),
        }
    }

    const fn check(&self) -> Result<(), ConfigError> {
        if !field_ok(self.base_bits) {
            return Err(ConfigError::InvalidFieldWidth { field: "base", bits: self.base_bits });
        }
        if !field_ok(self.range_bits) {
            return Err(ConfigError::InvalidFieldWidth { field: "range", bits: self.range_bits });
        }
        if !field_ok(self.key_bits) {
            return Err(ConfigError::InvalidFieldWidth { field: "key", bits: self.key_bits });
        }
        if !field_ok(self.lock_bits) {
            return Err(ConfigError::InvalidFieldWidth { field: "lock", bits: self.lock_bits });
        }
        if self.base_bits as u32 + self.range_bits as u32 > 64 {
            return Err(ConfigError::SpatialOverflow {
                base_bits: self.base_bits,
                range_bits: self.range_bits,
            });
        }
        if self.key_bits as u32 + self.lock_bits as u32 > 64 {
            return Err(ConfigError::TemporalOverflow {
                key_bits: self.key_bits,
                lock_bits: self.lock_bits,
            });
        }
        Ok(())
    }

    /// Validate the layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check()
    }

    // ------------------------------------------------------------------
    // Spatial word
    // ------------------------------------------------------------------

    /// Shift that left-justifies the base field
    #[inline]
    pub const fn base_shift(&self) -> u32 {
        64 - self.base_bits as u32
    }

    /// Shift of the range field (0 when the two fields fill the word)
    #[inline]
    pub const fn range_shift(&self) -> u32 {
        64 - self.base_bits as u32 - self.range_bits as u32
    }

    /// Mask selecting the base field in place
    #[inline]
    pub const fn base_mask(&self) -> u64 {
        low_ones(self.base_bits as u32) << self.base_shift()
    }

    /// Mask selecting the range field in place
    #[inline]
    pub const fn range_mask(&self) -> u64 {
        low_ones(self.range_bits as u32) << self.range_shift()
    }

    /// Largest range the spatial word can carry (`2^range_bits - 1`)
    ///
    /// This is also the saturation value.
    #[inline]
    pub const fn max_range(&self) -> u64 {
        low_ones(self.range_bits as u32)
    }

    // ------------------------------------------------------------------
    // Temporal word
    // ------------------------------------------------------------------

    /// Shift that left-justifies the key field
    #[inline]
    pub const fn key_shift(&self) -> u32 {
        64 - self.key_bits as u32
    }

    /// Shift of the lock field
    #[inline]
    pub const fn lock_shift(&self) -> u32 {
        64 - self.key_bits as u32 - self.lock_bits as u32
    }

    /// Mask selecting the key field in place
    #[inline]
    pub const fn key_mask(&self) -> u64 {
        low_ones(self.key_bits as u32) << self.key_shift()
    }

    /// Mask selecting the lock field in place
    #[inline]
    pub const fn lock_mask(&self) -> u64 {
        low_ones(self.lock_bits as u32) << self.lock_shift()
    }
}

impl Default for FieldWidths {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FieldWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldWidths {{ spatial: base {} + range {} bits (max range {:#x}), temporal: key {} + lock {} bits }}",
            self.base_bits,
            self.range_bits,
            self.max_range(),
            self.key_bits,
            self.lock_bits,
        )
    }
}

#[inline]
const fn field_ok(bits: u8) -> bool {
    bits >= 1 && bits <= 63
}

/// `bits` low ones; `bits` is at most 63 for every validated field
#[inline]
const fn low_ones(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// What a bounds construction does when the range does not fit its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangeOverflowPolicy {
    /// Clamp the range field to all ones (widest representable range)
    #[default]
    Saturate,
    /// Refuse the construction and raise a fault
    Trap,
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Each field must be in range [1, 63]
    #[error("{field} field width must be in range [1, 63], got {bits}")]
    InvalidFieldWidth { field: &'static str, bits: u8 },

    /// Base and range do not fit in one word
    #[error("base_bits + range_bits must not exceed 64 (got {base_bits} + {range_bits})")]
    SpatialOverflow { base_bits: u8, range_bits: u8 },

    /// Key and lock do not fit in one word
    #[error("key_bits + lock_bits must not exceed 64 (got {key_bits} + {lock_bits})")]
    TemporalOverflow { key_bits: u8, lock_bits: u8 },
}
