//! # Metadata Codec
//!
//! Pure functions packing full-width `(base, bound)` and `(key, lock)` pairs
//! into single 64-bit words and back. Every instruction that touches a
//! compressed word goes through here; nothing else derives shifts or masks.
//!
//! ## Spatial word
//!
//! ```text
//!  63            64-base_bits                        range_shift      0
//! +----------------+-------------------------------------+-------------+
//! | base (low bits)|  range = bound - base (saturating)  |   unused    |
//! +----------------+-------------------------------------+-------------+
//! ```
//!
//! The base keeps only its low `base_bits` bits. A range that does not fit
//! in `range_bits` is clamped to all ones, so a decoded bound is never
//! narrower than the real one when the real one is unrepresentable.
//!
//! ## Temporal word
//!
//! Same layout with `key` and `lock`; both are masked to their widths, no
//! saturation.

use crate::config::FieldWidths;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compressed `(base, range)` word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpatialWord(pub u64);

/// Compressed `(key, lock)` word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TemporalWord(pub u64);

impl SpatialWord {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl TemporalWord {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpatialWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Display for TemporalWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Unsigned distance from base to bound (wraps when `bound < base`)
#[inline]
pub const fn spatial_range(base: u64, bound: u64) -> u64 {
    bound.wrapping_sub(base)
}

/// True when `bound - base` fits in the range field without saturating
#[inline]
pub const fn spatial_range_fits(base: u64, bound: u64, widths: &FieldWidths) -> bool {
    spatial_range(base, bound) < (1u64 << widths.range_bits)
}

/// Compress `[base, bound)` into a spatial word, saturating the range
pub const fn compress_spatial(base: u64, bound: u64, widths: &FieldWidths) -> SpatialWord {
    let range = spatial_range(base, bound);

    let base_field = (base << widths.base_shift()) & widths.base_mask();
    let range_field = if spatial_range_fits(base, bound, widths) {
        (range << widths.range_shift()) & widths.range_mask()
    } else {
        widths.range_mask()
    };

    SpatialWord(base_field | range_field)
}

/// Base field of a spatial word
#[inline]
pub const fn decompress_base(word: SpatialWord, widths: &FieldWidths) -> u64 {
    word.0 >> widths.base_shift()
}

/// Range field of a spatial word
#[inline]
pub const fn decompress_range(word: SpatialWord, widths: &FieldWidths) -> u64 {
    (word.0 & widths.range_mask()) >> widths.range_shift()
}

/// Exclusive bound encoded by a spatial word (`base + range`)
///
/// Both fields are narrower than 64 bits, so the sum cannot wrap and the
/// result is never below the decoded base.
#[inline]
pub const fn decompress_bound(word: SpatialWord, widths: &FieldWidths) -> u64 {
    decompress_base(word, widths) + decompress_range(word, widths)
}

/// Compress `(key, lock)` into a temporal word
pub const fn compress_temporal(key: u64, lock: u64, widths: &FieldWidths) -> TemporalWord {
    let key_field = (key << widths.key_shift()) & widths.key_mask();
    let lock_field = (lock << widths.lock_shift()) & widths.lock_mask();
    TemporalWord(key_field | lock_field)
}

/// Key field of a temporal word
#[inline]
pub const fn decompress_key(word: TemporalWord, widths: &FieldWidths) -> u64 {
    word.0 >> widths.key_shift()
}

/// Lock field of a temporal word
#[inline]
pub const fn decompress_lock(word: TemporalWord, widths: &FieldWidths) -> u64 {
    (word.0 & widths.lock_mask()) >> widths.lock_shift()
}
