//! # HWST Specification
//!
//! Compressed spatial (base/range) and temporal (key/lock) pointer metadata
//! for a RISC-V bounds extension.
//!
//! ## Key Features
//! - Configurable field widths for the two 64-bit metadata words
//! - Saturating range compression (never narrower than the real bound)
//! - 32 general-purpose registers, each shadowed by a bounds register pair
//! - `ubounds` CSR locating shadow memory
//! - Instruction set for minting, decoding, moving, spilling, filling and
//!   checking metadata

pub mod config;
pub mod codec;
pub mod register;
pub mod csr;
pub mod instruction;
pub mod error;
pub mod program;

pub use config::{ConfigError, FieldWidths, RangeOverflowPolicy};
pub use codec::{
    compress_spatial, compress_temporal, decompress_base, decompress_bound, decompress_key,
    decompress_lock, decompress_range, spatial_range_fits, SpatialWord, TemporalWord,
};
pub use register::{Register, NUM_REGISTERS};
pub use csr::{Csr, CSR_UBOUNDS, UBOUNDS_MODE_FLAG};
pub use instruction::Instruction;
pub use error::HwstError;
pub use program::{Program, ProgramHeader, MAGIC, VERSION};

/// Key meaning "no temporal identity"
pub const KEY_INVALID: u64 = 0;

/// Key shared by every global object
pub const KEY_GLOBAL: u64 = 1;

/// First key handed out to dynamic allocations
pub const KEY_FIRST_DYNAMIC: u64 = 2;

/// Byte distance between the spatial and temporal shadow slots
pub const TEMPORAL_SLOT_OFFSET: u64 = 8;

/// Shadow memory spends this many bytes per byte of guarded memory
pub const SHADOW_SCALE: u64 = 2;
