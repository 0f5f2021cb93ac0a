//! Bounds-extension operations
//!
//! Each function is one architectural step over an [`ExecContext`] and, for
//! the shadow forms, a [`GuestMemory`]. Packing and unpacking always go
//! through `hwst_spec::codec`; shadow slots always come from
//! [`ShadowMap`](crate::shadow::ShadowMap). Guarded addresses are passed in
//! already formed (`x[rs1] + imm`).

use crate::check::{CheckOutcome, KeyCheck};
use crate::error::{Result, RuntimeError};
use crate::memory::GuestMemory;
use crate::shadow::SlotKind;
use crate::state::ExecContext;
use hwst_spec::{
    codec, FieldWidths, RangeOverflowPolicy, Register, SpatialWord, TemporalWord,
};
use tracing::{trace, warn};

/// Outcome of minting spatial bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialMint {
    pub word: SpatialWord,
    /// The range did not fit and was clamped
    pub saturated: bool,
}

// ============================================================================
// Construction
// ============================================================================

/// Compress `[base, bound)` into the spatial half of `rd`
///
/// With [`RangeOverflowPolicy::Saturate`] this always succeeds. With
/// [`RangeOverflowPolicy::Trap`] an unrepresentable range leaves `rd`
/// untouched and returns [`RuntimeError::RangeOverflow`].
pub fn construct_spatial(
    ctx: &mut ExecContext,
    widths: &FieldWidths,
    policy: RangeOverflowPolicy,
    rd: Register,
    base: u64,
    bound: u64,
) -> Result<SpatialMint> {
    let saturated = !codec::spatial_range_fits(base, bound, widths);

    if saturated {
        match policy {
            RangeOverflowPolicy::Saturate => {
                warn!(
                    pc = ctx.pc,
                    base = format_args!("{:#x}", base),
                    bound = format_args!("{:#x}", bound),
                    range_bits = widths.range_bits,
                    "range does not fit, saturating"
                );
            }
            RangeOverflowPolicy::Trap => {
                return Err(RuntimeError::RangeOverflow {
                    pc: ctx.pc,
                    base,
                    bound,
                    range_bits: widths.range_bits,
                });
            }
        }
    }

    let word = codec::compress_spatial(base, bound, widths);
    ctx.bounds.set_spatial(rd, word);
    Ok(SpatialMint { word, saturated })
}

/// Compress `(key, lock)` into the temporal half of `rd`
pub fn construct_temporal(
    ctx: &mut ExecContext,
    widths: &FieldWidths,
    rd: Register,
    key: u64,
    lock: u64,
) -> TemporalWord {
    let word = codec::compress_temporal(key, lock, widths);
    ctx.bounds.set_temporal(rd, word);
    word
}

// ============================================================================
// Register-sourced reads
// ============================================================================

pub fn read_base(ctx: &mut ExecContext, widths: &FieldWidths, rd: Register, rs1: Register) -> u64 {
    let base = codec::decompress_base(ctx.bounds.spatial(rs1), widths);
    ctx.write_reg(rd, base);
    base
}

pub fn read_bound(ctx: &mut ExecContext, widths: &FieldWidths, rd: Register, rs1: Register) -> u64 {
    let bound = codec::decompress_bound(ctx.bounds.spatial(rs1), widths);
    ctx.write_reg(rd, bound);
    bound
}

pub fn read_key(ctx: &mut ExecContext, widths: &FieldWidths, rd: Register, rs1: Register) -> u64 {
    let key = codec::decompress_key(ctx.bounds.temporal(rs1), widths);
    ctx.write_reg(rd, key);
    key
}

/// Propagate metadata alongside a pointer copy
pub fn copy_pair(ctx: &mut ExecContext, rd: Register, rs1: Register) {
    ctx.bounds.copy(rd, rs1);
}

// ============================================================================
// Spill
// ============================================================================

fn write_slot<M: GuestMemory + ?Sized>(
    ctx: &ExecContext,
    memory: &mut M,
    kind: SlotKind,
    addr: u64,
    raw: u64,
) -> Result<u64> {
    let slot = ctx.shadow_map().slot(kind, addr);
    trace!(?kind, addr = format_args!("{:#x}", addr), slot = format_args!("{:#x}", slot), raw = format_args!("{:#x}", raw), "spill");
    memory.write_u64(slot, raw)?;
    Ok(slot)
}

/// Store the spatial half of `rs2` to the spatial slot of `addr`
pub fn spill_spatial<M: GuestMemory + ?Sized>(
    ctx: &ExecContext,
    memory: &mut M,
    addr: u64,
    rs2: Register,
) -> Result<u64> {
    write_slot(ctx, memory, SlotKind::Spatial, addr, ctx.bounds.spatial(rs2).raw())
}

/// Store the temporal half of `rs2` to the temporal slot of `addr`
pub fn spill_temporal<M: GuestMemory + ?Sized>(
    ctx: &ExecContext,
    memory: &mut M,
    addr: u64,
    rs2: Register,
) -> Result<u64> {
    write_slot(ctx, memory, SlotKind::Temporal, addr, ctx.bounds.temporal(rs2).raw())
}

// ============================================================================
// Fill
// ============================================================================

fn read_slot<M: GuestMemory + ?Sized>(ctx: &ExecContext, memory: &mut M, kind: SlotKind, addr: u64) -> Result<u64> {
    let slot = ctx.shadow_map().slot(kind, addr);
    let raw = memory.read_u64(slot)?;
    trace!(?kind, addr = format_args!("{:#x}", addr), slot = format_args!("{:#x}", slot), raw = format_args!("{:#x}", raw), "fill");
    Ok(raw)
}

fn load_spatial<M: GuestMemory + ?Sized>(ctx: &ExecContext, memory: &mut M, addr: u64) -> Result<SpatialWord> {
    read_slot(ctx, memory, SlotKind::Spatial, addr).map(SpatialWord)
}

fn load_temporal<M: GuestMemory + ?Sized>(ctx: &ExecContext, memory: &mut M, addr: u64) -> Result<TemporalWord> {
    read_slot(ctx, memory, SlotKind::Temporal, addr).map(TemporalWord)
}

/// Load the spatial slot of `addr` and write its base to `rd`
pub fn fill_base<M: GuestMemory + ?Sized>(
    ctx: &mut ExecContext,
    memory: &mut M,
    widths: &FieldWidths,
    rd: Register,
    addr: u64,
) -> Result<u64> {
    let word = load_spatial(ctx, memory, addr)?;
    let base = codec::decompress_base(word, widths);
    ctx.write_reg(rd, base);
    Ok(base)
}

/// Load the spatial slot of `addr` and write its bound to `rd`
pub fn fill_bound<M: GuestMemory + ?Sized>(
    ctx: &mut ExecContext,
    memory: &mut M,
    widths: &FieldWidths,
    rd: Register,
    addr: u64,
) -> Result<u64> {
    let word = load_spatial(ctx, memory, addr)?;
    let bound = codec::decompress_bound(word, widths);
    ctx.write_reg(rd, bound);
    Ok(bound)
}

/// Load the spatial slot of `addr` into the spatial half of `rd`, still compressed
pub fn fill_spatial_pair<M: GuestMemory + ?Sized>(
    ctx: &mut ExecContext,
    memory: &mut M,
    rd: Register,
    addr: u64,
) -> Result<SpatialWord> {
    let word = load_spatial(ctx, memory, addr)?;
    ctx.bounds.set_spatial(rd, word);
    Ok(word)
}

/// Load the temporal slot of `addr` and write its key to `rd`
pub fn fill_key<M: GuestMemory + ?Sized>(
    ctx: &mut ExecContext,
    memory: &mut M,
    widths: &FieldWidths,
    rd: Register,
    addr: u64,
) -> Result<u64> {
    let word = load_temporal(ctx, memory, addr)?;
    let key = codec::decompress_key(word, widths);
    ctx.write_reg(rd, key);
    Ok(key)
}

/// Load the temporal slot of `addr` into the temporal half of `rd`, still compressed
pub fn fill_temporal_pair<M: GuestMemory + ?Sized>(
    ctx: &mut ExecContext,
    memory: &mut M,
    rd: Register,
    addr: u64,
) -> Result<TemporalWord> {
    let word = load_temporal(ctx, memory, addr)?;
    ctx.bounds.set_temporal(rd, word);
    Ok(word)
}

// ============================================================================
// Check
// ============================================================================

/// Compare `key` against the lock cell at `lock`
pub fn check_temporal<M: GuestMemory + ?Sized>(
    ctx: &ExecContext,
    memory: &mut M,
    lock: u64,
    key: u64,
) -> Result<CheckOutcome> {
    KeyCheck::new(lock, key).evaluate(memory, ctx.pc)
}
