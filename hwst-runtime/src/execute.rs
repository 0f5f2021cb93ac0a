//! Instruction execution for HWST

use crate::check::CheckOutcome;
use crate::error::{Result, RuntimeError};
use crate::memory::GuestMemory;
use crate::ops;
use crate::shadow::effective_address;
use crate::state::{ExecContext, HaltReason};
use crate::vm::ExecutionStats;
use hwst_spec::{FieldWidths, Instruction, RangeOverflowPolicy};
use tracing::error;

/// Settings that shape how extension instructions behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtensionConfig {
    pub widths: FieldWidths,
    pub range_overflow: RangeOverflowPolicy,
}

/// Execute a single instruction
///
/// On success the PC advances by one (except after `halt`). On error the PC
/// is left at the faulting instruction.
pub fn execute<M: GuestMemory + ?Sized>(
    instr: &Instruction,
    ctx: &mut ExecContext,
    memory: &mut M,
    ext: &ExtensionConfig,
    stats: &mut ExecutionStats,
) -> Result<()> {
    let widths = &ext.widths;

    match *instr {
        // ========== Bounds construction ==========
        Instruction::Bndrs { rd, rs1, rs2 } => {
            let base = ctx.read_reg(rs1);
            let bound = ctx.read_reg(rs2);
            let mint = ops::construct_spatial(ctx, widths, ext.range_overflow, rd, base, bound)?;
            stats.bounds_constructed += 1;
            if mint.saturated {
                stats.saturations += 1;
            }
        }

        Instruction::Bndrt { rd, rs1, rs2 } => {
            let key = ctx.read_reg(rs1);
            let lock = ctx.read_reg(rs2);
            ops::construct_temporal(ctx, widths, rd, key, lock);
            stats.bounds_constructed += 1;
        }

        // ========== Register-sourced decompression ==========
        Instruction::Mbas { rd, rs1 } => {
            ops::read_base(ctx, widths, rd, rs1);
        }

        Instruction::Mbnd { rd, rs1 } => {
            ops::read_bound(ctx, widths, rd, rs1);
        }

        Instruction::Mkey { rd, rs1 } => {
            ops::read_key(ctx, widths, rd, rs1);
        }

        Instruction::Mvsr { rd, rs1 } => {
            ops::copy_pair(ctx, rd, rs1);
        }

        // ========== Spill ==========
        Instruction::Sbdl { rs1, rs2, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::spill_spatial(ctx, memory, addr, rs2)?;
            stats.spills += 1;
        }

        Instruction::Sbdu { rs1, rs2, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::spill_temporal(ctx, memory, addr, rs2)?;
            stats.spills += 1;
        }

        // ========== Fill ==========
        Instruction::Lbdl { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::fill_base(ctx, memory, widths, rd, addr)?;
            stats.fills += 1;
        }

        Instruction::Lbdu { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::fill_bound(ctx, memory, widths, rd, addr)?;
            stats.fills += 1;
        }

        Instruction::Lbdls { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::fill_spatial_pair(ctx, memory, rd, addr)?;
            stats.fills += 1;
        }

        Instruction::Lbdus { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::fill_temporal_pair(ctx, memory, rd, addr)?;
            stats.fills += 1;
        }

        Instruction::Lkey { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            ops::fill_key(ctx, memory, widths, rd, addr)?;
            stats.fills += 1;
        }

        // ========== Temporal check ==========
        Instruction::Tchk { rs1, rs2, imm } => {
            let lock = effective_address(ctx.read_reg(rs1), imm);
            let key = ctx.read_reg(rs2);
            match ops::check_temporal(ctx, memory, lock, key)? {
                CheckOutcome::Pass => stats.checks_passed += 1,
                CheckOutcome::Trap(violation) => {
                    stats.violations += 1;
                    error!(
                        pc = violation.pc,
                        lock = format_args!("{:#x}", violation.lock),
                        key = format_args!("{:#x}", violation.key),
                        stored = format_args!("{:#x}", violation.stored),
                        "temporal safety violation"
                    );
                    return Err(RuntimeError::TemporalViolation(violation));
                }
            }
        }

        // ========== Host subset ==========
        Instruction::Li { rd, imm } => {
            ctx.write_reg(rd, imm);
        }

        Instruction::Addi { rd, rs1, imm } => {
            let result = effective_address(ctx.read_reg(rs1), imm);
            ctx.write_reg(rd, result);
        }

        Instruction::Add { rd, rs1, rs2 } => {
            let result = ctx.read_reg(rs1).wrapping_add(ctx.read_reg(rs2));
            ctx.write_reg(rd, result);
        }

        Instruction::Lw { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            let value = memory.read_u32(addr)?;
            ctx.write_reg(rd, value as u64);
        }

        Instruction::Ld { rd, rs1, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            let value = memory.read_u64(addr)?;
            ctx.write_reg(rd, value);
        }

        Instruction::Sw { rs1, rs2, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            memory.write_u32(addr, ctx.read_reg(rs2) as u32)?;
        }

        Instruction::Sd { rs1, rs2, imm } => {
            let addr = effective_address(ctx.read_reg(rs1), imm);
            memory.write_u64(addr, ctx.read_reg(rs2))?;
        }

        Instruction::Csrr { rd, csr } => {
            let value = ctx.read_csr(csr);
            ctx.write_reg(rd, value);
        }

        Instruction::Csrw { csr, rs1 } => {
            let value = ctx.read_reg(rs1);
            ctx.write_csr(csr, value);
        }

        Instruction::Halt => {
            ctx.halt(HaltReason::Halt);
            return Ok(());
        }
    }

    ctx.pc += 1;
    Ok(())
}
