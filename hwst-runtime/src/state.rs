//! Execution context for one simulated hart

use crate::bounds::BoundsRegisterFile;
use crate::check::TemporalViolation;
use crate::shadow::ShadowMap;
use hwst_spec::{Csr, Register, NUM_REGISTERS};

/// Registers, bounds pairs and CSRs of one hart
///
/// Memory is not part of the context; it is shared and passed to each
/// operation separately.
#[derive(Debug, Clone)]
pub struct ExecContext {
    /// Integer registers (x0-x31)
    pub regs: [u64; NUM_REGISTERS],

    /// Bounds pairs shadowing `regs`
    pub bounds: BoundsRegisterFile,

    /// `ubounds` CSR
    pub ubounds: u64,

    /// Instruction index
    pub pc: u64,

    /// Instructions retired
    pub cycles: u64,

    /// Halt reason, once halted
    pub halt_reason: Option<HaltReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// HALT instruction
    Halt,
    /// Ran past the last instruction
    EndOfProgram,
    /// Cycle limit reached
    CycleLimit,
    /// Key/lock check failed
    TemporalViolation(TemporalViolation),
    /// Bounds did not fit and the overflow policy traps
    RangeOverflow { pc: u64, base: u64, bound: u64 },
}

impl ExecContext {
    pub fn new(entry_point: u64) -> Self {
        Self {
            regs: [0; NUM_REGISTERS],
            bounds: BoundsRegisterFile::new(),
            ubounds: 0,
            pc: entry_point,
            cycles: 0,
            halt_reason: None,
        }
    }

    /// Read register (x0 always returns 0)
    #[inline]
    pub fn read_reg(&self, reg: Register) -> u64 {
        if reg.is_zero() {
            0
        } else {
            self.regs[reg.index()]
        }
    }

    /// Write register (writes to x0 are ignored)
    #[inline]
    pub fn write_reg(&mut self, reg: Register, value: u64) {
        if !reg.is_zero() {
            self.regs[reg.index()] = value;
        }
    }

    pub fn read_csr(&self, csr: Csr) -> u64 {
        match csr {
            Csr::Ubounds => self.ubounds,
        }
    }

    pub fn write_csr(&mut self, csr: Csr, value: u64) {
        match csr {
            Csr::Ubounds => self.ubounds = value,
        }
    }

    /// Shadow layout as of the current `ubounds` value
    #[inline]
    pub fn shadow_map(&self) -> ShadowMap {
        ShadowMap::from_csr(self.ubounds)
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halt_reason.is_some()
    }

    pub fn halt(&mut self, reason: HaltReason) {
        self.halt_reason = Some(reason);
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwst_spec::SpatialWord;

    #[test]
    fn test_x0_hardwired() {
        let mut ctx = ExecContext::default();
        ctx.write_reg(Register::ZERO, 42);
        assert_eq!(ctx.read_reg(Register::ZERO), 0);

        ctx.write_reg(Register::A0, 42);
        assert_eq!(ctx.read_reg(Register::A0), 42);
    }

    #[test]
    fn test_bounds_file_is_per_context() {
        let mut a = ExecContext::default();
        let b = ExecContext::default();
        a.bounds.set_spatial(Register::A0, SpatialWord(7));
        assert_eq!(b.bounds.spatial(Register::A0), SpatialWord(0));
    }

    #[test]
    fn test_csr_and_shadow_map() {
        let mut ctx = ExecContext::default();
        ctx.write_csr(Csr::Ubounds, (1 << 63) | 0x7000_0000);
        assert_eq!(ctx.read_csr(Csr::Ubounds), 0x8000_0000_7000_0000);
        assert_eq!(ctx.shadow_map().base(), 0x7000_0000);
    }

    #[test]
    fn test_halt() {
        let mut ctx = ExecContext::new(3);
        assert_eq!(ctx.pc, 3);
        assert!(!ctx.is_halted());
        ctx.halt(HaltReason::Halt);
        assert!(ctx.is_halted());
        assert_eq!(ctx.halt_reason, Some(HaltReason::Halt));
    }
}
