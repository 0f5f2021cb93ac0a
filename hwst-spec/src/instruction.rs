//! HWST Instruction Set
//!
//! The bounds extension proper plus the handful of host instructions a
//! program needs to set up registers, memory and the `ubounds` CSR.
//!
//! ## Operand conventions
//! - `rd`/`rs1`/`rs2` name general registers *and* the bounds pair with the
//!   same index; which file an operand touches is fixed per instruction.
//! - Memory forms take `imm(rs1)`: the effective address is
//!   `x[rs1] + sext(imm)`, wrapping.

use crate::csr::Csr;
use crate::register::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HWST instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ========== Bounds construction ==========
    /// BNDRS: pair[rd].spatial = compress(base = x[rs1], bound = x[rs2])
    Bndrs { rd: Register, rs1: Register, rs2: Register },

    /// BNDRT: pair[rd].temporal = compress(key = x[rs1], lock = x[rs2])
    Bndrt { rd: Register, rs1: Register, rs2: Register },

    // ========== Register-sourced decompression ==========
    /// MBAS: x[rd] = base(pair[rs1].spatial)
    Mbas { rd: Register, rs1: Register },

    /// MBND: x[rd] = bound(pair[rs1].spatial)
    Mbnd { rd: Register, rs1: Register },

    /// MKEY: x[rd] = key(pair[rs1].temporal)
    Mkey { rd: Register, rs1: Register },

    /// MVSR: pair[rd] = pair[rs1]
    Mvsr { rd: Register, rs1: Register },

    // ========== Shadow memory spill ==========
    /// SBDL: shadow_spatial(x[rs1] + imm) = pair[rs2].spatial
    Sbdl { rs1: Register, rs2: Register, imm: i32 },

    /// SBDU: shadow_temporal(x[rs1] + imm) = pair[rs2].temporal
    Sbdu { rs1: Register, rs2: Register, imm: i32 },

    // ========== Shadow memory fill ==========
    /// LBDL: x[rd] = base(shadow_spatial(x[rs1] + imm))
    Lbdl { rd: Register, rs1: Register, imm: i32 },

    /// LBDU: x[rd] = bound(shadow_spatial(x[rs1] + imm))
    Lbdu { rd: Register, rs1: Register, imm: i32 },

    /// LBDLS: pair[rd].spatial = shadow_spatial(x[rs1] + imm)
    Lbdls { rd: Register, rs1: Register, imm: i32 },

    /// LBDUS: pair[rd].temporal = shadow_temporal(x[rs1] + imm)
    Lbdus { rd: Register, rs1: Register, imm: i32 },

    /// LKEY: x[rd] = key(shadow_temporal(x[rs1] + imm))
    Lkey { rd: Register, rs1: Register, imm: i32 },

    // ========== Temporal check ==========
    /// TCHK: trap unless mem32[x[rs1] + imm] == x[rs2] (low 32 bits)
    Tchk { rs1: Register, rs2: Register, imm: i32 },

    // ========== Host subset ==========
    /// LI: x[rd] = imm
    Li { rd: Register, imm: u64 },

    /// ADDI: x[rd] = x[rs1] + sext(imm)
    Addi { rd: Register, rs1: Register, imm: i32 },

    /// ADD: x[rd] = x[rs1] + x[rs2]
    Add { rd: Register, rs1: Register, rs2: Register },

    /// LW: x[rd] = zext(mem32[x[rs1] + imm])
    Lw { rd: Register, rs1: Register, imm: i32 },

    /// LD: x[rd] = mem64[x[rs1] + imm]
    Ld { rd: Register, rs1: Register, imm: i32 },

    /// SW: mem32[x[rs1] + imm] = x[rs2]
    Sw { rs1: Register, rs2: Register, imm: i32 },

    /// SD: mem64[x[rs1] + imm] = x[rs2]
    Sd { rs1: Register, rs2: Register, imm: i32 },

    /// CSRR: x[rd] = csr
    Csrr { rd: Register, csr: Csr },

    /// CSRW: csr = x[rs1]
    Csrw { csr: Csr, rs1: Register },

    /// HALT: stop execution
    Halt,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Bndrs { .. } => "bndrs",
            Instruction::Bndrt { .. } => "bndrt",
            Instruction::Mbas { .. } => "mbas",
            Instruction::Mbnd { .. } => "mbnd",
            Instruction::Mkey { .. } => "mkey",
            Instruction::Mvsr { .. } => "mvsr",
            Instruction::Sbdl { .. } => "sbdl",
            Instruction::Sbdu { .. } => "sbdu",
            Instruction::Lbdl { .. } => "lbdl",
            Instruction::Lbdu { .. } => "lbdu",
            Instruction::Lbdls { .. } => "lbdls",
            Instruction::Lbdus { .. } => "lbdus",
            Instruction::Lkey { .. } => "lkey",
            Instruction::Tchk { .. } => "tchk",
            Instruction::Li { .. } => "li",
            Instruction::Addi { .. } => "addi",
            Instruction::Add { .. } => "add",
            Instruction::Lw { .. } => "lw",
            Instruction::Ld { .. } => "ld",
            Instruction::Sw { .. } => "sw",
            Instruction::Sd { .. } => "sd",
            Instruction::Csrr { .. } => "csrr",
            Instruction::Csrw { .. } => "csrw",
            Instruction::Halt => "halt",
        }
    }

    /// True for instructions of the bounds extension
    pub fn is_bounds_extension(&self) -> bool {
        matches!(
            self,
            Instruction::Bndrs { .. }
                | Instruction::Bndrt { .. }
                | Instruction::Mbas { .. }
                | Instruction::Mbnd { .. }
                | Instruction::Mkey { .. }
                | Instruction::Mvsr { .. }
                | Instruction::Sbdl { .. }
                | Instruction::Sbdu { .. }
                | Instruction::Lbdl { .. }
                | Instruction::Lbdu { .. }
                | Instruction::Lbdls { .. }
                | Instruction::Lbdus { .. }
                | Instruction::Lkey { .. }
                | Instruction::Tchk { .. }
        )
    }

    /// True for instructions that read or write shadow memory
    pub fn touches_shadow(&self) -> bool {
        matches!(
            self,
            Instruction::Sbdl { .. }
                | Instruction::Sbdu { .. }
                | Instruction::Lbdl { .. }
                | Instruction::Lbdu { .. }
                | Instruction::Lbdls { .. }
                | Instruction::Lbdus { .. }
                | Instruction::Lkey { .. }
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Instruction::Bndrs { rd, rs1, rs2 }
            | Instruction::Bndrt { rd, rs1, rs2 }
            | Instruction::Add { rd, rs1, rs2 } => write!(f, "{} {}, {}, {}", m, rd, rs1, rs2),

            Instruction::Mbas { rd, rs1 }
            | Instruction::Mbnd { rd, rs1 }
            | Instruction::Mkey { rd, rs1 }
            | Instruction::Mvsr { rd, rs1 } => write!(f, "{} {}, {}", m, rd, rs1),

            Instruction::Sbdl { rs1, rs2, imm }
            | Instruction::Sbdu { rs1, rs2, imm }
            | Instruction::Tchk { rs1, rs2, imm }
            | Instruction::Sw { rs1, rs2, imm }
            | Instruction::Sd { rs1, rs2, imm } => write!(f, "{} {}, {}({})", m, rs2, imm, rs1),

            Instruction::Lbdl { rd, rs1, imm }
            | Instruction::Lbdu { rd, rs1, imm }
            | Instruction::Lbdls { rd, rs1, imm }
            | Instruction::Lbdus { rd, rs1, imm }
            | Instruction::Lkey { rd, rs1, imm }
            | Instruction::Lw { rd, rs1, imm }
            | Instruction::Ld { rd, rs1, imm } => write!(f, "{} {}, {}({})", m, rd, imm, rs1),

            Instruction::Li { rd, imm } => write!(f, "{} {}, {:#x}", m, rd, imm),
            Instruction::Addi { rd, rs1, imm } => write!(f, "{} {}, {}, {}", m, rd, rs1, imm),
            Instruction::Csrr { rd, csr } => write!(f, "{} {}, {}", m, rd, csr),
            Instruction::Csrw { csr, rs1 } => write!(f, "{} {}, {}", m, csr, rs1),
            Instruction::Halt => f.write_str(m),
        }
    }
}
