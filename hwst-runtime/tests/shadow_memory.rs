//! Shadow memory spill/fill through the VM
//!
//! Programs here are built directly from `Instruction` values so the tests
//! can place shadow regions and guarded addresses precisely.

use hwst_runtime::{AccessKind, GuestMemory, HaltReason, VMConfig, VM};
use hwst_spec::{Csr, FieldWidths, Instruction, Program, ProgramHeader, Register, UBOUNDS_MODE_FLAG};

const SHADOW_BASE: u64 = 0x7000_0000;

fn traced() -> VMConfig {
    VMConfig {
        trace: true,
        ..VMConfig::default()
    }
}

/// `li t0, ubounds; csrw ubounds, t0` followed by `body` and `halt`
fn with_shadow(ubounds: u64, body: Vec<Instruction>) -> Program {
    let mut code = vec![
        Instruction::Li { rd: Register::T0, imm: ubounds },
        Instruction::Csrw { csr: Csr::Ubounds, rs1: Register::T0 },
    ];
    code.extend(body);
    code.push(Instruction::Halt);
    Program::new(code)
}

#[test]
fn test_spill_lands_at_shadow_slot() {
    let program = with_shadow(
        SHADOW_BASE,
        vec![
            Instruction::Li { rd: Register::A0, imm: 0x1000 },
            Instruction::Li { rd: Register::A1, imm: 0x2000 },
            Instruction::Bndrs { rd: Register::A0, rs1: Register::A0, rs2: Register::A1 },
            Instruction::Li { rd: Register::S1, imm: 0x4000 },
            Instruction::Sbdl { rs1: Register::S1, rs2: Register::A0, imm: 0 },
        ],
    );

    let mut vm = VM::new(program, traced()).unwrap();
    let result = vm.run().unwrap();

    assert_eq!(result.halt_reason, HaltReason::Halt);
    assert_eq!(result.memory_trace.len(), 1);
    let write = result.memory_trace[0];
    assert_eq!(write.kind, AccessKind::Write);
    assert_eq!(write.address, 0x7000_8000);
    assert_eq!(write.width, 8);
    assert_eq!(write.value, 0x0000_1000_0000_1000);

    // nothing else was touched
    assert_eq!(vm.memory().peek_u64(0x7000_8008), 0);
    assert_eq!(vm.memory().resident_bytes(), 2);
}

#[test]
fn test_mode_flag_does_not_move_slots() {
    let body = vec![
        Instruction::Li { rd: Register::A0, imm: 0x4000 },
        Instruction::Bndrt { rd: Register::A0, rs1: Register::A0, rs2: Register::A0 },
        Instruction::Sbdu { rs1: Register::A0, rs2: Register::A0, imm: 0 },
    ];

    let mut plain = VM::new(with_shadow(SHADOW_BASE, body.clone()), traced()).unwrap();
    let mut flagged = VM::new(with_shadow(SHADOW_BASE | UBOUNDS_MODE_FLAG, body), traced()).unwrap();

    let a = plain.run().unwrap();
    let b = flagged.run().unwrap();
    assert_eq!(a.memory_trace, b.memory_trace);
    assert_eq!(a.memory_trace[0].address, 0x7000_8008);
}

#[test]
fn test_both_halves_round_trip() {
    let program = with_shadow(
        SHADOW_BASE,
        vec![
            Instruction::Li { rd: Register::A0, imm: 0x3000 },
            Instruction::Li { rd: Register::A1, imm: 0x3100 },
            Instruction::Bndrs { rd: Register::A0, rs1: Register::A0, rs2: Register::A1 },
            Instruction::Li { rd: Register::T1, imm: 9 },
            Instruction::Li { rd: Register::T2, imm: 0xA000 },
            Instruction::Bndrt { rd: Register::A0, rs1: Register::T1, rs2: Register::T2 },
            // spill through sp-relative offsets, fill through a different base
            Instruction::Li { rd: Register::SP, imm: 0x8010 },
            Instruction::Sbdl { rs1: Register::SP, rs2: Register::A0, imm: -16 },
            Instruction::Sbdu { rs1: Register::SP, rs2: Register::A0, imm: -16 },
            Instruction::Li { rd: Register::S1, imm: 0x7FF0 },
            Instruction::Lbdls { rd: Register::A5, rs1: Register::S1, imm: 16 },
            Instruction::Lbdus { rd: Register::A5, rs1: Register::S1, imm: 16 },
            Instruction::Lbdl { rd: Register::A2, rs1: Register::S1, imm: 16 },
            Instruction::Lbdu { rd: Register::A3, rs1: Register::S1, imm: 16 },
            Instruction::Lkey { rd: Register::A4, rs1: Register::S1, imm: 16 },
        ],
    );

    let result = hwst_runtime::run(program).unwrap();
    assert_eq!(result.bounds.pair(Register::A5), result.bounds.pair(Register::A0));
    assert_eq!(result.registers[Register::A2.index()], 0x3000);
    assert_eq!(result.registers[Register::A3.index()], 0x3100);
    assert_eq!(result.registers[Register::A4.index()], 9);
    assert_eq!(result.stats.spills, 2);
    assert_eq!(result.stats.fills, 5);
}

#[test]
fn test_fill_bound_reads_spatial_slot() {
    // Temporal slot holds garbage; lbdu must not look at it
    let program = with_shadow(
        SHADOW_BASE,
        vec![
            Instruction::Li { rd: Register::A0, imm: 0x100 },
            Instruction::Lbdu { rd: Register::A1, rs1: Register::A0, imm: 0 },
        ],
    );

    let mut vm = VM::new(program, traced()).unwrap();
    vm.memory_mut().set_trace_enabled(false);
    vm.memory_mut().write_u64(SHADOW_BASE + 0x208, u64::MAX).unwrap();
    vm.memory_mut().write_u64(SHADOW_BASE + 0x200, 0x0000_0500_0000_0040).unwrap();
    vm.memory_mut().set_trace_enabled(true);

    let result = vm.run().unwrap();
    assert_eq!(result.registers[Register::A1.index()], 0x540);
    assert_eq!(result.memory_trace.len(), 1);
    assert_eq!(result.memory_trace[0].address, SHADOW_BASE + 0x200);
}

#[test]
fn test_adjacent_pointers_do_not_overlap() {
    let mut body = Vec::new();
    for (i, reg) in [Register::A0, Register::A1, Register::A2].into_iter().enumerate() {
        let base = 0x1_0000 * (i as u64 + 1);
        body.push(Instruction::Li { rd: Register::T0, imm: base });
        body.push(Instruction::Li { rd: Register::T1, imm: base + 0x10 });
        body.push(Instruction::Bndrs { rd: reg, rs1: Register::T0, rs2: Register::T1 });
        body.push(Instruction::Bndrt { rd: reg, rs1: Register::T0, rs2: Register::T1 });
        body.push(Instruction::Li { rd: Register::S1, imm: 0x4000 + 8 * i as u64 });
        body.push(Instruction::Sbdl { rs1: Register::S1, rs2: reg, imm: 0 });
        body.push(Instruction::Sbdu { rs1: Register::S1, rs2: reg, imm: 0 });
    }
    for (i, reg) in [Register::A5, Register::A6, Register::A7].into_iter().enumerate() {
        body.push(Instruction::Li { rd: Register::S1, imm: 0x4000 + 8 * i as u64 });
        body.push(Instruction::Lbdls { rd: reg, rs1: Register::S1, imm: 0 });
        body.push(Instruction::Lbdus { rd: reg, rs1: Register::S1, imm: 0 });
    }

    let result = hwst_runtime::run(with_shadow(SHADOW_BASE, body)).unwrap();
    assert_eq!(result.bounds.pair(Register::A5), result.bounds.pair(Register::A0));
    assert_eq!(result.bounds.pair(Register::A6), result.bounds.pair(Register::A1));
    assert_eq!(result.bounds.pair(Register::A7), result.bounds.pair(Register::A2));
}

#[test]
fn test_slot_arithmetic_wraps() {
    // 2 * 0x8000_0000_0000_1000 wraps to 0x2000
    let program = with_shadow(
        0x10_0000,
        vec![
            Instruction::Li { rd: Register::A0, imm: 0x8000_0000_0000_1000 },
            Instruction::Bndrt { rd: Register::A1, rs1: Register::A0, rs2: Register::A0 },
            Instruction::Sbdu { rs1: Register::A0, rs2: Register::A1, imm: 0 },
        ],
    );

    let mut vm = VM::new(program, traced()).unwrap();
    let result = vm.run().unwrap();
    assert_eq!(result.memory_trace[0].address, 0x10_0000 + 0x2000 + 8);
}

#[test]
fn test_non_default_widths() {
    let widths = FieldWidths::new(48, 16, 16, 48).unwrap();
    let header = ProgramHeader::with_widths(widths).unwrap();
    let program = Program::with_header(
        header,
        vec![
            Instruction::Li { rd: Register::A0, imm: 0x1234_5678_0000 },
            Instruction::Li { rd: Register::A1, imm: 0x1234_5678_FFFF },
            Instruction::Bndrs { rd: Register::A0, rs1: Register::A0, rs2: Register::A1 },
            Instruction::Mbas { rd: Register::T0, rs1: Register::A0 },
            Instruction::Mbnd { rd: Register::T1, rs1: Register::A0 },
            // one byte more than 16 range bits can hold
            Instruction::Li { rd: Register::A2, imm: 0x1234_5679_0000 },
            Instruction::Bndrs { rd: Register::A3, rs1: Register::A0, rs2: Register::A2 },
            Instruction::Mbnd { rd: Register::T2, rs1: Register::A3 },
            Instruction::Halt,
        ],
    );

    let result = hwst_runtime::run(program).unwrap();
    assert_eq!(result.registers[Register::T0.index()], 0x1234_5678_0000);
    assert_eq!(result.registers[Register::T1.index()], 0x1234_5678_FFFF);
    assert_eq!(result.registers[Register::T2.index()], 0x1234_5678_FFFF);
    assert_eq!(result.stats.saturations, 1);
}
