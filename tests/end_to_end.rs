//! End-to-end tests: assembly source → program image → VM
//!
//! Set `RUST_LOG=hwst_runtime=debug` to see per-instruction logging.

use hwst_assembler::assemble;
use hwst_runtime::{ExecutionResult, FaultPolicy, HaltReason, VMConfig, VM};
use hwst_spec::{FieldWidths, Program, Register};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assemble, serialize, reload and run
fn run_source(source: &str, config: VMConfig) -> ExecutionResult {
    init_tracing();
    let program = assemble(source).expect("assembly failed");
    let bytes = program.to_bytes().expect("serialization failed");
    let loaded = Program::from_bytes(&bytes).expect("image failed to load");
    assert_eq!(loaded, program);

    let mut vm = VM::new(loaded, VMConfig { trace: true, ..config }).expect("VM rejected program");
    vm.run().expect("execution failed")
}

fn reg(result: &ExecutionResult, r: Register) -> u64 {
    result.registers[r.index()]
}

#[test]
fn test_worked_example() {
    let result = run_source(
        r#"
        li    a0, 0x1000
        li    a1, 0x2000
        bndrs a0, a0, a1
        mbas  t0, a0
        mbnd  t1, a0

        li    a1, 0x100001000
        bndrs a2, a0, a1
        mbnd  t2, a2
        halt
        "#,
        VMConfig::default(),
    );

    assert_eq!(result.halt_reason, HaltReason::Halt);
    assert_eq!(result.bounds.spatial(Register::A0).raw(), 0x0000_1000_0000_1000);
    assert_eq!(reg(&result, Register::T0), 0x1000);
    assert_eq!(reg(&result, Register::T1), 0x2000);
    assert_eq!(reg(&result, Register::T2), 0x1000 + 0xFFFF_FFFF);
    assert_eq!(result.stats.saturations, 1);
}

#[test]
fn test_spill_fill_example() {
    let result = run_source(
        r#"
        li    t0, 0x70000000
        csrw  ubounds, t0
        li    a0, 0xAABB
        li    a1, 0xAABB
        bndrs a0, a0, a1                # base 0xAABB, empty range
        li    s1, 0x4000
        sbdl  a0, 0(s1)
        lbdls a1, 0(s1)
        halt
        "#,
        VMConfig::default(),
    );

    assert_eq!(result.memory_trace.len(), 2);
    assert_eq!(result.memory_trace[0].address, 0x7000_8000);
    assert_eq!(result.memory_trace[0].value, 0x0000_AABB_0000_0000);
    assert_eq!(result.memory_trace[1].address, 0x7000_8000);
    assert_eq!(result.bounds.spatial(Register::A1), result.bounds.spatial(Register::A0));
}

#[test]
fn test_narrow_widths_program() {
    let result = run_source(
        r#"
        .widths 56, 8, 8, 56
        li    a0, 0x00ABCDEF00000000
        addi  a1, a0, 255
        bndrs a0, a0, a1
        mbnd  t0, a0
        addi  a1, a1, 1
        bndrs a2, a0, a1
        mbnd  t1, a2

        li    t2, 0x1FF                 # key wider than 8 bits
        bndrt a3, t2, a0
        mkey  t3, a3
        halt
        "#,
        VMConfig::default(),
    );

    assert_eq!(reg(&result, Register::T0), 0x00AB_CDEF_0000_00FF);
    // 256 needs 9 range bits: saturated to 255
    assert_eq!(reg(&result, Register::T1), 0x00AB_CDEF_0000_00FF);
    assert_eq!(reg(&result, Register::R28), 0xFF);
    assert_eq!(result.stats.saturations, 1);
}

#[test]
fn test_widths_survive_serialization() {
    let program = assemble(".widths 40, 24, 20, 44\nhalt").unwrap();
    let loaded = Program::from_bytes(&program.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.header.widths, FieldWidths::new(40, 24, 20, 44).unwrap());
}

#[test]
fn test_use_after_free_end_to_end() {
    let source = r#"
        li    t0, 0x70000000
        csrw  ubounds, t0
        li    a0, 0x2000
        li    a1, 0x2100
        bndrs a0, a0, a1
        li    t1, 2
        li    t2, 0x9000
        sw    t1, 0(t2)
        bndrt a0, t1, t2
        li    s1, 0x4000
        sbdu  a0, 0(s1)
        lkey  a5, 0(s1)
        tchk  a5, 0(t2)                 # live
        sw    zero, 0(t2)               # free
        tchk  a5, 0(t2)                 # dangling
        halt
    "#;

    let result = run_source(source, VMConfig::default());
    assert!(result.is_fault());
    assert_eq!(result.pc, 14);
    assert_eq!(result.stats.checks_passed, 1);
    assert_eq!(result.stats.violations, 1);

    let config = VMConfig {
        fault_policy: FaultPolicy::Propagate,
        ..VMConfig::default()
    };
    let mut vm = VM::new(assemble(source).unwrap(), config).unwrap();
    let err = vm.run().unwrap_err();
    assert_eq!(err.as_violation().map(|v| v.pc), Some(14));
}

#[test]
fn test_cycle_limit_end_to_end() {
    let source = "li a0, 1\n".repeat(10);
    let result = run_source(
        &source,
        VMConfig {
            max_cycles: 4,
            ..VMConfig::default()
        },
    );
    assert_eq!(result.halt_reason, HaltReason::CycleLimit);
    assert_eq!(result.cycles, 4);
}
