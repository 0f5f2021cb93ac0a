//! # HWST Runtime
//!
//! Executes programs that use the HWST bounds extension.
//!
//! Each execution context owns 32 general registers, a Bounds Register File
//! with one compressed spatial/temporal pair per register, and the `ubounds`
//! CSR that locates shadow memory. Guest memory is sparse and spans the full
//! 64-bit address space, so shadow slots and ordinary data coexist in it.
//!
//! ## Features
//!
//! - **Bounds construction**: `bndrs`/`bndrt` compress metadata into a pair
//! - **Decompression**: `mbas`/`mbnd`/`mkey` and copying with `mvsr`
//! - **Shadow memory**: spill with `sbdl`/`sbdu`, fill with
//!   `lbdl`/`lbdu`/`lbdls`/`lbdus`/`lkey`
//! - **Temporal check**: `tchk` compares a key with a live lock cell
//!
//! ## Example
//!
//! ```rust,no_run
//! use hwst_runtime::{VM, VMConfig};
//! use hwst_spec::{Instruction, Program};
//!
//! let program = Program::new(vec![Instruction::Halt]);
//! let mut vm = VM::new(program, VMConfig::default()).unwrap();
//! let result = vm.run().unwrap();
//! println!("Cycles: {}", result.cycles);
//! ```

pub mod error;
pub mod memory;
pub mod bounds;
pub mod shadow;
pub mod check;
pub mod state;
pub mod ops;
pub mod execute;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use memory::{AccessKind, GuestMemory, Memory, MemoryAccess};
pub use bounds::{BoundsPair, BoundsRegisterFile};
pub use shadow::{effective_address, ShadowMap, SlotKind};
pub use check::{verify_key, CheckOutcome, KeyCheck, TemporalViolation};
pub use state::{ExecContext, HaltReason};
pub use execute::{execute, ExtensionConfig};
pub use vm::{ExecutionResult, ExecutionStats, FaultPolicy, VMConfig, VM};

/// Simple execution helper
///
/// Runs a program with the default configuration.
pub fn run(program: hwst_spec::Program) -> Result<ExecutionResult> {
    let mut vm = VM::new(program, VMConfig::default())?;
    vm.run()
}
