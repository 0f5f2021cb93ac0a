//! Virtual Machine for HWST programs

use crate::bounds::BoundsRegisterFile;
use crate::error::{Result, RuntimeError};
use crate::execute::{execute, ExtensionConfig};
use crate::memory::{Memory, MemoryAccess};
use crate::state::{ExecContext, HaltReason};
use hwst_spec::{Program, RangeOverflowPolicy, NUM_REGISTERS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What the VM does when the bounds extension faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Stop and report the fault as the halt reason
    #[default]
    Halt,
    /// Return the fault from [`VM::run`]
    Propagate,
}

/// VM configuration
#[derive(Debug, Clone)]
pub struct VMConfig {
    /// Maximum number of cycles before halting
    pub max_cycles: u64,

    /// Log every instruction and record memory accesses
    pub trace: bool,

    /// Handling of spatial ranges that do not fit the range field
    pub range_overflow: RangeOverflowPolicy,

    /// Delivery of temporal violations and range-overflow traps
    pub fault_policy: FaultPolicy,

    /// Reject loads and stores not aligned to their width
    pub strict_alignment: bool,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            max_cycles: 1_000_000,
            trace: false,
            range_overflow: RangeOverflowPolicy::Saturate,
            fault_policy: FaultPolicy::Halt,
            strict_alignment: false,
        }
    }
}

/// Counters for bounds-extension activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// `bndrs` and `bndrt` executed
    pub bounds_constructed: u64,
    /// Spatial ranges clamped to the widest representable range
    pub saturations: u64,
    pub spills: u64,
    pub fills: u64,
    pub checks_passed: u64,
    pub violations: u64,
}

impl ExecutionStats {
    /// Total `tchk` executions
    pub fn checks(&self) -> u64 {
        self.checks_passed + self.violations
    }
}

/// Execution result
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Number of cycles executed
    pub cycles: u64,

    /// Reason for halting
    pub halt_reason: HaltReason,

    /// Instruction index at halt
    pub pc: u64,

    /// Final general registers
    pub registers: [u64; NUM_REGISTERS],

    /// Final bounds register file
    pub bounds: BoundsRegisterFile,

    pub stats: ExecutionStats,

    /// Memory accesses in program order (only when tracing)
    pub memory_trace: Vec<MemoryAccess>,
}

impl ExecutionResult {
    /// True when execution stopped on a temporal violation or range trap
    pub fn is_fault(&self) -> bool {
        matches!(
            self.halt_reason,
            HaltReason::TemporalViolation(_) | HaltReason::RangeOverflow { .. }
        )
    }
}

/// HWST Virtual Machine
pub struct VM {
    program: Program,
    ctx: ExecContext,
    memory: Memory,
    config: VMConfig,
    ext: ExtensionConfig,
    stats: ExecutionStats,
}

impl VM {
    /// Create a new VM for a program
    ///
    /// Rejects programs whose header carries invalid field widths or whose
    /// entry point lies past the end of the code.
    pub fn new(program: Program, config: VMConfig) -> Result<Self> {
        program.header.validate()?;

        let entry_point = program.header.entry_point as u64;
        if entry_point > program.len() as u64 {
            return Err(RuntimeError::PcOutOfRange {
                pc: entry_point,
                len: program.len(),
            });
        }

        let mut memory = Memory::new();
        memory.set_strict_alignment(config.strict_alignment);
        memory.set_trace_enabled(config.trace);

        let ext = ExtensionConfig {
            widths: program.header.widths,
            range_overflow: config.range_overflow,
        };

        Ok(Self {
            program,
            ctx: ExecContext::new(entry_point),
            memory,
            config,
            ext,
            stats: ExecutionStats::default(),
        })
    }

    /// Run until the program halts
    ///
    /// Under [`FaultPolicy::Halt`] temporal violations and range traps end the
    /// run normally with the fault as halt reason. Any other error, and every
    /// error under [`FaultPolicy::Propagate`], is returned.
    pub fn run(&mut self) -> Result<ExecutionResult> {
        while !self.ctx.is_halted() {
            if self.ctx.cycles >= self.config.max_cycles {
                if self.config.fault_policy == FaultPolicy::Propagate {
                    return Err(RuntimeError::CycleLimitExceeded {
                        limit: self.config.max_cycles,
                    });
                }
                self.ctx.halt(HaltReason::CycleLimit);
                break;
            }

            let Some(instr) = self.program.get(self.ctx.pc as usize).copied() else {
                self.ctx.halt(HaltReason::EndOfProgram);
                break;
            };

            if self.config.trace {
                debug!(cycle = self.ctx.cycles, pc = self.ctx.pc, "{}", instr);
            }

            let outcome = execute(&instr, &mut self.ctx, &mut self.memory, &self.ext, &mut self.stats);
            self.ctx.cycles += 1;

            if let Err(err) = outcome {
                match self.fault_to_halt(&err) {
                    Some(reason) if self.config.fault_policy == FaultPolicy::Halt => {
                        self.ctx.halt(reason);
                    }
                    _ => return Err(err),
                }
            }
        }

        let halt_reason = self.ctx.halt_reason.clone().unwrap_or(HaltReason::EndOfProgram);
        info!(cycles = self.ctx.cycles, ?halt_reason, "execution finished");

        Ok(ExecutionResult {
            cycles: self.ctx.cycles,
            halt_reason,
            pc: self.ctx.pc,
            registers: self.ctx.regs,
            bounds: self.ctx.bounds.clone(),
            stats: self.stats,
            memory_trace: self.memory.trace().to_vec(),
        })
    }

    fn fault_to_halt(&self, err: &RuntimeError) -> Option<HaltReason> {
        match err {
            RuntimeError::TemporalViolation(v) => Some(HaltReason::TemporalViolation(*v)),
            RuntimeError::RangeOverflow { pc, base, bound, .. } => Some(HaltReason::RangeOverflow {
                pc: *pc,
                base: *base,
                bound: *bound,
            }),
            _ => None,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Get execution context (for debugging)
    pub fn context(&self) -> &ExecContext {
        &self.ctx
    }

    /// Mutable context, for seeding registers before `run`
    pub fn context_mut(&mut self) -> &mut ExecContext {
        &mut self.ctx
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable memory, for seeding lock cells and data before `run`
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }
}
