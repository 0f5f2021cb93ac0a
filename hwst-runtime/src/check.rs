//! Key/lock verification
//!
//! A pending [`KeyCheck`] is the *unchecked* state. Evaluating it reads the
//! lock cell fresh from memory and yields either [`CheckOutcome::Pass`] or
//! [`CheckOutcome::Trap`]. The lock value is never cached: deallocation may
//! rewrite it between minting and use.
//!
//! Only the low 32 bits of the presented key take part in the comparison,
//! since the lock cell is a 4-byte word.

use crate::error::{Result, RuntimeError};
use crate::memory::GuestMemory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed key/lock comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("key {key:#x} does not match lock {lock:#x} (holds {stored:#x}) at PC {pc}")]
pub struct TemporalViolation {
    /// Instruction index of the check
    pub pc: u64,
    /// Address of the lock cell
    pub lock: u64,
    /// Key presented by the pointer
    pub key: u64,
    /// Value the lock cell held when checked
    pub stored: u32,
}

/// Result of evaluating a key check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    Trap(TemporalViolation),
}

impl CheckOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }

    /// `Pass` becomes `Ok(())`, `Trap` becomes a fatal runtime error
    pub fn into_result(self) -> Result<()> {
        match self {
            CheckOutcome::Pass => Ok(()),
            CheckOutcome::Trap(v) => Err(RuntimeError::TemporalViolation(v)),
        }
    }
}

/// An unchecked key/lock pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCheck {
    pub lock: u64,
    pub key: u64,
}

impl KeyCheck {
    pub fn new(lock: u64, key: u64) -> Self {
        Self { lock, key }
    }

    /// Compare the key against the current contents of the lock cell
    pub fn evaluate<M: GuestMemory + ?Sized>(self, memory: &mut M, pc: u64) -> Result<CheckOutcome> {
        let stored = memory.read_u32(self.lock)?;

        if stored == self.key as u32 {
            Ok(CheckOutcome::Pass)
        } else {
            Ok(CheckOutcome::Trap(TemporalViolation {
                pc,
                lock: self.lock,
                key: self.key,
                stored,
            }))
        }
    }
}

/// Check `key` against the lock cell at `lock`, failing on mismatch
pub fn verify_key<M: GuestMemory + ?Sized>(memory: &mut M, lock: u64, key: u64, pc: u64) -> Result<()> {
    KeyCheck::new(lock, key).evaluate(memory, pc)?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;

    #[test]
    fn test_matching_key_passes() {
        let mut mem = Memory::new();
        mem.write_u32(0x2000, 9).unwrap();

        let outcome = KeyCheck::new(0x2000, 9).evaluate(&mut mem, 0).unwrap();
        assert!(outcome.is_pass());
        assert!(verify_key(&mut mem, 0x2000, 9, 0).is_ok());
    }

    #[test]
    fn test_mismatch_traps() {
        let mut mem = Memory::new();
        mem.write_u32(0x2000, 9).unwrap();

        let outcome = KeyCheck::new(0x2000, 10).evaluate(&mut mem, 4).unwrap();
        assert_eq!(
            outcome,
            CheckOutcome::Trap(TemporalViolation {
                pc: 4,
                lock: 0x2000,
                key: 10,
                stored: 9,
            })
        );
    }

    #[test]
    fn test_only_low_key_bits_compared() {
        let mut mem = Memory::new();
        mem.write_u32(0x3000, 0x1234).unwrap();

        assert!(verify_key(&mut mem, 0x3000, 0xFFFF_0000_0000_1234, 0).is_ok());
    }

    #[test]
    fn test_lock_read_fresh() {
        let mut mem = Memory::new();
        mem.write_u32(0x3000, 5).unwrap();
        assert!(verify_key(&mut mem, 0x3000, 5, 0).is_ok());

        // deallocation rewrites the lock
        mem.write_u32(0x3000, 0).unwrap();
        let err = verify_key(&mut mem, 0x3000, 5, 1).unwrap_err();
        assert_eq!(err.as_violation().map(|v| v.stored), Some(0));
    }

    #[test]
    fn test_violation_display() {
        let v = TemporalViolation {
            pc: 2,
            lock: 0x40,
            key: 3,
            stored: 4,
        };
        assert_eq!(v.to_string(), "key 0x3 does not match lock 0x40 (holds 0x4) at PC 2");
    }
}
