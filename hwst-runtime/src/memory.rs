//! Memory subsystem
//!
//! [`GuestMemory`] is the host interface the bounds extension consumes:
//! 4- and 8-byte little-endian loads and stores at arbitrary addresses.
//! [`Memory`] is the sparse implementation the VM uses. It spans the full
//! 64-bit address space, so ordinary data and shadow slots live side by side
//! and only differ in where they are placed.

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Loads and stores the bounds extension needs from its host
pub trait GuestMemory {
    fn read_u32(&mut self, address: u64) -> Result<u32>;
    fn read_u64(&mut self, address: u64) -> Result<u64>;
    fn write_u32(&mut self, address: u64, value: u32) -> Result<()>;
    fn write_u64(&mut self, address: u64, value: u64) -> Result<()>;
}

/// Direction of a logged access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Read,
    Write,
}

/// One logged memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAccess {
    pub kind: AccessKind,
    pub address: u64,
    /// Access width in bytes
    pub width: u8,
    pub value: u64,
}

/// Sparse little-endian byte memory
#[derive(Debug, Clone, Default)]
pub struct Memory {
    /// Non-zero bytes only
    bytes: HashMap<u64, u8>,

    /// Reject accesses not aligned to their width
    strict_alignment: bool,

    /// Record every access in `trace`
    trace_enabled: bool,

    trace: Vec<MemoryAccess>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_strict_alignment(&mut self, strict: bool) {
        self.strict_alignment = strict;
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    /// Accesses recorded since tracing was enabled
    pub fn trace(&self) -> &[MemoryAccess] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Number of non-zero bytes held
    pub fn resident_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Read without alignment checks or tracing
    pub fn peek_u64(&self, address: u64) -> u64 {
        self.load(address, 8)
    }

    /// Read without alignment checks or tracing
    pub fn peek_u32(&self, address: u64) -> u32 {
        self.load(address, 4) as u32
    }

    fn check_alignment(&self, address: u64, width: usize) -> Result<()> {
        if self.strict_alignment && address % width as u64 != 0 {
            return Err(RuntimeError::MisalignedAccess {
                address,
                alignment: width,
            });
        }
        Ok(())
    }

    fn load(&self, address: u64, width: usize) -> u64 {
        (0..width).fold(0u64, |acc, i| {
            let byte = self
                .bytes
                .get(&address.wrapping_add(i as u64))
                .copied()
                .unwrap_or(0);
            acc | (byte as u64) << (i * 8)
        })
    }

    fn store(&mut self, address: u64, width: usize, value: u64) {
        for i in 0..width {
            let addr = address.wrapping_add(i as u64);
            let byte = (value >> (i * 8)) as u8;
            if byte == 0 {
                self.bytes.remove(&addr);
            } else {
                self.bytes.insert(addr, byte);
            }
        }
    }

    fn record(&mut self, kind: AccessKind, address: u64, width: usize, value: u64) {
        if self.trace_enabled {
            self.trace.push(MemoryAccess {
                kind,
                address,
                width: width as u8,
                value,
            });
        }
    }

    fn read(&mut self, address: u64, width: usize) -> Result<u64> {
        self.check_alignment(address, width)?;
        let value = self.load(address, width);
        self.record(AccessKind::Read, address, width, value);
        Ok(value)
    }

    fn write(&mut self, address: u64, width: usize, value: u64) -> Result<()> {
        self.check_alignment(address, width)?;
        self.store(address, width, value);
        self.record(AccessKind::Write, address, width, value);
        Ok(())
    }
}

impl GuestMemory for Memory {
    fn read_u32(&mut self, address: u64) -> Result<u32> {
        Ok(self.read(address, 4)? as u32)
    }

    fn read_u64(&mut self, address: u64) -> Result<u64> {
        self.read(address, 8)
    }

    fn write_u32(&mut self, address: u64, value: u32) -> Result<()> {
        self.write(address, 4, value as u64)
    }

    fn write_u64(&mut self, address: u64, value: u64) -> Result<()> {
        self.write(address, 8, value)
    }
}
