//! # Program Structure for HWST
//!
//! A program is a header plus a list of decoded instructions. The binary
//! image is an 8-byte prefix followed by the bincode body:
//!
//! ```text
//! Offset  Size  Field
//! ──────────────────────────────────
//! 0x00    4     magic ("HWST")
//! 0x04    4     version
//! 0x08    ..    bincode(Program)
//! ```

use crate::config::FieldWidths;
use crate::error::HwstError;
use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magic number for HWST images: "HWST" = 0x48575354
pub const MAGIC: u32 = 0x48575354;

/// Version: v1.0 = 0x00010000
pub const VERSION: u32 = 0x00010000;

/// Bytes before the bincode body
pub const PREFIX_SIZE: usize = 8;

/// Program header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramHeader {
    /// Magic number: "HWST"
    pub magic: u32,

    /// Format version
    pub version: u32,

    /// Field widths every compressed word in this program uses
    pub widths: FieldWidths,

    /// Index of the first instruction to execute
    pub entry_point: u32,
}

impl ProgramHeader {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            widths: FieldWidths::DEFAULT,
            entry_point: 0,
        }
    }

    /// Create a header with custom field widths
    pub fn with_widths(widths: FieldWidths) -> Result<Self, HwstError> {
        widths.validate()?;
        Ok(Self {
            widths,
            ..Self::new()
        })
    }

    /// Validate the header
    pub fn validate(&self) -> Result<(), HwstError> {
        if self.magic != MAGIC {
            return Err(HwstError::InvalidMagic(self.magic));
        }

        if self.version != VERSION {
            return Err(HwstError::InvalidVersion {
                expected: VERSION,
                found: self.version,
            });
        }

        self.widths.validate()?;

        Ok(())
    }
}

impl Default for ProgramHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProgramHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HWST Program Header")?;
        writeln!(f, "  Magic:       {:#010x}", self.magic)?;
        writeln!(f, "  Version:     {:#010x}", self.version)?;
        writeln!(f, "  Widths:      {}", self.widths)?;
        write!(f, "  Entry point: {}", self.entry_point)
    }
}

/// A complete HWST program
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub header: ProgramHeader,
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a program with the default header
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            header: ProgramHeader::new(),
            instructions,
        }
    }

    pub fn with_header(header: ProgramHeader, instructions: Vec<Instruction>) -> Self {
        Self { header, instructions }
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Serialize program to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, HwstError> {
        let body = bincode::serialize(self)?;

        let mut bytes = Vec::with_capacity(PREFIX_SIZE + body.len());
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Deserialize program from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HwstError> {
        if bytes.len() < PREFIX_SIZE {
            return Err(HwstError::InvalidHeaderSize {
                expected: PREFIX_SIZE,
                found: bytes.len(),
            });
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Err(HwstError::InvalidMagic(magic));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != VERSION {
            return Err(HwstError::InvalidVersion {
                expected: VERSION,
                found: version,
            });
        }

        let program: Program = bincode::deserialize(&bytes[PREFIX_SIZE..])?;
        program.header.validate()?;
        Ok(program)
    }
}
