//! # Error Types for HWST

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwstError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Program format errors
    #[error("Invalid program magic: expected 0x48575354, got {0:#010x}")]
    InvalidMagic(u32),

    #[error("Invalid program version: expected {expected:#010x}, found {found:#010x}")]
    InvalidVersion { expected: u32, found: u32 },

    #[error("Invalid header size: expected {expected} bytes, found {found} bytes")]
    InvalidHeaderSize { expected: usize, found: usize },

    #[error("Malformed program body: {0}")]
    Serialization(#[from] bincode::Error),

    // Instruction errors
    #[error("Invalid register index: {0} (valid range: 0-31)")]
    InvalidRegister(u8),

    #[error("Invalid CSR number: {0:#05x}")]
    InvalidCsr(u16),
}

impl HwstError {
    /// Errors that come from a bad program image rather than bad usage
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            HwstError::InvalidMagic(_)
                | HwstError::InvalidVersion { .. }
                | HwstError::InvalidHeaderSize { .. }
                | HwstError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HwstError::InvalidRegister(40);
        assert_eq!(err.to_string(), "Invalid register index: 40 (valid range: 0-31)");

        let err = HwstError::InvalidCsr(0x801);
        assert_eq!(err.to_string(), "Invalid CSR number: 0x801");
    }

    #[test]
    fn test_config_error_from() {
        let err: HwstError = ConfigError::InvalidFieldWidth { field: "key", bits: 0 }.into();
        assert!(err.to_string().contains("key field width"));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_is_format_error() {
        assert!(HwstError::InvalidMagic(0).is_format_error());
        assert!(!HwstError::InvalidCsr(0).is_format_error());
    }
}
