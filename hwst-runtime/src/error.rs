//! Runtime error types for HWST

use crate::check::TemporalViolation;
use hwst_spec::HwstError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Program error: {0}")]
    SpecError(#[from] HwstError),

    #[error("Misaligned access: address {address:#x}, alignment {alignment}")]
    MisalignedAccess { address: u64, alignment: usize },

    #[error("Temporal safety violation: {0}")]
    TemporalViolation(TemporalViolation),

    #[error("Unrepresentable bounds at PC {pc}: [{base:#x}, {bound:#x}) needs more than {range_bits} range bits")]
    RangeOverflow {
        pc: u64,
        base: u64,
        bound: u64,
        range_bits: u8,
    },

    #[error("PC {pc} is outside the program ({len} instructions)")]
    PcOutOfRange { pc: u64, len: usize },

    #[error("Cycle limit exceeded: {limit}")]
    CycleLimitExceeded { limit: u64 },
}

impl RuntimeError {
    /// Faults raised by the bounds extension itself
    pub fn is_safety_fault(&self) -> bool {
        matches!(
            self,
            RuntimeError::TemporalViolation(_) | RuntimeError::RangeOverflow { .. }
        )
    }

    /// The violation record, if this is a temporal violation
    pub fn as_violation(&self) -> Option<&TemporalViolation> {
        match self {
            RuntimeError::TemporalViolation(v) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misaligned_access_display() {
        let err = RuntimeError::MisalignedAccess {
            address: 0x1001,
            alignment: 8,
        };
        assert_eq!(err.to_string(), "Misaligned access: address 0x1001, alignment 8");
    }

    #[test]
    fn test_violation_display() {
        let err = RuntimeError::TemporalViolation(TemporalViolation {
            pc: 3,
            lock: 0x2000,
            key: 5,
            stored: 0,
        });
        let text = err.to_string();
        assert!(text.starts_with("Temporal safety violation"));
        assert!(text.contains("0x2000"));
        assert!(err.is_safety_fault());
        assert_eq!(err.as_violation().map(|v| v.key), Some(5));
    }

    #[test]
    fn test_range_overflow_display() {
        let err = RuntimeError::RangeOverflow {
            pc: 7,
            base: 0x1000,
            bound: 0x1_0000_1000,
            range_bits: 32,
        };
        assert_eq!(
            err.to_string(),
            "Unrepresentable bounds at PC 7: [0x1000, 0x100001000) needs more than 32 range bits"
        );
        assert!(err.is_safety_fault());
        assert!(err.as_violation().is_none());
    }

    #[test]
    fn test_spec_error_from() {
        let spec_err = HwstError::InvalidCsr(0x123);
        let runtime_err: RuntimeError = spec_err.into();
        assert!(runtime_err.to_string().contains("Invalid CSR number"));
        assert!(!runtime_err.is_safety_fault());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuntimeError>();
    }
}
