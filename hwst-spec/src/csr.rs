//! Control and status registers used by the bounds extension

use crate::error::HwstError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CSR number of `ubounds`
pub const CSR_UBOUNDS: u16 = 0x800;

/// Mode flag in bit 63 of `ubounds`; never part of the shadow base
pub const UBOUNDS_MODE_FLAG: u64 = 1 << 63;

/// CSRs the runtime models
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Csr {
    /// Shadow memory base offset plus the mode flag
    Ubounds,
}

impl Csr {
    pub const fn number(self) -> u16 {
        match self {
            Csr::Ubounds => CSR_UBOUNDS,
        }
    }

    pub const fn from_number(number: u16) -> Option<Self> {
        match number {
            CSR_UBOUNDS => Some(Csr::Ubounds),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ubounds" => Some(Csr::Ubounds),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Csr::Ubounds => "ubounds",
        }
    }
}

impl TryFrom<u16> for Csr {
    type Error = HwstError;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or(HwstError::InvalidCsr(number))
    }
}

impl fmt::Display for Csr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ubounds_lookup() {
        assert_eq!(Csr::from_number(0x800), Some(Csr::Ubounds));
        assert_eq!(Csr::from_number(0x801), None);
        assert_eq!(Csr::from_name("ubounds"), Some(Csr::Ubounds));
        assert_eq!(Csr::Ubounds.number(), CSR_UBOUNDS);
        assert_eq!(Csr::Ubounds.to_string(), "ubounds");
    }

    #[test]
    fn test_try_from_number() {
        assert_eq!(Csr::try_from(0x800u16).unwrap(), Csr::Ubounds);
        assert!(matches!(Csr::try_from(0x300u16), Err(HwstError::InvalidCsr(0x300))));
    }
}
