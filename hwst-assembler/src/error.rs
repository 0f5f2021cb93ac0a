//! Assembler errors

use hwst_spec::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("Invalid register: {0}")]
    InvalidRegister(String),

    #[error("Invalid CSR: {0}")]
    InvalidCsr(String),

    #[error("Invalid immediate value: {0}")]
    InvalidImmediate(String),

    #[error("Immediate {value} does not fit in {bits} signed bits")]
    ImmediateOutOfRange { value: i64, bits: u32 },

    #[error("Invalid directive: {0}")]
    InvalidDirective(String),

    #[error("Invalid field widths: {0}")]
    InvalidWidths(#[from] ConfigError),

    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<AssemblerError>,
    },
}

impl AssemblerError {
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            AssemblerError::SyntaxError { column, message, .. } => {
                AssemblerError::SyntaxError { line, column, message }
            }
            already @ AssemblerError::AtLine { .. } => already,
            other => AssemblerError::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }

    /// Line the error was reported on, if known
    pub fn line(&self) -> Option<usize> {
        match self {
            AssemblerError::SyntaxError { line, .. } | AssemblerError::AtLine { line, .. } if *line > 0 => {
                Some(*line)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
