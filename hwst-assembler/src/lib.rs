//! HWST Assembler
//!
//! Assemble HWST assembly text into a [`hwst_spec::Program`].
//!
//! ## Example
//!
//! ```rust
//! use hwst_assembler::assemble;
//!
//! let source = r#"
//!     .widths 32, 32, 32, 32
//!     li    a0, 0x1000
//!     li    a1, 0x1040
//!     bndrs a0, a0, a1
//!     sbdl  a0, 0(sp)
//!     halt
//! "#;
//!
//! let program = assemble(source).unwrap();
//! assert_eq!(program.len(), 5);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod assembler;

pub use error::{AssemblerError, Result};
pub use assembler::assemble;
pub use parser::{parse_instruction, parse_line, parse_register, Line};
