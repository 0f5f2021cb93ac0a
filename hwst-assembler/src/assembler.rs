//! Main assembler logic

use crate::error::{AssemblerError, Result};
use crate::parser::{parse_line, Line};
use hwst_spec::{FieldWidths, Program, ProgramHeader};

/// Assemble source code into a program
///
/// A `.widths base, range, key, lock` directive selects the field layout
/// recorded in the program header; it may appear at most once and only
/// before the first instruction.
pub fn assemble(source: &str) -> Result<Program> {
    let mut instructions = Vec::new();
    let mut widths: Option<FieldWidths> = None;

    for (index, text) in source.lines().enumerate() {
        let line_num = index + 1;

        match parse_line(text).map_err(|e| e.at_line(line_num))? {
            None => {}
            Some(Line::Instruction(instr)) => instructions.push(instr),
            Some(Line::Directive { name, args }) => match name.as_str() {
                "widths" => {
                    if widths.is_some() || !instructions.is_empty() {
                        return Err(AssemblerError::InvalidDirective(
                            ".widths must appear once, before any instruction".to_string(),
                        )
                        .at_line(line_num));
                    }
                    widths = Some(parse_widths(&args).map_err(|e| e.at_line(line_num))?);
                }
                _ => {
                    return Err(AssemblerError::InvalidDirective(format!(".{}", name)).at_line(line_num));
                }
            },
        }
    }

    let header = ProgramHeader {
        widths: widths.unwrap_or_default(),
        ..ProgramHeader::new()
    };
    Ok(Program::with_header(header, instructions))
}

fn parse_widths(args: &[i64]) -> Result<FieldWidths> {
    let [base, range, key, lock] = args else {
        return Err(AssemblerError::InvalidDirective(format!(
            ".widths takes 4 arguments, got {}",
            args.len()
        )));
    };

    let narrow = |v: i64| {
        u8::try_from(v).map_err(|_| AssemblerError::InvalidDirective(format!(".widths argument {} out of range", v)))
    };

    Ok(FieldWidths::new(narrow(*base)?, narrow(*range)?, narrow(*key)?, narrow(*lock)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwst_spec::{Instruction, Register};

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            ; Simple test
            li a0, 0x1000   # base
            li a1, 0x2000
            bndrs a0, a0, a1
            halt
        "#;

        let program = assemble(source).unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.header.widths, FieldWidths::DEFAULT);
        assert_eq!(
            program.get(2),
            Some(&Instruction::Bndrs { rd: Register::A0, rs1: Register::A0, rs2: Register::A1 })
        );
    }

    #[test]
    fn test_widths_directive() {
        let program = assemble(".widths 40, 24, 16, 48\nhalt").unwrap();
        assert_eq!(program.header.widths, FieldWidths::new(40, 24, 16, 48).unwrap());
    }

    #[test]
    fn test_widths_directive_rejected() {
        assert!(matches!(
            assemble(".widths 40, 40, 32, 32"),
            Err(AssemblerError::AtLine { line: 1, .. })
        ));
        assert!(assemble(".widths 32, 32, 32").is_err());
        assert!(assemble(".widths 300, 32, 32, 32").is_err());
        assert!(assemble("halt\n.widths 32, 32, 32, 32").is_err());
        assert!(assemble(".widths 32, 32, 32, 32\n.widths 32, 32, 32, 32").is_err());
    }

    #[test]
    fn test_unknown_directive() {
        let err = assemble("\n.data").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_error_reports_line() {
        let err = assemble("halt\nhalt\nlbdl a0, 8(sp").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { line: 3, .. }));

        let err = assemble("halt\nfrob").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("frob"));
    }
}
