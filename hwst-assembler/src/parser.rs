//! Assembly parser
//!
//! Works one line at a time over the token stream from [`crate::lexer`].
//! Operand order follows the usual RISC-V conventions:
//!
//! ```text
//! bndrs rd, rs1, rs2        mbas rd, rs1          li   rd, imm
//! sbdl  rs2, imm(rs1)       lbdl rd, imm(rs1)     addi rd, rs1, imm
//! tchk  rs2, imm(rs1)       csrw ubounds, rs1     csrr rd, ubounds
//! ```

use crate::error::{AssemblerError, Result};
use crate::lexer::Token;
use hwst_spec::{Csr, Instruction, Register};
use logos::Logos;

/// Width of the signed offset in memory forms and `addi`
pub const IMM_BITS: u32 = 12;

/// One parsed source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Instruction(Instruction),
    Directive { name: String, args: Vec<i64> },
}

/// Parse a single instruction from assembly text
pub fn parse_instruction(text: &str) -> Result<Instruction> {
    match parse_line(text)? {
        Some(Line::Instruction(instr)) => Ok(instr),
        Some(Line::Directive { name, .. }) => Err(AssemblerError::InvalidDirective(format!(
            ".{} is not an instruction",
            name
        ))),
        None => Err(syntax(0, "Empty instruction")),
    }
}

/// Parse register name (`x0`-`x31` or ABI name)
pub fn parse_register(name: &str) -> Result<Register> {
    let name = name.trim().to_ascii_lowercase();
    Register::from_name(&name).ok_or(AssemblerError::InvalidRegister(name))
}

/// Parse one line; blank and comment-only lines yield `None`
pub fn parse_line(text: &str) -> Result<Option<Line>> {
    let mut parser = Parser::new(text)?;

    let line = match parser.next() {
        None => return Ok(None),
        Some(Token::Directive(name)) => {
            let args = parser.directive_args()?;
            Line::Directive { name, args }
        }
        Some(Token::Identifier(mnemonic)) => Line::Instruction(parser.instruction(&mnemonic)?),
        Some(other) => {
            return Err(syntax(
                parser.column(),
                &format!("Expected instruction or directive, found {:?}", other),
            ))
        }
    };

    parser.finish()?;
    Ok(Some(line))
}

fn syntax(column: usize, message: &str) -> AssemblerError {
    AssemblerError::SyntaxError {
        line: 0,
        column,
        message: message.to_string(),
    }
}

/// Cursor over the tokens of one line
struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut lex = Token::lexer(text);

        while let Some(token) = lex.next() {
            let column = lex.span().start + 1;
            match token {
                Ok(Token::Newline) => break,
                Ok(token) => tokens.push((token, column)),
                Err(()) => {
                    return Err(syntax(column, &format!("Unexpected input '{}'", lex.slice())));
                }
            }
        }

        Ok(Self { tokens, pos: 0 })
    }

    /// Column of the most recently consumed token
    fn column(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: Token, what: &str) -> Result<()> {
        match self.next() {
            Some(ref t) if *t == want => Ok(()),
            Some(t) => Err(syntax(self.column(), &format!("Expected {}, found {:?}", what, t))),
            None => Err(syntax(self.column(), &format!("Expected {}", what))),
        }
    }

    fn comma(&mut self) -> Result<()> {
        self.expect(Token::Comma, "','")
    }

    fn finish(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some((t, column)) => Err(syntax(*column, &format!("Unexpected trailing {:?}", t))),
        }
    }

    fn register(&mut self) -> Result<Register> {
        match self.next() {
            Some(Token::Identifier(name)) => parse_register(&name),
            Some(t) => Err(AssemblerError::InvalidRegister(format!("{:?}", t))),
            None => Err(syntax(self.column(), "Expected register operand")),
        }
    }

    fn csr(&mut self) -> Result<Csr> {
        match self.next() {
            Some(Token::Identifier(name)) => Csr::from_name(&name).ok_or(AssemblerError::InvalidCsr(name)),
            Some(Token::Hex(n)) | Some(Token::Number(n)) | Some(Token::Binary(n)) => u16::try_from(n)
                .ok()
                .and_then(|number| Csr::try_from(number).ok())
                .ok_or_else(|| AssemblerError::InvalidCsr(format!("{:#x}", n))),
            Some(t) => Err(AssemblerError::InvalidCsr(format!("{:?}", t))),
            None => Err(syntax(self.column(), "Expected CSR operand")),
        }
    }

    /// Optional `-` followed by an unsigned magnitude
    fn signed_parts(&mut self) -> Result<(bool, u64)> {
        let negative = if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            true
        } else {
            false
        };

        match self.next() {
            Some(Token::Number(n)) | Some(Token::Hex(n)) | Some(Token::Binary(n)) => Ok((negative, n)),
            Some(t) => Err(AssemblerError::InvalidImmediate(format!("{:?}", t))),
            None => Err(syntax(self.column(), "Expected immediate")),
        }
    }

    fn signed(&mut self) -> Result<i64> {
        let (negative, magnitude) = self.signed_parts()?;
        let value = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        i64::try_from(value).map_err(|_| AssemblerError::InvalidImmediate(format!("{}", value)))
    }

    /// Signed immediate that must fit in `bits`
    fn bounded(&mut self, bits: u32) -> Result<i32> {
        let value = self.signed()?;
        let limit = 1i64 << (bits - 1);
        if value < -limit || value >= limit {
            return Err(AssemblerError::ImmediateOutOfRange { value, bits });
        }
        Ok(value as i32)
    }

    /// Any 64-bit pattern; negative values are two's complement
    fn wide(&mut self) -> Result<u64> {
        let (negative, magnitude) = self.signed_parts()?;
        if !negative {
            return Ok(magnitude);
        }
        if magnitude > 1 << 63 {
            return Err(AssemblerError::InvalidImmediate(format!("-{}", magnitude)));
        }
        Ok(magnitude.wrapping_neg())
    }

    /// `imm(reg)` or `(reg)`
    fn memory_operand(&mut self) -> Result<(i32, Register)> {
        let imm = if self.peek() == Some(&Token::LParen) {
            0
        } else {
            self.bounded(IMM_BITS)?
        };
        self.expect(Token::LParen, "'('")?;
        let base = self.register()?;
        self.expect(Token::RParen, "')'")?;
        Ok((imm, base))
    }

    fn three_registers(&mut self) -> Result<(Register, Register, Register)> {
        let rd = self.register()?;
        self.comma()?;
        let rs1 = self.register()?;
        self.comma()?;
        let rs2 = self.register()?;
        Ok((rd, rs1, rs2))
    }

    fn two_registers(&mut self) -> Result<(Register, Register)> {
        let rd = self.register()?;
        self.comma()?;
        let rs1 = self.register()?;
        Ok((rd, rs1))
    }

    /// `reg, imm(base)` returned as `(reg, base, imm)`
    fn register_memory(&mut self) -> Result<(Register, Register, i32)> {
        let reg = self.register()?;
        self.comma()?;
        let (imm, base) = self.memory_operand()?;
        Ok((reg, base, imm))
    }

    fn directive_args(&mut self) -> Result<Vec<i64>> {
        let mut args = Vec::new();
        if self.peek().is_none() {
            return Ok(args);
        }
        loop {
            args.push(self.signed()?);
            if self.peek() != Some(&Token::Comma) {
                return Ok(args);
            }
            self.pos += 1;
        }
    }

    fn instruction(&mut self, mnemonic: &str) -> Result<Instruction> {
        let instr = match mnemonic {
            // Bounds construction
            "bndrs" => {
                let (rd, rs1, rs2) = self.three_registers()?;
                Instruction::Bndrs { rd, rs1, rs2 }
            }
            "bndrt" => {
                let (rd, rs1, rs2) = self.three_registers()?;
                Instruction::Bndrt { rd, rs1, rs2 }
            }

            // Decompression and copy
            "mbas" => {
                let (rd, rs1) = self.two_registers()?;
                Instruction::Mbas { rd, rs1 }
            }
            "mbnd" => {
                let (rd, rs1) = self.two_registers()?;
                Instruction::Mbnd { rd, rs1 }
            }
            "mkey" => {
                let (rd, rs1) = self.two_registers()?;
                Instruction::Mkey { rd, rs1 }
            }
            "mvsr" => {
                let (rd, rs1) = self.two_registers()?;
                Instruction::Mvsr { rd, rs1 }
            }

            // Spill
            "sbdl" => {
                let (rs2, rs1, imm) = self.register_memory()?;
                Instruction::Sbdl { rs1, rs2, imm }
            }
            "sbdu" => {
                let (rs2, rs1, imm) = self.register_memory()?;
                Instruction::Sbdu { rs1, rs2, imm }
            }

            // Fill
            "lbdl" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lbdl { rd, rs1, imm }
            }
            "lbdu" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lbdu { rd, rs1, imm }
            }
            "lbdls" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lbdls { rd, rs1, imm }
            }
            "lbdus" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lbdus { rd, rs1, imm }
            }
            "lkey" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lkey { rd, rs1, imm }
            }

            // Check
            "tchk" => {
                let (rs2, rs1, imm) = self.register_memory()?;
                Instruction::Tchk { rs1, rs2, imm }
            }

            // Host subset
            "li" => {
                let rd = self.register()?;
                self.comma()?;
                let imm = self.wide()?;
                Instruction::Li { rd, imm }
            }
            "addi" => {
                let (rd, rs1) = self.two_registers()?;
                self.comma()?;
                let imm = self.bounded(IMM_BITS)?;
                Instruction::Addi { rd, rs1, imm }
            }
            "mv" => {
                let (rd, rs1) = self.two_registers()?;
                Instruction::Addi { rd, rs1, imm: 0 }
            }
            "add" => {
                let (rd, rs1, rs2) = self.three_registers()?;
                Instruction::Add { rd, rs1, rs2 }
            }
            "lw" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Lw { rd, rs1, imm }
            }
            "ld" => {
                let (rd, rs1, imm) = self.register_memory()?;
                Instruction::Ld { rd, rs1, imm }
            }
            "sw" => {
                let (rs2, rs1, imm) = self.register_memory()?;
                Instruction::Sw { rs1, rs2, imm }
            }
            "sd" => {
                let (rs2, rs1, imm) = self.register_memory()?;
                Instruction::Sd { rs1, rs2, imm }
            }
            "csrr" => {
                let rd = self.register()?;
                self.comma()?;
                let csr = self.csr()?;
                Instruction::Csrr { rd, csr }
            }
            "csrw" => {
                let csr = self.csr()?;
                self.comma()?;
                let rs1 = self.register()?;
                Instruction::Csrw { csr, rs1 }
            }
            "halt" => Instruction::Halt,

            _ => return Err(AssemblerError::UnknownInstruction(mnemonic.to_string())),
        };
        Ok(instr)
    }
}
