//! # Lexer for HWST assembly
//!
//! Registers and CSR names lex as plain identifiers; the parser decides
//! what an identifier means from its position.

use logos::Logos;

/// Tokens for HWST assembly
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip whitespace (not newlines)
#[logos(skip r"[#;][^\n]*")] // Skip comments
pub enum Token {
    /// Identifier (mnemonics, registers, CSR names)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_ascii_lowercase())]
    Identifier(String),

    /// Decimal number (a leading `-` lexes as [`Token::Minus`])
    #[regex(r"[0-9][0-9_]*", |lex| parse_radix(lex.slice(), 10))]
    Number(u64),

    /// Hexadecimal number
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| parse_radix(&lex.slice()[2..], 16))]
    Hex(u64),

    /// Binary number
    #[regex(r"0[bB][01_]+", |lex| parse_radix(&lex.slice()[2..], 2))]
    Binary(u64),

    /// Directive (`.widths`)
    #[regex(r"\.[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_ascii_lowercase())]
    Directive(String),

    #[token(",")]
    Comma,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("-")]
    Minus,

    #[regex(r"\n")]
    Newline,
}

fn parse_radix(digits: &str, radix: u32) -> Option<u64> {
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    u64::from_str_radix(&digits, radix).ok()
}
