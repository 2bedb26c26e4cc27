//! Scanner and parser for preprocessed C source.
//!
//! The parser is pull-based: `Parser::next_external_decl` yields one
//! external declaration at a time, which the driver feeds through the
//! semantic passes before asking for the next. Typedef names and
//! enumeration constants are tracked in the scope-stamped name table and
//! expanded during parsing, so the AST handed to the resolver never
//! contains `TypedefName` nodes.

pub mod ast;
mod grammar;
mod lexer;
mod nametab;

#[cfg(test)]
mod grammar_tests;
#[cfg(test)]
mod lexer_tests;

pub use grammar::Parser;
pub use lexer::{Token, TokenKind, lex, token_text};
pub use nametab::{NameClass, NameTable};

/// Errors produced by the scanner and parser.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected character at offset {0}")]
    UnexpectedChar(usize),

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("Invalid {what} constant '{text}'")]
    InvalidConstant { what: &'static str, text: String },

    #[error("Missing type specifier in declaration")]
    MissingTypeSpecifier,

    #[error("Invalid type specifier combination")]
    InvalidSpecifiers,

    #[error("Expected constant integer expression")]
    ExpectedConstant,

    #[error("Structure member requires a name")]
    UnnamedMember,

    #[error("{0} are not supported")]
    Unsupported(&'static str),
}
