//! # fliper-lang
//!
//! Fliper script lexer and parser.
//! Turns script text into the instruction stream consumed by the engine.

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::Parser;

use fliper_core::FliperError;
use fliper_ir::Instruction;

/// Tokenize and parse a whole script.
pub fn parse_program(source: &str) -> Result<Vec<Instruction>, FliperError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}
