//! Fliper script parser: tokens to instruction stream.
//!
//! The grammar is line oriented: every non-blank line holds exactly one
//! instruction.
//!
//! ```text
//! canvas <width> <height> [<r> <g> <b> <a>]
//! image "<path>" "<id>" [<x> <y>]
//! move "<id>" <x> <y> <duration>
//! rotate "<id>" <degrees> <duration>
//! opacity "<id>" <alpha> <duration>
//! scale "<id>" <fx> <fy> <duration>
//! wait <duration>
//! delete "<id>"
//! begin
//! end
//! ```

use fliper_core::{FliperError, SourcePos};
use fliper_ir::{Instruction, InstructionKind, Located};

use crate::lexer::{Span, Token, TokenKind};

/// The Fliper script parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream into instructions, in source order.
    pub fn parse(&mut self) -> Result<Vec<Instruction>, FliperError> {
        let mut program = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek() == &TokenKind::Eof {
                break;
            }
            program.push(self.parse_instruction()?);
            self.expect_line_end()?;
        }
        tracing::debug!("parsed {} instructions", program.len());
        Ok(program)
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0, 1, 1))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, expected: &str) -> FliperError {
        let span = self.current_span();
        FliperError::parse(
            format!("expected {}, got {}", expected, self.peek()),
            span.line,
            span.column,
        )
    }

    fn skip_newlines(&mut self) {
        while self.peek() == &TokenKind::Newline {
            self.advance();
        }
    }

    fn expect_line_end(&mut self) -> Result<(), FliperError> {
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.error_here("end of line")),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Newline | TokenKind::Eof)
    }

    fn parse_instruction(&mut self) -> Result<Instruction, FliperError> {
        let pos = self.current_span().pos();
        let keyword = self.peek().clone();
        let kind = match keyword {
            TokenKind::Canvas => {
                self.advance();
                self.parse_canvas()?
            }
            TokenKind::Image => {
                self.advance();
                self.parse_image()?
            }
            TokenKind::Move => {
                self.advance();
                InstructionKind::Move {
                    id: self.parse_string()?,
                    x: self.parse_integer()?.value,
                    y: self.parse_integer()?.value,
                    duration: self.parse_integer()?,
                }
            }
            TokenKind::Rotate => {
                self.advance();
                InstructionKind::Rotate {
                    id: self.parse_string()?,
                    degrees: self.parse_float()?,
                    duration: self.parse_integer()?,
                }
            }
            TokenKind::Opacity => {
                self.advance();
                InstructionKind::SetOpacity {
                    id: self.parse_string()?,
                    alpha: self.parse_integer()?,
                    duration: self.parse_integer()?,
                }
            }
            TokenKind::Scale => {
                self.advance();
                InstructionKind::Scale {
                    id: self.parse_string()?,
                    factor_x: self.parse_float()?,
                    factor_y: self.parse_float()?,
                    duration: self.parse_integer()?,
                }
            }
            TokenKind::Wait => {
                self.advance();
                InstructionKind::Wait {
                    duration: self.parse_integer()?,
                }
            }
            TokenKind::Delete => {
                self.advance();
                InstructionKind::Delete {
                    id: self.parse_string()?,
                }
            }
            TokenKind::Begin => {
                self.advance();
                InstructionKind::BlockBegin
            }
            TokenKind::End => {
                self.advance();
                InstructionKind::BlockEnd
            }
            _ => return Err(self.error_here("an instruction")),
        };
        Ok(Instruction::new(kind, pos))
    }

    /// `canvas <w> <h> [<r> <g> <b> <a>]`. The color is all four channels
    /// or nothing.
    fn parse_canvas(&mut self) -> Result<InstructionKind, FliperError> {
        let width = self.parse_integer()?;
        let height = self.parse_integer()?;
        let background = if self.at_line_end() {
            None
        } else {
            Some([
                self.parse_integer()?,
                self.parse_integer()?,
                self.parse_integer()?,
                self.parse_integer()?,
            ])
        };
        Ok(InstructionKind::SetCanvas {
            width,
            height,
            background,
        })
    }

    /// `image "<path>" "<id>" [<x> <y>]`
    fn parse_image(&mut self) -> Result<InstructionKind, FliperError> {
        let path = self.parse_string()?;
        let id = self.parse_string()?;
        let position = if self.at_line_end() {
            None
        } else {
            let x = self.parse_integer()?.value;
            let y = self.parse_integer()?.value;
            Some((x, y))
        };
        Ok(InstructionKind::PlaceImage { path, id, position })
    }

    fn parse_string(&mut self) -> Result<Located<String>, FliperError> {
        let pos = self.current_span().pos();
        match self.peek().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Located::new(s, pos))
            }
            _ => Err(self.error_here("a quoted string")),
        }
    }

    fn parse_integer(&mut self) -> Result<Located<i64>, FliperError> {
        let pos: SourcePos = self.current_span().pos();
        match *self.peek() {
            TokenKind::IntegerLiteral(n) => {
                self.advance();
                Ok(Located::new(n, pos))
            }
            _ => Err(self.error_here("an integer")),
        }
    }

    /// Integers are accepted wherever a float is.
    fn parse_float(&mut self) -> Result<f64, FliperError> {
        match *self.peek() {
            TokenKind::FloatLiteral(n) => {
                self.advance();
                Ok(n)
            }
            TokenKind::IntegerLiteral(n) => {
                self.advance();
                Ok(n as f64)
            }
            _ => Err(self.error_here("a number")),
        }
    }
}
