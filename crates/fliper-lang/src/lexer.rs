use std::fmt;

use fliper_core::{FliperError, SourcePos};

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn pos(&self) -> SourcePos {
        SourcePos::new(self.line, self.column)
    }
}

/// Token kinds in a Fliper script.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Canvas,
    Image,
    Move,
    Rotate,
    Opacity,
    Scale,
    Wait,
    Delete,
    Begin,
    End,

    // Literals
    Identifier(String),
    StringLiteral(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),

    // Special
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Canvas => write!(f, "canvas"),
            TokenKind::Image => write!(f, "image"),
            TokenKind::Move => write!(f, "move"),
            TokenKind::Rotate => write!(f, "rotate"),
            TokenKind::Opacity => write!(f, "opacity"),
            TokenKind::Scale => write!(f, "scale"),
            TokenKind::Wait => write!(f, "wait"),
            TokenKind::Delete => write!(f, "delete"),
            TokenKind::Begin => write!(f, "begin"),
            TokenKind::End => write!(f, "end"),
            TokenKind::Identifier(s) => write!(f, "{}", s),
            TokenKind::StringLiteral(s) => write!(f, "\"{}\"", s),
            TokenKind::IntegerLiteral(n) => write!(f, "{}", n),
            TokenKind::FloatLiteral(n) => write!(f, "{}", n),
            TokenKind::Newline => write!(f, "end of line"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The Fliper script lexer (tokenizer).
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source into a Vec of tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, FliperError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<Token, FliperError> {
        loop {
            self.skip_whitespace();
            if self.peek() == Some('/') && self.peek_next() == Some('/') {
                self.skip_line_comment();
            } else {
                break;
            }
        }

        let start = self.pos;
        let line = self.line;
        let column = self.column;

        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                return Ok(Token::new(
                    TokenKind::Eof,
                    Span::new(start, start, line, column),
                ));
            }
        };

        let kind = match ch {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            '"' => self.read_string(line, column)?,
            c if c.is_ascii_digit() => self.read_number(line, column)?,
            '-' | '+' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(line, column)?
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_while(|c| c.is_alphanumeric() || c == '_');
                match ident.as_str() {
                    "canvas" => TokenKind::Canvas,
                    "image" => TokenKind::Image,
                    "move" => TokenKind::Move,
                    "rotate" => TokenKind::Rotate,
                    "opacity" => TokenKind::Opacity,
                    "scale" => TokenKind::Scale,
                    "wait" => TokenKind::Wait,
                    "delete" => TokenKind::Delete,
                    "begin" => TokenKind::Begin,
                    "end" => TokenKind::End,
                    _ => TokenKind::Identifier(ident),
                }
            }
            _ => {
                return Err(FliperError::parse(
                    format!("unexpected character: '{}'", ch),
                    line,
                    column,
                ));
            }
        };

        Ok(Token::new(kind, Span::new(start, self.pos, line, column)))
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<TokenKind, FliperError> {
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral(s));
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some(c) => s.push(c),
                        None => break,
                    }
                }
                // Strings never span lines.
                Some('\n') | None => break,
                Some(c) => {
                    self.advance();
                    s.push(c);
                }
            }
        }
        Err(FliperError::parse("unterminated string literal", line, column))
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<TokenKind, FliperError> {
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.advance();
            text.push(sign);
        }
        text.push_str(&self.read_while(|c| c.is_ascii_digit() || c == '.'));

        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            let tail = self.read_while(|c| c.is_alphanumeric() || c == '_');
            return Err(FliperError::parse(
                format!("invalid number: {}{}", text, tail),
                line,
                column,
            ));
        }

        let invalid = || FliperError::parse(format!("invalid number: {}", text), line, column);
        if text.contains('.') {
            text.parse::<f64>().map(TokenKind::FloatLiteral).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(TokenKind::IntegerLiteral).map_err(|_| invalid())
        }
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }
}
