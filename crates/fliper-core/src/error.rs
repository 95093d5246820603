/// Core error types for the Fliper engine.
use std::fmt;
use std::path::PathBuf;

use crate::color::Channel;

/// A specialized Result type for Fliper operations.
pub type FliperResult<T> = Result<T, FliperError>;

/// 1-based line and column of a token in the script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub line: usize,
    pub column: usize,
}

impl SourcePos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Top-level error type encompassing all Fliper subsystems.
///
/// Every script-level variant carries the position of the offending token and
/// renders as `At <line>:<column>, <message>`.
#[derive(Debug, thiserror::Error)]
pub enum FliperError {
    #[error("At {pos}, {message}")]
    Parse { message: String, pos: SourcePos },

    #[error("At {pos}, Canvas size not set before drawing.")]
    CanvasNotSet { pos: SourcePos },

    #[error("At {pos}, Canvas size changed after drawing commands.")]
    CanvasReadjust { pos: SourcePos },

    #[error("At {pos}, canvas dimensions must be strictly greater than 0 (got {width}x{height})")]
    InvalidCanvasSize {
        width: i64,
        height: i64,
        pos: SourcePos,
    },

    #[error("At {pos}, {message}")]
    ImagePath {
        message: String,
        path: PathBuf,
        pos: SourcePos,
    },

    #[error("At {pos}, 0 <= {channel} value <= 255 (got {value})")]
    ColorOutOfRange {
        channel: Channel,
        value: i64,
        pos: SourcePos,
    },

    #[error("At {pos}, ID {id} is already associated with an image.")]
    DuplicateId { id: String, pos: SourcePos },

    #[error("At {pos}, No image is associated with ID {id}")]
    IdNotFound { id: String, pos: SourcePos },

    #[error("At {pos}, Duration must be strictly greater than 0")]
    InvalidDuration { duration: i64, pos: SourcePos },

    #[error("At {pos}, scale factors must be strictly greater than 0 (got {factor_x}, {factor_y})")]
    InvalidScale {
        factor_x: f64,
        factor_y: f64,
        pos: SourcePos,
    },

    #[error("At {pos}, an image of {width}x{height} pixels exceeds the limit of {limit} pixels")]
    ImageTooLarge {
        width: f64,
        height: f64,
        limit: u64,
        pos: SourcePos,
    },

    #[error("At {pos}, a block is already open; blocks cannot be nested")]
    NestedBlock { pos: SourcePos },

    #[error("At {pos}, end of block without a matching begin")]
    BlockEndWithoutBegin { pos: SourcePos },

    #[error("At {pos}, block is never closed before the end of the program")]
    UnterminatedBlock { pos: SourcePos },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FliperError {
    /// Create a parse error with source location.
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        FliperError::Parse {
            message: message.into(),
            pos: SourcePos::new(line, column),
        }
    }

    /// Create an image path error.
    pub fn image_path(message: impl Into<String>, path: impl Into<PathBuf>, pos: SourcePos) -> Self {
        FliperError::ImagePath {
            message: message.into(),
            path: path.into(),
            pos,
        }
    }

    /// Source position of the offending token, for script-level errors.
    pub fn pos(&self) -> Option<SourcePos> {
        match self {
            FliperError::Parse { pos, .. }
            | FliperError::CanvasNotSet { pos }
            | FliperError::CanvasReadjust { pos }
            | FliperError::InvalidCanvasSize { pos, .. }
            | FliperError::ImagePath { pos, .. }
            | FliperError::ColorOutOfRange { pos, .. }
            | FliperError::DuplicateId { pos, .. }
            | FliperError::IdNotFound { pos, .. }
            | FliperError::InvalidDuration { pos, .. }
            | FliperError::InvalidScale { pos, .. }
            | FliperError::ImageTooLarge { pos, .. }
            | FliperError::NestedBlock { pos }
            | FliperError::BlockEndWithoutBegin { pos }
            | FliperError::UnterminatedBlock { pos } => Some(*pos),
            FliperError::Encode(_) | FliperError::Config(_) | FliperError::Io(_) => None,
        }
    }
}
