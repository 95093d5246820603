//! The image-processing seam.
//!
//! The engine never touches pixels itself: decoding, compositing and every
//! per-tick image transform go through an [`ImageBackend`]. Each operation
//! takes its input by reference and returns a fresh buffer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fliper_core::{Color, FrameBuffer};

/// Shared, immutable image owned by a scene object.
pub type ImageHandle = Arc<FrameBuffer>;

/// Why an image could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image at {} does not exist.", .0.display())]
    Missing(PathBuf),

    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Image at {} cannot be opened or identified.", .path.display())]
    Undecodable { path: PathBuf, reason: String },
}

/// One image to paint during compositing, at its canvas position.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub image: &'a FrameBuffer,
    pub x: i64,
    pub y: i64,
}

pub trait ImageBackend {
    /// Load the image at `path` as RGBA.
    fn decode(&self, path: &Path) -> Result<FrameBuffer, DecodeError>;

    /// Paint `layers` in order onto a fresh `width`x`height` background.
    fn composite(&self, background: Color, width: u32, height: u32, layers: &[Layer<'_>]) -> FrameBuffer;

    /// Rotate counter-clockwise about the center, keeping the dimensions;
    /// area uncovered by the rotated image is filled with `fill`.
    fn rotate(&self, image: &FrameBuffer, degrees: f64, fill: Color) -> FrameBuffer;

    /// Resample to exactly `width`x`height`.
    fn resize(&self, image: &FrameBuffer, width: u32, height: u32) -> FrameBuffer;

    /// Set every pixel's alpha to `alpha`.
    fn replace_alpha(&self, image: &FrameBuffer, alpha: u8) -> FrameBuffer;
}
