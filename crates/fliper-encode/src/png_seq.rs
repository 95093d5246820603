use std::path::{Path, PathBuf};

use fliper_core::{FliperError, FliperResult, FrameBuffer};

/// Writes every frame as its own PNG: `<dir>/<prefix>_<index>.png`.
pub struct PngSequenceEncoder;

impl PngSequenceEncoder {
    /// Returns the written paths in frame order.
    pub fn write(frames: &[FrameBuffer], dir: &Path, prefix: &str) -> FliperResult<Vec<PathBuf>> {
        if frames.is_empty() {
            return Err(FliperError::Encode("no frames to write".into()));
        }
        std::fs::create_dir_all(dir)?;

        let width = digits(frames.len() - 1);
        let mut paths = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let path = dir.join(format!("{}_{:0width$}.png", prefix, i, width = width));
            let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
                .ok_or_else(|| FliperError::Encode(format!("invalid frame data at frame {}", i)))?;
            image
                .save(&path)
                .map_err(|e| FliperError::Encode(format!("failed to write {}: {}", path.display(), e)))?;
            paths.push(path);
        }

        tracing::info!("Wrote {} PNG frames to {}", paths.len(), dir.display());
        Ok(paths)
    }
}

/// Zero-padding width so file names sort in frame order.
fn digits(n: usize) -> usize {
    n.to_string().len()
}
