//! # fliper-encode
//!
//! Encoding module: turns rendered FrameBuffers into files.
//! MP4 shells out to FFmpeg; GIF and PNG sequences are written natively
//! through the `image` crate.

pub mod ffmpeg;
pub mod gif;
pub mod png_seq;

pub use ffmpeg::FfmpegEncoder;
pub use gif::GifEncoder;
pub use png_seq::PngSequenceEncoder;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use fliper_core::FliperError;

/// Output container selected on the command line or in `fliper.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp4,
    Gif,
    /// A directory of numbered PNG frames.
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Gif => "gif",
            OutputFormat::Png => "png",
        }
    }

    /// Guess the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = FliperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(OutputFormat::Mp4),
            "gif" => Ok(OutputFormat::Gif),
            "png" => Ok(OutputFormat::Png),
            other => Err(FliperError::Encode(format!(
                "unknown output format '{}' (expected mp4, gif or png)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("mp4".parse::<OutputFormat>().unwrap(), OutputFormat::Mp4);
        assert_eq!("GIF".parse::<OutputFormat>().unwrap(), OutputFormat::Gif);
        assert!("webm".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out/clip.gif")), Some(OutputFormat::Gif));
        assert_eq!(OutputFormat::from_path(Path::new("frames")), None);
        assert_eq!(OutputFormat::Png.to_string(), "png");
    }
}
