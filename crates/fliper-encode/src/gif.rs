use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use fliper_core::{FliperError, FliperResult, FrameBuffer};

use crate::ffmpeg::check_dimensions;

/// Native GIF encoder using the `image` crate.
pub struct GifEncoder;

impl GifEncoder {
    /// Encode a sequence of RGBA frame buffers to an animated GIF.
    ///
    /// `loop_count` of 0 loops forever.
    pub fn encode(
        frames: &[FrameBuffer],
        width: u32,
        height: u32,
        fps: f64,
        output_path: &Path,
        loop_count: u16,
    ) -> FliperResult<()> {
        if frames.is_empty() {
            return Err(FliperError::Encode("no frames to encode for GIF".into()));
        }
        check_dimensions(frames, width, height)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(output_path)
            .map_err(|e| FliperError::Encode(format!("failed to create GIF file: {}", e)))?;
        let writer = BufWriter::new(file);

        let delay_cs = frame_delay_cs(fps);
        let mut encoder = image::codecs::gif::GifEncoder::new_with_speed(writer, 10);

        let repeat = match loop_count {
            0 => image::codecs::gif::Repeat::Infinite,
            n => image::codecs::gif::Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| FliperError::Encode(format!("failed to set GIF repeat: {}", e)))?;

        for (i, frame) in frames.iter().enumerate() {
            let image = image::RgbaImage::from_raw(width, height, frame.data.clone())
                .ok_or_else(|| FliperError::Encode(format!("invalid frame data at frame {}", i)))?;
            let gif_frame = image::Frame::from_parts(
                image,
                0,
                0,
                image::Delay::from_numer_denom_ms(delay_cs as u32 * 10, 1),
            );

            encoder
                .encode_frame(gif_frame)
                .map_err(|e| FliperError::Encode(format!("failed to encode GIF frame {}: {}", i, e)))?;
        }

        tracing::info!(
            "Encoded {} frames to GIF at {} ({}x{} @ {}fps, delay={}cs)",
            frames.len(),
            output_path.display(),
            width,
            height,
            fps,
            delay_cs,
        );

        Ok(())
    }
}

/// Inter-frame delay in centiseconds. Most viewers clamp anything below 2.
fn frame_delay_cs(fps: f64) -> u16 {
    ((100.0 / fps).round() as u16).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fliper_core::Color;

    #[test]
    fn test_gif_encode_empty_frames() {
        let out = std::env::temp_dir().join("fliper_test_empty.gif");
        let result = GifEncoder::encode(&[], 320, 240, 15.0, &out, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_delay() {
        assert_eq!(frame_delay_cs(15.0), 7);
        assert_eq!(frame_delay_cs(10.0), 10);
        assert_eq!(frame_delay_cs(100.0), 2);
    }

    #[test]
    fn test_gif_encode_solid_frames() {
        let frames: Vec<FrameBuffer> = (0..5)
            .map(|i| FrameBuffer::solid(4, 4, &Color::rgb(255, (i * 50) as u8, 0)))
            .collect();

        let out = std::env::temp_dir().join(format!("fliper_test_gif_{}.gif", std::process::id()));
        let result = GifEncoder::encode(&frames, 4, 4, 15.0, &out, 3);
        assert!(result.is_ok(), "GIF encode failed: {:?}", result.err());

        let meta = std::fs::metadata(&out).unwrap();
        assert!(meta.len() > 0);

        let _ = std::fs::remove_file(&out);
    }
}
