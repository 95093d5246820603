use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use fliper_core::{EncodeConfig, FliperError, FliperResult, FrameBuffer};

/// Encoder that shells out to FFmpeg for H.264 encoding.
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    /// Check if FFmpeg is available on the system.
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Encode with the default CRF and preset.
    pub fn encode(frames: &[FrameBuffer], width: u32, height: u32, fps: f64, output_path: &Path) -> FliperResult<()> {
        Self::encode_with_config(frames, width, height, fps, output_path, &EncodeConfig::default())
    }

    /// Encode a sequence of RGBA frame buffers to an MP4 file using H.264.
    ///
    /// # Arguments
    /// * `frames` - Ordered sequence of frame buffers (all must have the same dimensions)
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    /// * `fps` - Frames per second
    /// * `output_path` - Path for the output MP4 file
    /// * `config` - CRF and x264 preset
    pub fn encode_with_config(
        frames: &[FrameBuffer],
        width: u32,
        height: u32,
        fps: f64,
        output_path: &Path,
        config: &EncodeConfig,
    ) -> FliperResult<()> {
        if frames.is_empty() {
            return Err(FliperError::Encode("no frames to encode".into()));
        }
        check_dimensions(frames, width, height)?;

        if !Self::is_available() {
            return Err(FliperError::Encode(
                "ffmpeg not found in PATH. Install FFmpeg: https://ffmpeg.org/download.html".into(),
            ));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y");
        cmd.args(input_args(width, height, fps));
        cmd.args(output_args(config));
        cmd.arg(output_path);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FliperError::Encode(format!("failed to start ffmpeg: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FliperError::Encode("failed to open ffmpeg stdin".into()))?;

        for (i, frame) in frames.iter().enumerate() {
            if let Err(e) = stdin.write_all(&frame.data) {
                // Report ffmpeg's own complaint rather than a bare broken pipe.
                drop(stdin);
                let stderr = child
                    .wait_with_output()
                    .map(|o| String::from_utf8_lossy(&o.stderr).into_owned())
                    .unwrap_or_default();
                return Err(FliperError::Encode(format!(
                    "failed to write frame {} to ffmpeg: {}. FFmpeg stderr: {}",
                    i, e, stderr
                )));
            }
        }

        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| FliperError::Encode(format!("ffmpeg process error: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FliperError::Encode(format!(
                "ffmpeg failed with status {}: {}",
                output.status, stderr
            )));
        }

        tracing::info!(
            "Encoded {} frames to {} ({}x{} @ {}fps, crf={}, preset={})",
            frames.len(),
            output_path.display(),
            width,
            height,
            fps,
            config.crf,
            config.preset
        );

        Ok(())
    }
}

/// Raw RGBA frames on stdin.
fn input_args(width: u32, height: u32, fps: f64) -> Vec<String> {
    vec![
        "-f".into(),
        "rawvideo".into(),
        "-pixel_format".into(),
        "rgba".into(),
        "-video_size".into(),
        format!("{}x{}", width, height),
        "-framerate".into(),
        format!("{}", fps),
        "-i".into(),
        "-".into(),
    ]
}

fn output_args(config: &EncodeConfig) -> Vec<String> {
    vec![
        "-an".into(),
        "-c:v".into(),
        "libx264".into(),
        // yuv420p needs even dimensions
        "-vf".into(),
        "pad=ceil(iw/2)*2:ceil(ih/2)*2".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-preset".into(),
        config.preset.clone(),
        "-crf".into(),
        config.crf.to_string(),
        "-movflags".into(),
        "+faststart".into(),
    ]
}

pub(crate) fn check_dimensions(frames: &[FrameBuffer], width: u32, height: u32) -> FliperResult<()> {
    for (i, frame) in frames.iter().enumerate() {
        if frame.width != width || frame.height != height {
            return Err(FliperError::Encode(format!(
                "frame {} has dimensions {}x{}, expected {}x{}",
                i, frame.width, frame.height, width, height
            )));
        }
    }
    Ok(())
}
