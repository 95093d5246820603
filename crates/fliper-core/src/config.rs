use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{FliperError, FliperResult};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "fliper.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Playback rate handed to the encoder. Frame count never depends on it.
    pub fps: f64,
    pub format: String, // "mp4" | "gif" | "png"
    pub output_dir: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 15.0,
            format: "mp4".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub crf: u8,
    pub preset: String,
    /// GIF repeat count; 0 loops forever.
    pub gif_loop: u16,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: "medium".to_string(),
            gif_loop: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct FliperConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub encode: EncodeConfig,
}

impl FliperConfig {
    pub fn from_toml(contents: &str) -> FliperResult<Self> {
        let config: FliperConfig =
            toml::from_str(contents).map_err(|e| FliperError::Config(e.to_string()))?;
        if config.render.fps.is_nan() || config.render.fps <= 0.0 {
            return Err(FliperError::Config(format!(
                "render.fps must be positive, got {}",
                config.render.fps
            )));
        }
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> FliperResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn save_to_file(&self, path: &Path) -> FliperResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| FliperError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
