use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use fliper_core::{FliperConfig, CONFIG_FILE_NAME};
use fliper_encode::{FfmpegEncoder, GifEncoder, OutputFormat, PngSequenceEncoder};
use fliper_ir::InstructionKind;
use fliper_render::{render_program, EngineOptions, FrameRecord, RenderResult};

#[derive(Parser)]
#[command(
    name = "fliper",
    version,
    about = "Fliper: flipbook animations from a tiny script",
    long_about = "Fliper places images on a canvas, moves, rotates, scales and fades them\nover time, and renders every tick to a frame of video."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Fliper script to video
    Render {
        /// Path to the script to render
        #[arg()]
        file: PathBuf,

        /// Output path (default: <output_dir>/<name>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4, gif, png (auto-detected from the output extension if not set)
        #[arg(short, long)]
        format: Option<String>,

        /// Playback frame rate (overrides fliper.toml)
        #[arg(long)]
        fps: Option<f64>,

        /// Config file (default: ./fliper.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a script without encoding and report errors
    Check {
        /// Path to the script to check
        #[arg()]
        file: PathBuf,
    },

    /// Print the per-frame timeline of a script as JSON
    Inspect {
        /// Path to the script to inspect
        #[arg()]
        file: PathBuf,

        /// Only print this frame's record
        #[arg(long, short)]
        frame: Option<usize>,
    },

    /// Display version and engine info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    );

    if matches!(cli.command, Commands::Inspect { .. }) {
        // Inspect: stdout carries JSON only.
        subscriber
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Render {
            file,
            output,
            format,
            fps,
            config,
        } => cmd_render(file, output, format, fps, config),
        Commands::Check { file } => cmd_check(file),
        Commands::Inspect { file, frame } => cmd_inspect(file, frame),
        Commands::Info => cmd_info(),
    }
}

/// Load `--config` strictly, or `./fliper.toml` best-effort.
fn load_config(explicit: Option<&Path>) -> Result<FliperConfig> {
    if let Some(path) = explicit {
        return FliperConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }

    let default_path = Path::new(CONFIG_FILE_NAME);
    if !default_path.exists() {
        return Ok(FliperConfig::default());
    }
    match FliperConfig::load_from_file(default_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("ignoring {}: {}", default_path.display(), e);
            Ok(FliperConfig::default())
        }
    }
}

/// Parse and execute a script. Relative image paths resolve against the
/// script's own directory.
fn execute_script(file: &Path, fps: f64) -> Result<RenderResult> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;

    let program = fliper_lang::parse_program(&source).map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::debug!("{}: {} instructions", file.display(), program.len());

    let base_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let options = EngineOptions { base_dir, fps };

    render_program(&program, options).map_err(|e| anyhow::anyhow!("{}", e))
}

fn resolve_format(format: Option<&str>, output: Option<&Path>, config: &FliperConfig) -> Result<OutputFormat> {
    if let Some(f) = format {
        return f.parse().map_err(|e| anyhow::anyhow!("{}", e));
    }
    if let Some(f) = output.and_then(OutputFormat::from_path) {
        return Ok(f);
    }
    config
        .render
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))
}

fn cmd_render(
    file: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    fps: Option<f64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let start = Instant::now();
    let config = load_config(config_path.as_deref())?;
    let fps = fps.unwrap_or(config.render.fps);
    if !(fps > 0.0) {
        anyhow::bail!("fps must be positive, got {}", fps);
    }
    let out_format = resolve_format(format.as_deref(), output.as_deref(), &config)?;

    println!("🎬 Fliper v{}", env!("CARGO_PKG_VERSION"));
    println!("   Source: {}", file.display());

    let render_start = Instant::now();
    let result = execute_script(&file, fps)?;
    let render_time = render_start.elapsed();

    println!(
        "   ✓ Rendered {} frames ({}x{}) in {:.1}ms",
        result.frame_count(),
        result.width,
        result.height,
        render_time.as_secs_f64() * 1000.0
    );
    println!("   Content hash: {}", result.content_hash().short());

    if result.frames.is_empty() {
        anyhow::bail!("script produced no frames; nothing to encode");
    }

    let stem = file.file_stem().unwrap_or_default().to_string_lossy().to_string();
    let output_path = output.unwrap_or_else(|| {
        let dir = PathBuf::from(&config.render.output_dir);
        match out_format {
            OutputFormat::Png => dir.join(format!("{}_frames", stem)),
            _ => dir.join(format!("{}.{}", stem, out_format.extension())),
        }
    });

    let encode_start = Instant::now();
    match out_format {
        OutputFormat::Mp4 => FfmpegEncoder::encode_with_config(
            &result.frames,
            result.width,
            result.height,
            result.fps,
            &output_path,
            &config.encode,
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
        OutputFormat::Gif => GifEncoder::encode(
            &result.frames,
            result.width,
            result.height,
            result.fps,
            &output_path,
            config.encode.gif_loop,
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
        OutputFormat::Png => {
            PngSequenceEncoder::write(&result.frames, &output_path, &stem).map_err(|e| anyhow::anyhow!("{}", e))?;
        }
    }
    let encode_time = encode_start.elapsed();

    println!(
        "   ✓ Encoded to {} ({}) in {:.1}ms",
        output_path.display(),
        out_format.extension().to_uppercase(),
        encode_time.as_secs_f64() * 1000.0
    );
    println!();
    println!(
        "   ⚡ Total: {:.2}s ({:.1}s of video @ {}fps)",
        start.elapsed().as_secs_f64(),
        result.duration_seconds(),
        result.fps
    );
    println!("   📦 Output: {}", output_path.display());

    Ok(())
}

fn cmd_check(file: PathBuf) -> Result<()> {
    println!("🔍 Checking {}", file.display());

    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    let program = fliper_lang::parse_program(&source).map_err(|e| anyhow::anyhow!("{}", e))?;
    let blocks = program
        .iter()
        .filter(|i| matches!(i.kind, InstructionKind::BlockBegin))
        .count();
    println!("   ✓ Parse OK ({} instructions, {} blocks)", program.len(), blocks);

    let config = load_config(None)?;
    let result = execute_script(&file, config.render.fps)?;
    println!("   ✓ Execute OK ({} frames)", result.frame_count());
    println!("   Content hash: {}", result.content_hash());

    println!();
    println!("   ✅ No errors found.");
    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    source: String,
    width: u32,
    height: u32,
    fps: f64,
    frame_count: usize,
    content_hash: String,
    frames: &'a [FrameRecord],
}

fn cmd_inspect(file: PathBuf, frame: Option<usize>) -> Result<()> {
    let config = load_config(None)?;
    let result = execute_script(&file, config.render.fps)?;

    let json = match frame {
        Some(index) => {
            let record = result
                .timeline
                .get(index)
                .with_context(|| format!("frame {} out of range (0..{})", index, result.frame_count()))?;
            serde_json::to_string_pretty(record)?
        }
        None => serde_json::to_string_pretty(&InspectReport {
            source: file.display().to_string(),
            width: result.width,
            height: result.height,
            fps: result.fps,
            frame_count: result.frame_count(),
            content_hash: result.content_hash().to_hex(),
            frames: &result.timeline,
        })?,
    };
    println!("{}", json);
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("🎬 Fliper Animation Engine");
    println!("   Version:   {}", env!("CARGO_PKG_VERSION"));
    println!("   Renderer:  CPU (single-threaded)");
    println!("   Encoders:  FFmpeg (H.264), GIF, PNG sequence");
    println!(
        "   FFmpeg:    {}",
        if FfmpegEncoder::is_available() {
            "available ✓"
        } else {
            "NOT FOUND ✗"
        }
    );
    println!("   Config:    {}", CONFIG_FILE_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_precedence() {
        let config = FliperConfig::default();
        let flag = resolve_format(Some("gif"), Some(Path::new("a.mp4")), &config).unwrap();
        assert_eq!(flag, OutputFormat::Gif);

        let ext = resolve_format(None, Some(Path::new("a.gif")), &config).unwrap();
        assert_eq!(ext, OutputFormat::Gif);

        let fallback = resolve_format(None, None, &config).unwrap();
        assert_eq!(fallback, OutputFormat::Mp4);

        assert!(resolve_format(Some("avi"), None, &config).is_err());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let missing = std::env::temp_dir().join("fliper_no_such_config.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_config_is_used() {
        let path = std::env::temp_dir().join(format!("fliper_cli_config_{}.toml", std::process::id()));
        std::fs::write(&path, "[render]\nfps = 24.0\nformat = \"gif\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.render.fps, 24.0);
        assert_eq!(resolve_format(None, None, &config).unwrap(), OutputFormat::Gif);
        let _ = std::fs::remove_file(&path);
    }
}
