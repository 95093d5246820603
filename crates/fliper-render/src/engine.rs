//! The instruction interpreter.
//!
//! An [`Engine`] owns the canvas, the scene, the open block (if any) and the
//! append-only frame sequence. Instructions are executed one at a time; the
//! first failed precondition aborts with a positioned [`FliperError`].

use std::path::{Path, PathBuf};

use fliper_core::hash::{self, ContentHash};
use fliper_core::{Channel, Color, FliperError, FliperResult, FrameBuffer, SourcePos, MAX_PIXELS};
use fliper_ir::{Instruction, InstructionKind, Located};
use serde::Serialize;

use crate::backend::ImageBackend;
use crate::block::Block;
use crate::compositor::CpuBackend;
use crate::scene::{Canvas, ObjectSnapshot, Scene};
use crate::transition::{scaled_size, AlphaStep, MoveStep, ObjectState, RotateStep, ScaleStep, Transition};

/// Frame rate used when nothing else is configured.
pub const DEFAULT_FPS: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directory that relative image paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Frame rate recorded on the result; the engine itself counts ticks.
    pub fps: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            fps: DEFAULT_FPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No canvas yet.
    Uninitialized,
    /// Canvas set, instructions run as they arrive.
    Ready,
    /// Inside a block, timed instructions are queued.
    Collecting,
}

/// Why a frame was emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FrameCause {
    Place { id: String },
    Transition { kind: &'static str, id: String, tick: u64, of: u64 },
    Block { tick: u64, of: u64 },
    Wait { tick: u64, of: u64 },
    Delete { id: String },
}

/// One entry of the render timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    /// Script line of the instruction that produced the frame.
    pub line: usize,
    #[serde(flatten)]
    pub cause: FrameCause,
    pub objects: Vec<ObjectSnapshot>,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// All rendered frames in order.
    pub frames: Vec<FrameBuffer>,
    /// What produced each frame.
    pub timeline: Vec<FrameRecord>,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl RenderResult {
    /// Hash of the whole frame sequence. Identical programs and inputs hash
    /// identically.
    pub fn content_hash(&self) -> ContentHash {
        hash::hash_frames(&self.frames)
    }

    /// Hash of a single frame by index.
    pub fn frame_hash(&self, index: usize) -> Option<ContentHash> {
        self.frames.get(index).map(hash::hash_frame)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames.len() as f64 / self.fps
        } else {
            0.0
        }
    }
}

pub struct Engine<B: ImageBackend = CpuBackend> {
    backend: B,
    options: EngineOptions,
    canvas: Option<Canvas>,
    scene: Scene,
    block: Option<Block>,
    frames: Vec<FrameBuffer>,
    timeline: Vec<FrameRecord>,
}

impl Engine<CpuBackend> {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_backend(CpuBackend::new(), options)
    }
}

impl<B: ImageBackend> Engine<B> {
    pub fn with_backend(backend: B, options: EngineOptions) -> Self {
        Self {
            backend,
            options,
            canvas: None,
            scene: Scene::new(),
            block: None,
            frames: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        match (&self.canvas, &self.block) {
            (None, _) => EngineState::Uninitialized,
            (Some(_), None) => EngineState::Ready,
            (Some(_), Some(_)) => EngineState::Collecting,
        }
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    pub fn timeline(&self) -> &[FrameRecord] {
        &self.timeline
    }

    /// Execute every instruction in order, stopping at the first error.
    pub fn run(&mut self, program: &[Instruction]) -> FliperResult<()> {
        for instruction in program {
            self.execute(instruction)?;
        }
        Ok(())
    }

    /// Close the run. A block still open at this point is an error.
    pub fn finish(self) -> FliperResult<RenderResult> {
        if let Some(block) = &self.block {
            return Err(FliperError::UnterminatedBlock {
                pos: block.opened_at(),
            });
        }
        let (width, height) = self.canvas.map(|c| (c.width, c.height)).unwrap_or((0, 0));
        tracing::info!(
            "Rendered {} frames at {}x{} ({} fps)",
            self.frames.len(),
            width,
            height,
            self.options.fps
        );
        Ok(RenderResult {
            frames: self.frames,
            timeline: self.timeline,
            width,
            height,
            fps: self.options.fps,
        })
    }

    pub fn execute(&mut self, instruction: &Instruction) -> FliperResult<()> {
        let pos = instruction.pos;
        let arg_pos = instruction.kind.first_arg_pos().unwrap_or(pos);
        tracing::debug!("{}", instruction);

        match &instruction.kind {
            InstructionKind::SetCanvas {
                width,
                height,
                background,
            } => self.set_canvas(width, height, background.as_ref()),

            InstructionKind::PlaceImage { path, id, position } => {
                self.require_canvas(arg_pos)?;
                if self.scene.contains(&id.value) {
                    return Err(FliperError::DuplicateId {
                        id: id.value.clone(),
                        pos: id.pos,
                    });
                }
                let image = self.load(path)?;
                tracing::debug!(
                    "Placed image {} ({}x{}) from {}",
                    id.value,
                    image.width,
                    image.height,
                    path.value
                );
                self.scene.insert(id.value.clone(), image, position.unwrap_or((0, 0)));
                self.emit(pos.line, FrameCause::Place { id: id.value.clone() });
                Ok(())
            }

            InstructionKind::Move { id, x, y, duration } => {
                self.require_canvas(arg_pos)?;
                let state = self.object(id)?;
                let duration = check_duration(duration)?;
                let step = MoveStep::new(state.position, (*x, *y), duration);
                self.schedule(pos, id, Transition::Move(step));
                Ok(())
            }

            InstructionKind::Rotate { id, degrees, duration } => {
                let canvas = self.require_canvas(arg_pos)?;
                self.object(id)?;
                let duration = check_duration(duration)?;
                let step = RotateStep::new(*degrees, duration, canvas.background);
                self.schedule(pos, id, Transition::Rotate(step));
                Ok(())
            }

            InstructionKind::SetOpacity { id, alpha, duration } => {
                self.require_canvas(arg_pos)?;
                let state = self.object(id)?;
                let target = Channel::Alpha.check(alpha.value).ok_or(FliperError::ColorOutOfRange {
                    channel: Channel::Alpha,
                    value: alpha.value,
                    pos: alpha.pos,
                })?;
                let duration = check_duration(duration)?;
                let step = AlphaStep::new(state.image.uniform_alpha(), target, duration);
                self.schedule(pos, id, Transition::Alpha(step));
                Ok(())
            }

            InstructionKind::Scale {
                id,
                factor_x,
                factor_y,
                duration,
            } => {
                self.require_canvas(arg_pos)?;
                let state = self.object(id)?;
                let duration = check_duration(duration)?;
                if !(*factor_x > 0.0 && *factor_y > 0.0) {
                    return Err(FliperError::InvalidScale {
                        factor_x: *factor_x,
                        factor_y: *factor_y,
                        pos,
                    });
                }
                let size = (state.image.width, state.image.height);
                if !ScaleStep::fits(size, *factor_x, *factor_y) {
                    let (width, height) = scaled_size(size, *factor_x, *factor_y);
                    return Err(FliperError::ImageTooLarge {
                        width,
                        height,
                        limit: MAX_PIXELS,
                        pos,
                    });
                }
                let step = ScaleStep::new(size, *factor_x, *factor_y, duration);
                self.schedule(pos, id, Transition::Scale(step));
                Ok(())
            }

            InstructionKind::Wait { duration } => {
                self.require_canvas(arg_pos)?;
                let duration = check_duration(duration)?;
                for tick in 1..=duration {
                    self.emit(pos.line, FrameCause::Wait { tick, of: duration });
                }
                Ok(())
            }

            InstructionKind::Delete { id } => {
                self.require_canvas(arg_pos)?;
                self.object(id)?;
                self.scene.remove(&id.value);
                self.emit(pos.line, FrameCause::Delete { id: id.value.clone() });
                Ok(())
            }

            InstructionKind::BlockBegin => {
                self.require_canvas(arg_pos)?;
                if self.block.is_some() {
                    return Err(FliperError::NestedBlock { pos });
                }
                self.block = Some(Block::new(pos));
                Ok(())
            }

            InstructionKind::BlockEnd => {
                self.require_canvas(arg_pos)?;
                let mut block = self
                    .block
                    .take()
                    .ok_or(FliperError::BlockEndWithoutBegin { pos })?;
                let ticks = block.max_duration();
                tracing::debug!(
                    "Replaying block from {} ({} transitions, {} ticks)",
                    block.opened_at(),
                    block.len(),
                    ticks
                );
                for tick in 1..=ticks {
                    block.tick(&mut self.scene, &self.backend)?;
                    self.emit(pos.line, FrameCause::Block { tick, of: ticks });
                }
                Ok(())
            }
        }
    }

    fn set_canvas(
        &mut self,
        width: &Located<i64>,
        height: &Located<i64>,
        background: Option<&[Located<i64>; 4]>,
    ) -> FliperResult<()> {
        if self.canvas.is_some() {
            return Err(FliperError::CanvasReadjust { pos: width.pos });
        }

        let invalid_size = || FliperError::InvalidCanvasSize {
            width: width.value,
            height: height.value,
            pos: width.pos,
        };
        let w = u32::try_from(width.value).ok().filter(|w| *w > 0).ok_or_else(invalid_size)?;
        let h = u32::try_from(height.value).ok().filter(|h| *h > 0).ok_or_else(invalid_size)?;
        if !FrameBuffer::fits(w as f64, h as f64) {
            return Err(FliperError::ImageTooLarge {
                width: w as f64,
                height: h as f64,
                limit: MAX_PIXELS,
                pos: width.pos,
            });
        }

        let background = match background {
            None => Color::WHITE,
            Some(channels) => {
                let values = channels.clone().map(|c| c.value);
                Color::from_channels(values).map_err(|(channel, value)| {
                    let at = Channel::ALL
                        .iter()
                        .position(|c| *c == channel)
                        .map(|i| channels[i].pos)
                        .unwrap_or(width.pos);
                    FliperError::ColorOutOfRange {
                        channel,
                        value,
                        pos: at,
                    }
                })?
            }
        };

        tracing::debug!("Canvas set to {}x{} ({})", w, h, background);
        self.canvas = Some(Canvas {
            width: w,
            height: h,
            background,
        });
        Ok(())
    }

    fn require_canvas(&self, pos: SourcePos) -> FliperResult<Canvas> {
        self.canvas.ok_or(FliperError::CanvasNotSet { pos })
    }

    fn object(&self, id: &Located<String>) -> FliperResult<ObjectState> {
        self.scene.state(&id.value).ok_or_else(|| FliperError::IdNotFound {
            id: id.value.clone(),
            pos: id.pos,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.options.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load(&self, path: &Located<String>) -> FliperResult<FrameBuffer> {
        let resolved = self.resolve(&path.value);
        self.backend
            .decode(&resolved)
            .map_err(|e| FliperError::image_path(e.to_string(), resolved, path.pos))
    }

    /// Queue the transition if a block is open, otherwise run it to
    /// completion, one frame per tick.
    fn schedule(&mut self, pos: SourcePos, id: &Located<String>, mut transition: Transition) {
        if let Some(block) = self.block.as_mut() {
            tracing::debug!("Queued {} on {} ({} ticks)", transition.name(), id.value, transition.duration());
            block.push(id.clone(), transition);
            return;
        }

        let of = transition.duration();
        for tick in 1..=of {
            if let Some(state) = self.scene.state(&id.value) {
                let next = transition.apply(&state, &self.backend);
                self.scene.update(&id.value, next);
            }
            self.emit(
                pos.line,
                FrameCause::Transition {
                    kind: transition.name(),
                    id: id.value.clone(),
                    tick,
                    of,
                },
            );
        }
    }

    fn emit(&mut self, line: usize, cause: FrameCause) {
        let Some(canvas) = self.canvas else {
            return;
        };
        let frame = self.scene.render(&canvas, &self.backend);
        self.timeline.push(FrameRecord {
            index: self.frames.len(),
            line,
            cause,
            objects: self.scene.snapshot(),
        });
        self.frames.push(frame);
    }
}

fn check_duration(duration: &Located<i64>) -> FliperResult<u64> {
    u64::try_from(duration.value)
        .ok()
        .filter(|d| *d > 0)
        .ok_or(FliperError::InvalidDuration {
            duration: duration.value,
            pos: duration.pos,
        })
}

/// Run a whole program on the CPU backend.
pub fn render_program(program: &[Instruction], options: EngineOptions) -> FliperResult<RenderResult> {
    let mut engine = Engine::new(options);
    engine.run(program)?;
    engine.finish()
}
