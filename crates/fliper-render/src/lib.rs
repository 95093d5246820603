//! # fliper-render
//!
//! The Fliper animation engine. Executes an instruction stream against a
//! canvas and a scene of placed images and produces one composited frame per
//! tick. Image work goes through the [`ImageBackend`] trait; [`CpuBackend`]
//! is the default implementation.

pub mod backend;
pub mod block;
pub mod compositor;
pub mod engine;
pub mod image_loader;
pub mod scene;
pub mod transition;

pub use backend::{DecodeError, ImageBackend, ImageHandle, Layer};
pub use compositor::CpuBackend;
pub use engine::{
    render_program, Engine, EngineOptions, EngineState, FrameCause, FrameRecord, RenderResult, DEFAULT_FPS,
};
pub use scene::{Canvas, ObjectSnapshot, Scene};
pub use transition::{ObjectState, Transition};
