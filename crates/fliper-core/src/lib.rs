//! # fliper-core
//!
//! Core types and primitives for the Fliper animation engine.
//! This crate contains foundational types shared across all Fliper crates:
//! frame buffers, colors, source positions, configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;

pub use config::*;

pub use color::{Channel, Color};
pub use error::{FliperError, FliperResult, SourcePos};
pub use frame::{FrameBuffer, MAX_PIXELS};
