//! # fliper-ir
//!
//! The Fliper instruction stream: an ordered list of typed, source-located
//! instructions. The script parser produces it; the engine consumes it.
//! Programs can also be built directly with [`ProgramBuilder`].

pub mod builder;
pub mod instruction;

pub use builder::ProgramBuilder;
pub use instruction::{Instruction, InstructionKind, Located};
