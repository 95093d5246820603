use fliper_core::SourcePos;

use crate::instruction::{Instruction, InstructionKind, Located};

/// A builder for constructing an instruction stream programmatically.
/// Useful for SDKs, generated animations, and unit testing.
///
/// Each instruction is placed on its own synthetic line (1-based, in push
/// order) at column 1, so errors still point somewhere meaningful.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_pos(&self) -> SourcePos {
        SourcePos::new(self.instructions.len() + 1, 1)
    }

    fn loc<T>(&self, value: T) -> Located<T> {
        Located::new(value, self.next_pos())
    }

    fn push(&mut self, kind: InstructionKind) -> &mut Self {
        let pos = self.next_pos();
        self.instructions.push(Instruction::new(kind, pos));
        self
    }

    /// `canvas <w> <h>` with the default background.
    pub fn canvas(&mut self, width: i64, height: i64) -> &mut Self {
        let kind = InstructionKind::SetCanvas {
            width: self.loc(width),
            height: self.loc(height),
            background: None,
        };
        self.push(kind)
    }

    /// `canvas <w> <h> <r> <g> <b> <a>`.
    pub fn canvas_rgba(&mut self, width: i64, height: i64, rgba: [i64; 4]) -> &mut Self {
        let kind = InstructionKind::SetCanvas {
            width: self.loc(width),
            height: self.loc(height),
            background: Some(rgba.map(|c| self.loc(c))),
        };
        self.push(kind)
    }

    /// `image "<path>" "<id>"` at the default position.
    pub fn image(&mut self, path: impl Into<String>, id: impl Into<String>) -> &mut Self {
        let kind = InstructionKind::PlaceImage {
            path: self.loc(path.into()),
            id: self.loc(id.into()),
            position: None,
        };
        self.push(kind)
    }

    /// `image "<path>" "<id>" <x> <y>`.
    pub fn image_at(
        &mut self,
        path: impl Into<String>,
        id: impl Into<String>,
        x: i64,
        y: i64,
    ) -> &mut Self {
        let kind = InstructionKind::PlaceImage {
            path: self.loc(path.into()),
            id: self.loc(id.into()),
            position: Some((x, y)),
        };
        self.push(kind)
    }

    pub fn move_to(&mut self, id: impl Into<String>, x: i64, y: i64, duration: i64) -> &mut Self {
        let kind = InstructionKind::Move {
            id: self.loc(id.into()),
            x,
            y,
            duration: self.loc(duration),
        };
        self.push(kind)
    }

    pub fn rotate(&mut self, id: impl Into<String>, degrees: f64, duration: i64) -> &mut Self {
        let kind = InstructionKind::Rotate {
            id: self.loc(id.into()),
            degrees,
            duration: self.loc(duration),
        };
        self.push(kind)
    }

    pub fn opacity(&mut self, id: impl Into<String>, alpha: i64, duration: i64) -> &mut Self {
        let kind = InstructionKind::SetOpacity {
            id: self.loc(id.into()),
            alpha: self.loc(alpha),
            duration: self.loc(duration),
        };
        self.push(kind)
    }

    pub fn scale(
        &mut self,
        id: impl Into<String>,
        factor_x: f64,
        factor_y: f64,
        duration: i64,
    ) -> &mut Self {
        let kind = InstructionKind::Scale {
            id: self.loc(id.into()),
            factor_x,
            factor_y,
            duration: self.loc(duration),
        };
        self.push(kind)
    }

    pub fn wait(&mut self, duration: i64) -> &mut Self {
        let kind = InstructionKind::Wait {
            duration: self.loc(duration),
        };
        self.push(kind)
    }

    pub fn delete(&mut self, id: impl Into<String>) -> &mut Self {
        let kind = InstructionKind::Delete {
            id: self.loc(id.into()),
        };
        self.push(kind)
    }

    pub fn begin(&mut self) -> &mut Self {
        self.push(InstructionKind::BlockBegin)
    }

    pub fn end(&mut self) -> &mut Self {
        self.push(InstructionKind::BlockEnd)
    }

    /// Build and return the instruction stream.
    pub fn build(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.instructions)
    }
}
