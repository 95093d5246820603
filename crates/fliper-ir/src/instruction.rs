use std::fmt;

use fliper_core::SourcePos;

/// A value together with the position of the token it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub value: T,
    pub pos: SourcePos,
}

impl<T> Located<T> {
    pub fn new(value: T, pos: SourcePos) -> Self {
        Self { value, pos }
    }
}

/// One parsed script instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Position of the instruction keyword.
    pub pos: SourcePos,
}

impl Instruction {
    pub fn new(kind: InstructionKind, pos: SourcePos) -> Self {
        Self { kind, pos }
    }
}

/// The fixed set of instruction kinds. Numeric fields keep the raw script
/// integers; range checks belong to the engine so that they can report the
/// offending token.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    SetCanvas {
        width: Located<i64>,
        height: Located<i64>,
        /// Red, green, blue, alpha.
        background: Option<[Located<i64>; 4]>,
    },
    PlaceImage {
        path: Located<String>,
        id: Located<String>,
        position: Option<(i64, i64)>,
    },
    Move {
        id: Located<String>,
        x: i64,
        y: i64,
        duration: Located<i64>,
    },
    Rotate {
        id: Located<String>,
        degrees: f64,
        duration: Located<i64>,
    },
    SetOpacity {
        id: Located<String>,
        alpha: Located<i64>,
        duration: Located<i64>,
    },
    Scale {
        id: Located<String>,
        factor_x: f64,
        factor_y: f64,
        duration: Located<i64>,
    },
    Wait {
        duration: Located<i64>,
    },
    Delete {
        id: Located<String>,
    },
    BlockBegin,
    BlockEnd,
}

impl InstructionKind {
    /// The script keyword for this instruction.
    pub fn keyword(&self) -> &'static str {
        match self {
            InstructionKind::SetCanvas { .. } => "canvas",
            InstructionKind::PlaceImage { .. } => "image",
            InstructionKind::Move { .. } => "move",
            InstructionKind::Rotate { .. } => "rotate",
            InstructionKind::SetOpacity { .. } => "opacity",
            InstructionKind::Scale { .. } => "scale",
            InstructionKind::Wait { .. } => "wait",
            InstructionKind::Delete { .. } => "delete",
            InstructionKind::BlockBegin => "begin",
            InstructionKind::BlockEnd => "end",
        }
    }

    /// Position of the first argument token. Canvas errors point here;
    /// `begin` and `end` take no arguments.
    pub fn first_arg_pos(&self) -> Option<SourcePos> {
        match self {
            InstructionKind::SetCanvas { width, .. } => Some(width.pos),
            InstructionKind::PlaceImage { path, .. } => Some(path.pos),
            InstructionKind::Move { id, .. }
            | InstructionKind::Rotate { id, .. }
            | InstructionKind::SetOpacity { id, .. }
            | InstructionKind::Scale { id, .. }
            | InstructionKind::Delete { id } => Some(id.pos),
            InstructionKind::Wait { duration } => Some(duration.pos),
            InstructionKind::BlockBegin | InstructionKind::BlockEnd => None,
        }
    }

    /// The object id the instruction targets, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            InstructionKind::PlaceImage { id, .. }
            | InstructionKind::Move { id, .. }
            | InstructionKind::Rotate { id, .. }
            | InstructionKind::SetOpacity { id, .. }
            | InstructionKind::Scale { id, .. }
            | InstructionKind::Delete { id } => Some(&id.value),
            InstructionKind::SetCanvas { .. }
            | InstructionKind::Wait { .. }
            | InstructionKind::BlockBegin
            | InstructionKind::BlockEnd => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.keyword())?;
        if let Some(id) = self.kind.target() {
            write!(f, " \"{}\"", id)?;
        }
        write!(f, " @ {}", self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_arg_pos() {
        let id = Located::new("x".to_string(), SourcePos::new(1, 6));
        let d = Located::new(3, SourcePos::new(1, 12));
        let path = Located::new("a.png".to_string(), SourcePos::new(1, 7));

        let mv = InstructionKind::Move { id: id.clone(), x: 0, y: 0, duration: d.clone() };
        assert_eq!(mv.first_arg_pos(), Some(SourcePos::new(1, 6)));
        let place = InstructionKind::PlaceImage { path, id, position: None };
        assert_eq!(place.first_arg_pos(), Some(SourcePos::new(1, 7)));
        assert_eq!(InstructionKind::Wait { duration: d }.first_arg_pos(), Some(SourcePos::new(1, 12)));
        assert_eq!(InstructionKind::BlockBegin.first_arg_pos(), None);
    }

    #[test]
    fn test_display_includes_target_and_position() {
        let instr = Instruction::new(
            InstructionKind::Delete {
                id: Located::new("ball".to_string(), SourcePos::new(4, 8)),
            },
            SourcePos::new(4, 1),
        );
        assert_eq!(instr.to_string(), "delete \"ball\" @ 4:1");
    }

    #[test]
    fn test_block_markers_have_no_target() {
        assert_eq!(InstructionKind::BlockBegin.target(), None);
        assert_eq!(InstructionKind::BlockEnd.keyword(), "end");
    }
}
