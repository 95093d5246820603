use fliper_core::{FliperError, FliperResult, SourcePos};
use fliper_ir::Located;

use crate::backend::ImageBackend;
use crate::scene::Scene;
use crate::transition::Transition;

/// A transition waiting for its block to close, with the id token it was
/// issued against.
#[derive(Debug, Clone)]
struct QueuedTransition {
    id: Located<String>,
    transition: Transition,
}

/// An open `begin` ... `end` group. Timed instructions collected here run
/// in lock-step once the block closes.
#[derive(Debug, Clone)]
pub struct Block {
    opened_at: SourcePos,
    max_duration: u64,
    queue: Vec<QueuedTransition>,
}

impl Block {
    pub fn new(opened_at: SourcePos) -> Self {
        Self {
            opened_at,
            max_duration: 0,
            queue: Vec::new(),
        }
    }

    /// Position of the `begin` that opened this block.
    pub fn opened_at(&self) -> SourcePos {
        self.opened_at
    }

    /// Number of ticks the block runs for when it closes.
    pub fn max_duration(&self) -> u64 {
        self.max_duration
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn push(&mut self, id: Located<String>, transition: Transition) {
        self.max_duration = self.max_duration.max(transition.duration());
        self.queue.push(QueuedTransition { id, transition });
    }

    /// Advance every queued transition by one tick, in queue order.
    /// Finished transitions still run (as no-ops) but their target must
    /// still exist.
    pub fn tick<B: ImageBackend + ?Sized>(&mut self, scene: &mut Scene, backend: &B) -> FliperResult<()> {
        for queued in &mut self.queue {
            let id = &queued.id;
            let state = scene.state(&id.value).ok_or_else(|| FliperError::IdNotFound {
                id: id.value.clone(),
                pos: id.pos,
            })?;
            let next = queued.transition.apply(&state, backend);
            scene.update(&id.value, next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::CpuBackend;
    use crate::transition::MoveStep;
    use fliper_core::{Color, FrameBuffer};

    fn at(line: usize, id: &str) -> Located<String> {
        Located::new(id.to_string(), SourcePos::new(line, 6))
    }

    #[test]
    fn test_push_tracks_max_duration() {
        let mut block = Block::new(SourcePos::new(1, 1));
        assert!(block.is_empty());
        block.push(at(2, "x"), Transition::Move(MoveStep::new((0, 0), (3, 0), 3)));
        block.push(at(3, "y"), Transition::Move(MoveStep::new((0, 0), (5, 0), 5)));
        block.push(at(4, "x"), Transition::Move(MoveStep::new((0, 0), (1, 0), 1)));
        assert_eq!(block.max_duration(), 5);
        assert_eq!(block.len(), 3);
        assert_eq!(block.opened_at(), SourcePos::new(1, 1));
    }

    #[test]
    fn test_tick_drives_all_in_order() {
        let backend = CpuBackend::new();
        let mut scene = Scene::new();
        scene.insert("x", FrameBuffer::solid(1, 1, &Color::RED), (0, 0));
        scene.insert("y", FrameBuffer::solid(1, 1, &Color::RED), (0, 0));

        let mut block = Block::new(SourcePos::new(1, 1));
        block.push(at(2, "x"), Transition::Move(MoveStep::new((0, 0), (5, 0), 2)));
        block.push(at(3, "y"), Transition::Move(MoveStep::new((0, 0), (0, 5), 4)));

        let mut seen = Vec::new();
        for _ in 0..block.max_duration() {
            block.tick(&mut scene, &backend).unwrap();
            seen.push((scene.get("x").unwrap().position, scene.get("y").unwrap().position));
        }
        assert_eq!(
            seen,
            vec![
                ((3, 0), (0, 2)),
                ((5, 0), (0, 3)),
                ((5, 0), (0, 4)),
                ((5, 0), (0, 5)),
            ]
        );
    }

    #[test]
    fn test_tick_reports_missing_target_at_queued_id() {
        let backend = CpuBackend::new();
        let mut scene = Scene::new();
        let mut block = Block::new(SourcePos::new(1, 1));
        block.push(at(7, "ghost"), Transition::Move(MoveStep::new((0, 0), (1, 1), 1)));

        let err = block.tick(&mut scene, &backend).unwrap_err();
        assert_eq!(err.pos(), Some(SourcePos::new(7, 6)));
        assert!(matches!(err, FliperError::IdNotFound { ref id, .. } if id == "ghost"));
    }
}
