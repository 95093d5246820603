//! Per-tick transition steppers.
//!
//! A transition captures its source values when it is created and is then
//! driven one tick at a time. Intermediate ticks move `ceil(step * sign * i)`
//! away from the source; the final tick lands exactly on the target so
//! rounding never accumulates. Once `duration` ticks have run, further calls
//! hand the state back untouched.

use std::sync::Arc;

use fliper_core::{Color, FrameBuffer};

use crate::backend::{ImageBackend, ImageHandle};

/// What a transition reads and writes: one object's image and position.
#[derive(Debug, Clone)]
pub struct ObjectState {
    pub image: ImageHandle,
    pub position: (i64, i64),
}

/// Tick counter shared by every stepper. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    index: u64,
    duration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    /// An intermediate tick with its 1-based index.
    Step(u64),
    /// The final tick.
    Last,
    /// Past the end.
    Done,
}

impl Progress {
    pub fn new(duration: u64) -> Self {
        Self { index: 1, duration }
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Ticks applied so far.
    pub fn applied(&self) -> u64 {
        (self.index - 1).min(self.duration)
    }

    pub fn is_finished(&self) -> bool {
        self.index > self.duration
    }

    fn next(&mut self) -> Tick {
        if self.index > self.duration {
            return Tick::Done;
        }
        let tick = if self.index == self.duration {
            Tick::Last
        } else {
            Tick::Step(self.index)
        };
        self.index += 1;
        tick
    }
}

/// `start + ceil(step * sign * i)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    start: f64,
    step: f64,
    sign: f64,
}

impl Ramp {
    fn new(start: f64, distance: f64, toward: f64, duration: u64) -> Self {
        Self {
            start,
            step: distance / duration as f64,
            sign: if toward < start { -1.0 } else { 1.0 },
        }
    }

    fn at(&self, index: u64) -> f64 {
        self.start + (self.step * self.sign * index as f64).ceil()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveStep {
    target: (i64, i64),
    x: Ramp,
    y: Ramp,
    progress: Progress,
}

impl MoveStep {
    pub fn new(start: (i64, i64), target: (i64, i64), duration: u64) -> Self {
        Self {
            target,
            x: Ramp::new(start.0 as f64, axis_distance(start.0, target.0), target.0 as f64, duration),
            y: Ramp::new(start.1 as f64, axis_distance(start.1, target.1), target.1 as f64, duration),
            progress: Progress::new(duration),
        }
    }

    fn apply(&mut self, state: &ObjectState) -> ObjectState {
        let position = match self.progress.next() {
            Tick::Done => return state.clone(),
            Tick::Last => self.target,
            Tick::Step(i) => (self.x.at(i) as i64, self.y.at(i) as i64),
        };
        ObjectState {
            image: Arc::clone(&state.image),
            position,
        }
    }
}

/// Distance along one axis. When source and destination sit on opposite
/// sides of zero the path is measured through zero, `|s| + |d|`, which for
/// integers equals `|s - d|`.
fn axis_distance(source: i64, dest: i64) -> f64 {
    let (s, d) = (source as f64, dest as f64);
    if s.signum() * d.signum() >= 0.0 || source == 0 || dest == 0 {
        (s - d).abs()
    } else {
        s.abs() + d.abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateStep {
    degrees: f64,
    step: f64,
    fill: Color,
    progress: Progress,
}

impl RotateStep {
    pub fn new(degrees: f64, duration: u64, fill: Color) -> Self {
        Self {
            degrees,
            step: degrees / duration as f64,
            fill,
            progress: Progress::new(duration),
        }
    }

    /// Angle applied on the next tick, relative to the current image.
    fn next_angle(&mut self) -> Option<f64> {
        match self.progress.next() {
            Tick::Done => None,
            Tick::Step(_) => Some(self.step),
            Tick::Last => Some(self.degrees - (self.progress.duration - 1) as f64 * self.step),
        }
    }

    fn apply<B: ImageBackend + ?Sized>(&mut self, state: &ObjectState, backend: &B) -> ObjectState {
        match self.next_angle() {
            None => state.clone(),
            Some(angle) => ObjectState {
                image: Arc::new(backend.rotate(&state.image, angle, self.fill)),
                position: state.position,
            },
        }
    }
}

/// `(ceil(w * fx), ceil(h * fy))`, unclamped.
pub fn scaled_size(start: (u32, u32), factor_x: f64, factor_y: f64) -> (f64, f64) {
    (
        (start.0 as f64 * factor_x).ceil(),
        (start.1 as f64 * factor_y).ceil(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleStep {
    target: (u32, u32),
    width: Ramp,
    height: Ramp,
    progress: Progress,
}

impl ScaleStep {
    /// `start` is the image's size when the transition is created. The
    /// caller checks [`ScaleStep::fits`] first; sizes past `u32` saturate.
    pub fn new(start: (u32, u32), factor_x: f64, factor_y: f64, duration: u64) -> Self {
        let (tw, th) = scaled_size(start, factor_x, factor_y);
        let target = (tw as u32, th as u32);
        let (sw, sh) = (start.0 as f64, start.1 as f64);
        let (tw, th) = (target.0 as f64, target.1 as f64);
        Self {
            target,
            width: Ramp::new(sw, (tw - sw).abs(), tw, duration),
            height: Ramp::new(sh, (th - sh).abs(), th, duration),
            progress: Progress::new(duration),
        }
    }

    pub fn target(&self) -> (u32, u32) {
        self.target
    }

    /// Whether every intermediate size of this scale stays within the
    /// pixel budget. Widths and heights ramp independently, so the bound
    /// is the larger of start and target on each axis.
    pub fn fits(start: (u32, u32), factor_x: f64, factor_y: f64) -> bool {
        let (tw, th) = scaled_size(start, factor_x, factor_y);
        FrameBuffer::fits(tw.max(start.0 as f64), th.max(start.1 as f64))
    }

    fn next_size(&mut self) -> Option<(u32, u32)> {
        match self.progress.next() {
            Tick::Done => None,
            Tick::Last => Some(self.target),
            Tick::Step(i) => Some((self.width.at(i).max(0.0) as u32, self.height.at(i).max(0.0) as u32)),
        }
    }

    fn apply<B: ImageBackend + ?Sized>(&mut self, state: &ObjectState, backend: &B) -> ObjectState {
        match self.next_size() {
            None => state.clone(),
            Some((w, h)) => ObjectState {
                image: Arc::new(backend.resize(&state.image, w, h)),
                position: state.position,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlphaStep {
    target: u8,
    ramp: Ramp,
    progress: Progress,
}

impl AlphaStep {
    pub fn new(source: u8, target: u8, duration: u64) -> Self {
        let (s, t) = (source as f64, target as f64);
        Self {
            target,
            ramp: Ramp::new(s, (t - s).abs(), t, duration),
            progress: Progress::new(duration),
        }
    }

    fn next_alpha(&mut self) -> Option<u8> {
        match self.progress.next() {
            Tick::Done => None,
            Tick::Last => Some(self.target),
            Tick::Step(i) => Some(self.ramp.at(i).clamp(0.0, 255.0) as u8),
        }
    }

    fn apply<B: ImageBackend + ?Sized>(&mut self, state: &ObjectState, backend: &B) -> ObjectState {
        match self.next_alpha() {
            None => state.clone(),
            Some(alpha) => ObjectState {
                image: Arc::new(backend.replace_alpha(&state.image, alpha)),
                position: state.position,
            },
        }
    }
}

/// A timed change to one object, advanced once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Move(MoveStep),
    Rotate(RotateStep),
    Scale(ScaleStep),
    Alpha(AlphaStep),
}

impl Transition {
    /// Apply the next tick to `state`. Past the last tick this is a no-op.
    pub fn apply<B: ImageBackend + ?Sized>(&mut self, state: &ObjectState, backend: &B) -> ObjectState {
        match self {
            Transition::Move(t) => t.apply(state),
            Transition::Rotate(t) => t.apply(state, backend),
            Transition::Scale(t) => t.apply(state, backend),
            Transition::Alpha(t) => t.apply(state, backend),
        }
    }

    pub fn duration(&self) -> u64 {
        self.progress().duration()
    }

    pub fn is_finished(&self) -> bool {
        self.progress().is_finished()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Move(_) => "move",
            Transition::Rotate(_) => "rotate",
            Transition::Scale(_) => "scale",
            Transition::Alpha(_) => "opacity",
        }
    }

    fn progress(&self) -> &Progress {
        match self {
            Transition::Move(t) => &t.progress,
            Transition::Rotate(t) => &t.progress,
            Transition::Scale(t) => &t.progress,
            Transition::Alpha(t) => &t.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::CpuBackend;
    use fliper_core::FrameBuffer;

    fn state(w: u32, h: u32, position: (i64, i64)) -> ObjectState {
        ObjectState {
            image: Arc::new(FrameBuffer::solid(w, h, &Color::RED)),
            position,
        }
    }

    fn positions(mut t: Transition, start: (i64, i64), ticks: usize) -> Vec<(i64, i64)> {
        let backend = CpuBackend::new();
        let mut s = state(1, 1, start);
        let mut out = Vec::new();
        for _ in 0..ticks {
            s = t.apply(&s, &backend);
            out.push(s.position);
        }
        out
    }

    #[test]
    fn test_progress_sequence() {
        let mut p = Progress::new(3);
        assert_eq!(p.next(), Tick::Step(1));
        assert_eq!(p.next(), Tick::Step(2));
        assert_eq!(p.applied(), 2);
        assert_eq!(p.next(), Tick::Last);
        assert!(p.is_finished());
        assert_eq!(p.next(), Tick::Done);
        assert_eq!(p.applied(), 3);
    }

    #[test]
    fn test_move_two_ticks() {
        let t = Transition::Move(MoveStep::new((0, 0), (10, 0), 2));
        assert_eq!(positions(t, (0, 0), 2), vec![(5, 0), (10, 0)]);
    }

    #[test]
    fn test_move_uneven_steps_snap_to_target() {
        let t = Transition::Move(MoveStep::new((0, 0), (10, -7), 3));
        // step x = 10/3, step y = 7/3 (negative direction)
        assert_eq!(positions(t, (0, 0), 3), vec![(4, -2), (7, -4), (10, -7)]);
    }

    #[test]
    fn test_move_through_zero() {
        let t = Transition::Move(MoveStep::new((-4, 6), (4, -6), 2));
        assert_eq!(positions(t, (-4, 6), 2), vec![(0, 0), (4, -6)]);
    }

    #[test]
    fn test_move_idempotent_after_duration() {
        let t = Transition::Move(MoveStep::new((0, 0), (3, 3), 1));
        let out = positions(t, (0, 0), 4);
        assert_eq!(out, vec![(3, 3); 4]);
    }

    #[test]
    fn test_axis_distance() {
        assert_eq!(axis_distance(2, 9), 7.0);
        assert_eq!(axis_distance(-3, 5), 8.0);
        assert_eq!(axis_distance(0, -5), 5.0);
        assert_eq!(axis_distance(-2, -9), 7.0);
    }

    #[test]
    fn test_rotate_angles_sum_to_total() {
        let mut r = RotateStep::new(100.0, 3, Color::WHITE);
        let mut total = 0.0;
        while let Some(a) = r.next_angle() {
            total += a;
        }
        assert!((total - 100.0).abs() < 1e-9);
        assert!(r.next_angle().is_none());
    }

    #[test]
    fn test_rotate_keeps_size_and_position() {
        let backend = CpuBackend::new();
        let mut t = Transition::Rotate(RotateStep::new(90.0, 2, Color::WHITE));
        let s = t.apply(&state(4, 2, (3, 4)), &backend);
        assert_eq!((s.image.width, s.image.height), (4, 2));
        assert_eq!(s.position, (3, 4));
    }

    #[test]
    fn test_scale_sizes() {
        let mut s = ScaleStep::new((10, 10), 2.0, 0.5, 4);
        assert_eq!(s.target(), (20, 5));
        let sizes: Vec<_> = std::iter::from_fn(|| s.next_size()).collect();
        // width +2.5 per tick, height -1.25 per tick
        assert_eq!(sizes, vec![(13, 9), (15, 8), (18, 7), (20, 5)]);
    }

    #[test]
    fn test_scale_budget() {
        assert!(ScaleStep::fits((4, 4), 2048.0, 2048.0));
        assert!(!ScaleStep::fits((4, 4), 1e12, 1.0));
        // Shrinking one axis does not cover growth on the other.
        assert!(!ScaleStep::fits((8192, 8192), 2.0, 0.5));
        assert_eq!(scaled_size((3, 3), 1e12, 0.1), (3e12, 1.0));
    }

    #[test]
    fn test_scale_resizes_image() {
        let backend = CpuBackend::new();
        let mut t = Transition::Scale(ScaleStep::new((4, 4), 1.5, 1.5, 1));
        let s = t.apply(&state(4, 4, (0, 0)), &backend);
        assert_eq!((s.image.width, s.image.height), (6, 6));
        assert!(t.is_finished());
    }

    #[test]
    fn test_alpha_fade_out() {
        let mut a = AlphaStep::new(255, 0, 4);
        let values: Vec<_> = std::iter::from_fn(|| a.next_alpha()).collect();
        // step 63.75 downward: ceil(-63.75) = -63, ceil(-127.5) = -127, ...
        assert_eq!(values, vec![192, 128, 64, 0]);
    }

    #[test]
    fn test_alpha_applies_uniformly() {
        let backend = CpuBackend::new();
        let mut t = Transition::Alpha(AlphaStep::new(255, 100, 1));
        let s = t.apply(&state(3, 3, (0, 0)), &backend);
        assert!(s.image.data.chunks_exact(4).all(|p| p[3] == 100));
    }

    #[test]
    fn test_transition_metadata() {
        let t = Transition::Alpha(AlphaStep::new(0, 10, 7));
        assert_eq!(t.duration(), 7);
        assert_eq!(t.name(), "opacity");
        assert!(!t.is_finished());
    }
}
