//! Per-frame movement step
//!
//! One call to [`Walker::step`] runs the whole input → velocity → tentative
//! move → collision check sequence against whatever obstacles exist so far.

use std::time::{Duration, Instant};

use cgmath::Vector3;
use log::debug;

use super::{
    collision::{Aabb, CollisionGate},
    input::InputState,
    movement::{MotionState, MovementIntegrator},
};

/// Default upper bound on a single frame's elapsed time (seconds)
pub const DEFAULT_MAX_FRAME_DT: f32 = 0.1;

/// Something that can be walked around: a position with local forward/right axes
pub trait CameraRig {
    fn position(&self) -> Vector3<f32>;
    fn set_position(&mut self, position: Vector3<f32>);
    /// Moves along the horizontal forward axis
    fn move_forward(&mut self, distance: f32);
    /// Moves along the right axis
    fn move_right(&mut self, distance: f32);
}

/// Measures wall-clock time between frames
///
/// Elapsed time is clamped to `max_dt` so a stalled or minimized window does
/// not turn into one enormous step on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self { last: None, max_dt }
    }

    /// Seconds since the previous call; zero on the first call
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = match self.last.replace(now) {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.clamp(elapsed.as_secs_f32())
    }

    pub fn clamp(&self, dt: f32) -> f32 {
        if dt > self.max_dt {
            debug!("Clamping frame time {:.3}s to {:.3}s", dt, self.max_dt);
            self.max_dt
        } else {
            dt.max(0.0)
        }
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DT)
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Position the camera ends the frame at
    pub position: Vector3<f32>,
    /// Position the move would have reached without collision
    pub proposed: Vector3<f32>,
    /// Whether the proposed move was rejected
    pub blocked: bool,
}

/// Owns the motion state and runs the movement/collision step each frame
#[derive(Debug, Clone, Default)]
pub struct Walker {
    pub integrator: MovementIntegrator,
    pub gate: CollisionGate,
    motion: MotionState,
}

impl Walker {
    pub fn new(integrator: MovementIntegrator, gate: CollisionGate) -> Self {
        Self {
            integrator,
            gate,
            motion: MotionState::default(),
        }
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    /// Advances one frame. On collision the rig is put back where it started.
    pub fn step<'a, R, I>(
        &mut self,
        input: &InputState,
        rig: &mut R,
        obstacles: I,
        dt: f32,
    ) -> StepOutcome
    where
        R: CameraRig + ?Sized,
        I: IntoIterator<Item = &'a Aabb>,
    {
        let prev_position = rig.position();

        self.integrator.advance(input, &mut self.motion, dt);
        let displacement = self.motion.displacement(dt);
        rig.move_right(displacement.right);
        rig.move_forward(displacement.forward);

        let proposed = rig.position();
        let position = self
            .gate
            .check_and_resolve(prev_position, proposed, obstacles);
        let blocked = position != proposed;

        if blocked {
            debug!("Move to {:?} blocked, staying at {:?}", proposed, prev_position);
            rig.set_position(position);
        }

        StepOutcome {
            position,
            proposed,
            blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::world::{Obstacle, ObstacleKind, WorldState};
    use cgmath::{InnerSpace, Zero};

    /// Rig whose forward axis is +X and right axis is +Z
    struct TestRig {
        position: Vector3<f32>,
    }

    impl CameraRig for TestRig {
        fn position(&self) -> Vector3<f32> {
            self.position
        }

        fn set_position(&mut self, position: Vector3<f32>) {
            self.position = position;
        }

        fn move_forward(&mut self, distance: f32) {
            self.position.x += distance;
        }

        fn move_right(&mut self, distance: f32) {
            self.position.z += distance;
        }
    }

    fn forward() -> InputState {
        InputState {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_clock_clamps_long_frames() {
        let mut clock = FrameClock::new(0.1);
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);

        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);

        let dt = clock.tick_at(start + Duration::from_secs(30));
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn test_walks_freely_without_obstacles() {
        let mut walker = Walker::default();
        let mut rig = TestRig {
            position: Vector3::new(0.0, 1.0, 0.0),
        };
        let world = WorldState::new();

        for _ in 0..30 {
            let outcome = walker.step(&forward(), &mut rig, world.volumes(), 1.0 / 60.0);
            assert!(!outcome.blocked);
        }
        assert!(rig.position.x > 0.5);
        assert_eq!(rig.position.y, 1.0);
    }

    #[test]
    fn test_wall_stops_forward_walk() {
        let mut walker = Walker::default();
        let mut rig = TestRig {
            position: Vector3::new(0.0, 1.0, 0.0),
        };
        let mut world = WorldState::new();
        world.register_obstacle(Obstacle::new(
            "wall",
            ObstacleKind::Wall,
            Aabb::new(Vector3::new(6.0, 0.0, -10.0), Vector3::new(8.0, 4.0, 10.0)),
        ));

        let mut blocked_any = false;
        for _ in 0..600 {
            let outcome = walker.step(&forward(), &mut rig, world.volumes(), 1.0 / 60.0);
            blocked_any |= outcome.blocked;
            // Body half-width is 0.5, so the camera never gets past x = 5.5
            assert!(rig.position.x < 5.5);
        }
        assert!(blocked_any);
    }

    #[test]
    fn test_blocked_step_restores_exact_position() {
        let mut walker = Walker::default();
        let start = Vector3::new(0.0, 1.0, 0.0);
        let mut rig = TestRig { position: start };

        // Build up speed in open space, then drop a wall right in front
        for _ in 0..60 {
            walker.step(&forward(), &mut rig, std::iter::empty(), 1.0 / 60.0);
        }
        let before = rig.position;
        let near_wall = Aabb::new(
            Vector3::new(before.x + 0.55, 0.0, -10.0),
            Vector3::new(before.x + 2.0, 4.0, 10.0),
        );

        let outcome = walker.step(&forward(), &mut rig, [&near_wall], 1.0 / 60.0);
        assert!(outcome.blocked);
        assert_eq!(rig.position, before);
        assert_eq!(outcome.position, before);
        assert!(outcome.proposed.x > before.x);
    }

    #[test]
    fn test_velocity_settles_after_release() {
        let mut walker = Walker::default();
        let mut rig = TestRig {
            position: Vector3::zero(),
        };

        for _ in 0..60 {
            walker.step(&forward(), &mut rig, std::iter::empty(), 1.0 / 60.0);
        }
        for _ in 0..300 {
            walker.step(&InputState::default(), &mut rig, std::iter::empty(), 1.0 / 60.0);
        }

        assert!(walker.motion().velocity.magnitude() < 1e-6);
        let resting = rig.position;
        walker.step(&InputState::default(), &mut rig, std::iter::empty(), 1.0 / 60.0);
        assert!((rig.position - resting).magnitude() < 1e-6);
    }
}
