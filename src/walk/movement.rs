//! Damped keyboard movement
//!
//! Each frame the horizontal velocity decays exponentially, then held keys
//! accelerate it along the normalized input direction. The result is turned
//! into a displacement along the camera's own right/forward axes, not world
//! axes.

use cgmath::{InnerSpace, Vector3, Zero};

use super::input::InputState;

/// Default horizontal velocity decay rate (per second)
pub const DEFAULT_DAMPING: f32 = 10.0;
/// Default acceleration applied while a key is held (units per second squared)
pub const DEFAULT_ACCELERATION: f32 = 100.0;

/// Velocity and input direction carried between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub velocity: Vector3<f32>,
    /// Unit length, or exactly zero when no direction is held
    pub direction: Vector3<f32>,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vector3::zero(),
            direction: Vector3::zero(),
        }
    }
}

impl MotionState {
    /// Camera-local displacement for this frame
    pub fn displacement(&self, dt: f32) -> LocalDisplacement {
        LocalDisplacement {
            right: -self.velocity.x * dt,
            forward: -self.velocity.z * dt,
        }
    }

    /// Horizontal speed in units per second
    pub fn speed(&self) -> f32 {
        Vector3::new(self.velocity.x, 0.0, self.velocity.z).magnitude()
    }
}

/// Distance to travel along the camera's right and forward axes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalDisplacement {
    pub right: f32,
    pub forward: f32,
}

/// Converts held keys and elapsed time into velocity
#[derive(Debug, Clone, Copy)]
pub struct MovementIntegrator {
    pub damping: f32,
    pub acceleration: f32,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            acceleration: DEFAULT_ACCELERATION,
        }
    }
}

impl MovementIntegrator {
    pub fn new(damping: f32, acceleration: f32) -> Self {
        Self {
            damping,
            acceleration,
        }
    }

    /// Advances `motion` by `dt` seconds and returns the new velocity and direction
    pub fn advance(
        &self,
        input: &InputState,
        motion: &mut MotionState,
        dt: f32,
    ) -> (Vector3<f32>, Vector3<f32>) {
        let v = &mut motion.velocity;
        v.x -= v.x * self.damping * dt;
        v.z -= v.z * self.damping * dt;

        let raw = Vector3::new(
            axis(input.right, input.left),
            0.0,
            axis(input.forward, input.backward),
        );
        motion.direction = normalize_or_zero(raw);

        if input.longitudinal() {
            motion.velocity.z -= motion.direction.z * self.acceleration * dt;
        }
        if input.lateral() {
            motion.velocity.x -= motion.direction.x * self.acceleration * dt;
        }

        (motion.velocity, motion.direction)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

/// Unit vector in the direction of `v`, or zero for a zero-length `v`
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let length = v.magnitude();
    if length > f32::EPSILON {
        v / length
    } else {
        Vector3::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;

    fn all_key_states() -> impl Iterator<Item = InputState> {
        (0u8..16).map(|bits| InputState {
            forward: bits & 1 != 0,
            backward: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
        })
    }

    #[test]
    fn test_direction_unit_or_zero_for_all_keys() {
        let integrator = MovementIntegrator::default();

        for input in all_key_states() {
            let mut motion = MotionState::default();
            let (velocity, direction) = integrator.advance(&input, &mut motion, DT);

            assert!(!direction.x.is_nan() && !direction.y.is_nan() && !direction.z.is_nan());
            assert!(!velocity.x.is_nan() && !velocity.z.is_nan());

            let length = direction.magnitude();
            assert!(
                length == 0.0 || (length - 1.0).abs() < 1e-6,
                "{:?} gave direction length {}",
                input,
                length
            );
        }
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let integrator = MovementIntegrator::default();
        let input = InputState {
            forward: true,
            backward: true,
            left: true,
            right: true,
        };
        let mut motion = MotionState::default();
        let (velocity, direction) = integrator.advance(&input, &mut motion, DT);

        assert_eq!(direction, Vector3::zero());
        assert_eq!(velocity, Vector3::zero());
    }

    #[test]
    fn test_forward_accelerates_negative_z() {
        let integrator = MovementIntegrator::default();
        let input = InputState {
            forward: true,
            ..Default::default()
        };
        let mut motion = MotionState::default();
        integrator.advance(&input, &mut motion, 0.01);

        assert!((motion.velocity.z - -1.0).abs() < 1e-6);
        assert_eq!(motion.velocity.x, 0.0);

        let step = motion.displacement(0.01);
        assert!(step.forward > 0.0);
        assert_eq!(step.right, 0.0);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let integrator = MovementIntegrator::default();
        let input = InputState {
            forward: true,
            right: true,
            ..Default::default()
        };
        let mut motion = MotionState::default();
        integrator.advance(&input, &mut motion, 0.01);

        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((motion.direction.x - expected).abs() < 1e-6);
        assert!((motion.direction.z - expected).abs() < 1e-6);
        assert!((motion.velocity.x - -expected).abs() < 1e-5);
        assert!((motion.velocity.z - -expected).abs() < 1e-5);
    }

    #[test]
    fn test_velocity_decays_without_input() {
        let mut rng = StdRng::seed_from_u64(3);
        let integrator = MovementIntegrator::default();
        let idle = InputState::default();

        for _ in 0..100 {
            let mut motion = MotionState {
                velocity: Vector3::new(
                    rng.random_range(-500.0..500.0),
                    0.0,
                    rng.random_range(-500.0..500.0),
                ),
                ..Default::default()
            };

            let mut previous = motion.speed();
            for _ in 0..10 {
                integrator.advance(&idle, &mut motion, DT);
                let speed = motion.speed();
                assert!(speed <= previous);
                previous = speed;
            }
        }
    }

    #[test]
    fn test_release_settles_within_bounded_frames() {
        let integrator = MovementIntegrator::default();
        let held = InputState {
            forward: true,
            left: true,
            ..Default::default()
        };
        let mut motion = MotionState::default();

        for _ in 0..120 {
            integrator.advance(&held, &mut motion, DT);
        }
        assert!(motion.speed() > 1.0);

        // Each frame multiplies velocity by (1 - 10/60); 300 frames is far past 1e-6
        let idle = InputState::default();
        for _ in 0..300 {
            integrator.advance(&idle, &mut motion, DT);
        }
        assert!(motion.speed() < 1e-6);
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vector3::zero()), Vector3::zero());
        let n = normalize_or_zero(Vector3::new(3.0, 0.0, 4.0));
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
    }
}
