//! # Walkthrough Core
//!
//! Keyboard movement and collision for a first-person camera.
//!
//! Per frame, data flows one way:
//!
//! [`input::InputTracker`] → [`movement::MovementIntegrator`] →
//! [`collision::CollisionGate`] → camera pose
//!
//! [`frame::Walker`] strings these together and [`world::WorldState`] holds the
//! obstacles registered so far. None of this touches the GPU, so it is all
//! testable headless.

pub mod collision;
pub mod frame;
pub mod input;
pub mod movement;
pub mod world;

// Re-export main types
pub use collision::{Aabb, CollisionGate};
pub use frame::{CameraRig, FrameClock, StepOutcome, Walker};
pub use input::{InputState, InputTracker, KeyBindings, MoveAction};
pub use movement::{LocalDisplacement, MotionState, MovementIntegrator};
pub use world::{Obstacle, ObstacleKind, WorldState};
