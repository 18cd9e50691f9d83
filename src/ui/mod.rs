//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the scene.
//!
//! - [`UiManager`] - ImGui context, winit input and wgpu rendering
//! - [`hud`] - the status overlay (pose, speed, obstacles, loading, FPS)

pub mod hud;
pub mod manager;

// Re-export main types
pub use hud::{render_hud, HudSnapshot};
pub use manager::UiManager;
