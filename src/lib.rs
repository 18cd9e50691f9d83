// src/lib.rs
//! Showroom walkthrough
//!
//! A first-person walk through a car showroom, built on wgpu and winit.
//! Movement and collision live in [`walk`] and never touch the GPU; [`gfx`]
//! draws whatever [`assets`] has finished loading.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod ui;
pub mod walk;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ShowroomApp;
pub use config::WalkthroughConfig;
