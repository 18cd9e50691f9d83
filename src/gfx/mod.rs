//! # Graphics Module
//!
//! Camera, scene and wgpu rendering for the walkthrough.
//!
//! - **Camera** ([`camera`]) - first-person camera with pointer-lock mouse look
//! - **Rendering** ([`rendering`]) - surface, depth buffer and the scene pipeline
//! - **Scene** ([`scene`]) - loaded models with their placement transforms
//! - **Resources** ([`resources`]) - global uniforms and depth textures
//!
//! ```no_run
//! use showroom::gfx::{camera::FirstPersonCamera, scene::Scene};
//!
//! // The render engine is created by ShowroomApp once a window exists
//! // let render_engine = RenderEngine::new(window, width, height, options).await?;
//! ```

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::FirstPersonCamera;
pub use rendering::render_engine::RenderEngine;
