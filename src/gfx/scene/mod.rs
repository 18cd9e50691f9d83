//! # Scene Management Module
//!
//! Drawable objects built from loaded models, and the camera they are viewed
//! through.
//!
//! - [`Scene`] - objects plus the [`CameraManager`](crate::gfx::camera::CameraManager)
//! - [`Object`] - meshes sharing a model matrix, with lazily created GPU buffers
//! - [`Vertex3D`] - interleaved position, normal and color

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
