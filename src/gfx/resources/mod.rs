// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Depth targets, base-color textures and the bind groups shared across draws.

pub mod global_bindings;
pub mod texture_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig};
pub use texture_bindings::TextureBindings;
pub use texture_resource::TextureResource;
