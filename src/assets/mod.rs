//! # Assets
//!
//! Loading the room and car models off the main thread, and deriving their
//! world placement and collision volumes once each model's bounds are known.

pub mod loader;
pub mod model;
pub mod placement;

pub use loader::{AssetEvent, AssetLoader, AssetRequest, LoadProgress, LoadedAsset};
pub use model::{load_model, MeshData, ModelData};
pub use placement::{build_walls, fit_scale, Placement, RoomDimensions};
