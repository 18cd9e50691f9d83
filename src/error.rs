//! Error types for asset loading and configuration

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or interpret a model file
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported model format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to load glTF {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model {path} contains no geometry")]
    Empty { path: PathBuf },

    #[error("failed to start loader thread for '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("loader thread for '{name}' stopped without reporting")]
    Disconnected { name: String },
}

/// Failure to read or parse the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {section} config: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}
