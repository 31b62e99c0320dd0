use std::path::PathBuf;

/// Errors that can occur during asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported model format: '{0}' (expected .stl, .gltf or .glb)")]
    UnsupportedFormat(String),

    #[error("no renderable mesh found in '{0}'")]
    NoRenderableMesh(String),

    #[error("failed to decode '{0}': {1}")]
    DecodeFailed(String, String),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),
}
