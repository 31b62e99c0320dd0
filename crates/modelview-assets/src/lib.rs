//! Modelview Assets - Mesh loading and the loader service
//!
//! Provides the raw asset model (single mesh or scene hierarchy), STL and
//! glTF 2.0 decoding, and the `AssetServer` that runs decodes off the frame
//! thread and delivers completions through a pollable channel.

mod error;
mod gltf_loader;
mod mesh;
mod server;
mod stl;

pub use error::AssetError;
pub use gltf_loader::decode_gltf;
pub use mesh::{MeshData, RawAsset, SceneDescription, SceneNode};
pub use server::{
    AssetServer, LoadCompletion, LoadId, LoadTicket, LoadToken, MeshDecoder, MeshFormat,
};
pub use stl::decode_stl;
