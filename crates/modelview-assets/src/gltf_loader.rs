//! glTF 2.0 decoding (.gltf and .glb)

use glam::{Quat, Vec3};
use tracing::debug;

use modelview_core::Transform;

use crate::error::AssetError;
use crate::mesh::{MeshData, SceneDescription, SceneNode};

/// Decode a glTF file into its scene hierarchy. Mesh primitives are merged
/// per node; node transforms are preserved.
pub fn decode_gltf(source: &str, bytes: &[u8]) -> Result<SceneDescription, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)
        .map_err(|e| AssetError::DecodeFailed(source.to_string(), e.to_string()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoRenderableMesh(source.to_string()))?;

    let roots = scene
        .nodes()
        .map(|node| convert_node(&node, &buffers))
        .collect::<Vec<_>>();

    let description = SceneDescription { roots };
    debug!(
        "glTF '{}': {} meshes across the scene",
        source,
        description.mesh_count()
    );

    Ok(description)
}

fn convert_node(node: &gltf::Node, buffers: &[gltf::buffer::Data]) -> SceneNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        position: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };

    let mesh = node.mesh().and_then(|mesh| read_mesh(&mesh, buffers));

    SceneNode {
        name: node.name().unwrap_or("unnamed").to_string(),
        transform,
        mesh,
        children: node
            .children()
            .map(|child| convert_node(&child, buffers))
            .collect(),
    }
}

/// Merge all primitives of a glTF mesh into one vertex/index buffer.
fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Option<MeshData> {
    let mut out = MeshData::default();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut colors: Vec<[f32; 4]> = Vec::new();
    let mut has_normals = true;
    let mut has_colors = true;
    let mut indices: Vec<u32> = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        if positions.is_empty() {
            continue;
        }
        let base = out.positions.len() as u32;

        match reader.read_normals() {
            Some(iter) if has_normals => normals.extend(iter),
            _ => has_normals = false,
        }

        match reader.read_colors(0) {
            Some(c) if has_colors => colors.extend(c.into_rgba_f32()),
            _ => has_colors = false,
        }

        // Unindexed primitives get the implicit sequence so primitives can
        // merge into one indexed buffer.
        match reader.read_indices() {
            Some(idx) => indices.extend(idx.into_u32().map(|i| i + base)),
            None => indices.extend(base..base + positions.len() as u32),
        }

        out.positions.extend(positions);
    }

    if out.positions.is_empty() {
        return None;
    }

    out.normals = has_normals.then_some(normals);
    out.colors = has_colors.then_some(colors);
    out.indices = Some(indices);
    Some(out)
}
