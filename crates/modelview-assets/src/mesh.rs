//! Raw asset model shared by all decoders

use glam::{Mat3, Mat4, Vec3};

use modelview_core::{Aabb, Transform};

/// A loaded triangle mesh (renderer-agnostic). Raw vertex data as extracted
/// by a decoder, before any normalization.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// Per-vertex RGBA. Surface-scan formats carry a shared alpha which is
    /// baked into every entry.
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Axis-aligned bounding box over all vertex positions.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|p| Vec3::from(*p)))
    }

    /// Number of vertices in the position buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles, honoring the index buffer when present.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Bake a full node-to-world matrix into the vertex buffer. Normals go
    /// through the inverse-transpose so non-uniform scales keep them valid.
    pub fn apply_transform(&mut self, matrix: Mat4) {
        for p in &mut self.positions {
            *p = matrix.transform_point3(Vec3::from(*p)).to_array();
        }
        if let Some(normals) = &mut self.normals {
            let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
            for n in normals {
                *n = (normal_matrix * Vec3::from(*n)).normalize_or_zero().to_array();
            }
        }
    }

    /// Bake a uniform scale and translation into the vertex buffer, as
    /// `p' = scale * p + translation`. Normals are unaffected by uniform
    /// scaling and translation.
    pub fn bake_transform(&mut self, scale: f32, translation: Vec3) {
        for p in &mut self.positions {
            let v = Vec3::from(*p) * scale + translation;
            *p = v.to_array();
        }
    }
}

/// One node in a decoded scene hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshData>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            mesh: None,
            children: Vec::new(),
        }
    }
}

/// A decoded multi-mesh scene: named nodes, each optionally holding a mesh.
#[derive(Debug, Clone)]
pub struct SceneDescription {
    pub roots: Vec<SceneNode>,
}

impl SceneDescription {
    /// Count meshes across the whole hierarchy.
    pub fn mesh_count(&self) -> usize {
        fn count(node: &SceneNode) -> usize {
            node.mesh.is_some() as usize + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    /// Remove and return the only mesh in the scene, with its node's
    /// accumulated transform baked into the vertex data so an authored
    /// placement survives the collapse. `None` unless the scene holds
    /// exactly one mesh.
    pub fn take_single_mesh(mut self) -> Option<MeshData> {
        if self.mesh_count() != 1 {
            return None;
        }
        fn take(node: &mut SceneNode, parent: Mat4) -> Option<MeshData> {
            let world = parent * node.transform.matrix();
            if let Some(mut mesh) = node.mesh.take() {
                mesh.apply_transform(world);
                return Some(mesh);
            }
            node.children.iter_mut().find_map(|child| take(child, world))
        }
        self.roots
            .iter_mut()
            .find_map(|root| take(root, Mat4::IDENTITY))
    }
}

/// The output of a decoder: either a single surface mesh or a scene graph.
#[derive(Debug, Clone)]
pub enum RawAsset {
    SingleMesh(MeshData),
    MultiMeshScene(SceneDescription),
}

impl RawAsset {
    pub fn mesh_count(&self) -> usize {
        match self {
            RawAsset::SingleMesh(_) => 1,
            RawAsset::MultiMeshScene(scene) => scene.mesh_count(),
        }
    }
}
