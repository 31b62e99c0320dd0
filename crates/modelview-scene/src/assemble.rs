//! Model assembly
//!
//! Turns a decoded raw asset into a display-ready subtree: normalized
//! placement, `"main-mesh"` surface, one `"edges"` wireframe per mesh, and
//! optional `"annotation"` children. Single meshes get the normalization
//! baked into their vertex data; scenes carry it as the root node transform.

use tracing::debug;

use modelview_assets::{AssetError, MeshData, RawAsset, SceneDescription, SceneNode};
use modelview_core::{Aabb, Mat4, ModelConfig, Transform};

use crate::annotation::{build_annotation, AnnotationError, AnnotationSpec};
use crate::graph::{Material, Node, NodeId, NodeKind, SceneGraph};
use crate::normalize::compute_transform;
use crate::wireframe::build_edges;

/// The composed, render-ready representation of a loaded asset. Owns a
/// detached scene fragment rooted at a `"model"` group, ready to graft into
/// a viewport scene.
pub struct DisplayModel {
    graph: SceneGraph,
}

impl DisplayModel {
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    /// Vertex positions annotations resolve `vertex=` anchors against: the
    /// normalized main-mesh buffer. Empty for multi-mesh scenes, which have
    /// no single canonical buffer.
    pub fn vertex_positions(&self) -> &[[f32; 3]] {
        self.main_mesh_geometry()
            .map(|g| g.positions.as_slice())
            .unwrap_or(&[])
    }

    fn main_mesh_geometry(&self) -> Option<&MeshData> {
        let id = self.graph.find_by_name(self.graph.root(), "main-mesh")?;
        match &self.graph.node(id)?.kind {
            NodeKind::Mesh { geometry, .. } => Some(geometry),
            _ => None,
        }
    }

    /// Bounding box of the main mesh after normalization.
    pub fn main_mesh_aabb(&self) -> Aabb {
        let Some(id) = self.graph.find_by_name(self.graph.root(), "main-mesh") else {
            return Aabb::EMPTY;
        };
        let mut aabb = Aabb::EMPTY;
        for node_id in self.graph.descendants(id) {
            if let Some(Node {
                kind: NodeKind::Mesh { geometry, .. },
                ..
            }) = self.graph.node(node_id)
            {
                let local = geometry.aabb();
                aabb = aabb.union(&local.transformed(self.graph.world_transform(node_id)));
            }
        }
        aabb
    }

    /// Resolve and attach an annotation under the model root. On failure the
    /// annotation is omitted and the model is left untouched.
    pub fn attach_annotation(
        &mut self,
        spec: &AnnotationSpec,
    ) -> Result<NodeId, AnnotationError> {
        let node = build_annotation(spec, self.vertex_positions())?;
        let root = self.graph.root();
        Ok(self.graph.insert(root, node))
    }
}

/// Assemble a display model from a raw asset. `source` only labels errors.
pub fn assemble(
    source: &str,
    asset: RawAsset,
    config: &ModelConfig,
) -> Result<DisplayModel, AssetError> {
    match asset {
        RawAsset::SingleMesh(mesh) => Ok(assemble_single(mesh, config)),
        RawAsset::MultiMeshScene(scene) => assemble_scene(source, scene, config),
    }
}

fn face_material(mesh: &MeshData, config: &ModelConfig) -> Material {
    let mut material = Material {
        color: config.face_color,
        ..Default::default()
    };
    if let Some(colors) = &mesh.colors {
        material.vertex_colors = true;
        // Surface-scan colors share one alpha; it is baked per vertex.
        material.opacity = colors.first().map(|c| c[3]).unwrap_or(1.0);
    }
    material
}

fn assemble_single(mut mesh: MeshData, config: &ModelConfig) -> DisplayModel {
    let normalize = compute_transform(&mesh.aabb(), config.center, config.scale);
    mesh.bake_transform(normalize.scale, normalize.translation);

    let edges = build_edges(&mesh, config.wireframe_angle);
    let material = face_material(&mesh, config);

    let mut graph = SceneGraph::new("model");
    let root = graph.root();
    graph.insert(root, Node::mesh("main-mesh", mesh, material));
    graph.insert(root, Node::lines("edges", edges, config.edge_color));

    DisplayModel { graph }
}

fn assemble_scene(
    source: &str,
    scene: SceneDescription,
    config: &ModelConfig,
) -> Result<DisplayModel, AssetError> {
    if scene.mesh_count() == 0 {
        return Err(AssetError::NoRenderableMesh(source.to_string()));
    }

    let aabb = scene_aabb(&scene);
    let normalize = compute_transform(&aabb, config.center, config.scale);

    let mut graph = SceneGraph::new("model");
    let root = graph.root();
    // Scale first, then center: the translation is already post-scale.
    let scene_root = graph.insert(
        root,
        Node::group("main-mesh").with_transform(Transform::from_scale_translation(
            normalize.scale,
            normalize.translation,
        )),
    );
    for node in &scene.roots {
        insert_scene_node(&mut graph, scene_root, node, config);
    }

    // One wireframe per submesh, parented to that submesh's parent so it
    // positions correctly under the scene transform.
    let mut edges_to_add = Vec::new();
    for id in graph.descendants(scene_root) {
        if let Some(Node {
            kind: NodeKind::Mesh { geometry, .. },
            ..
        }) = graph.node(id)
        {
            let parent = graph.parent(id).unwrap_or(scene_root);
            edges_to_add.push((parent, build_edges(geometry, config.wireframe_angle)));
        }
    }
    let edge_count = edges_to_add.len();
    for (parent, segments) in edges_to_add {
        graph.insert(parent, Node::lines("edges", segments, config.edge_color));
    }

    debug!(
        "assembled scene '{}': {} submeshes, scale {}",
        source, edge_count, normalize.scale
    );

    Ok(DisplayModel { graph })
}

fn insert_scene_node(
    graph: &mut SceneGraph,
    parent: NodeId,
    node: &SceneNode,
    config: &ModelConfig,
) {
    let kind = match &node.mesh {
        Some(mesh) => NodeKind::Mesh {
            material: face_material(mesh, config),
            geometry: mesh.clone(),
        },
        None => NodeKind::Group,
    };
    let id = graph.insert(
        parent,
        Node::new(node.name.clone(), kind).with_transform(node.transform),
    );
    for child in &node.children {
        insert_scene_node(graph, id, child, config);
    }
}

/// Scene-wide bounding box: every submesh's box under its node transforms.
fn scene_aabb(scene: &SceneDescription) -> Aabb {
    fn visit(node: &SceneNode, parent: Mat4, aabb: &mut Aabb) {
        let world = parent * node.transform.matrix();
        if let Some(mesh) = &node.mesh {
            *aabb = aabb.union(&mesh.aabb().transformed(world));
        }
        for child in &node.children {
            visit(child, world, aabb);
        }
    }
    let mut aabb = Aabb::EMPTY;
    for root in &scene.roots {
        visit(root, Mat4::IDENTITY, &mut aabb);
    }
    aabb
}
