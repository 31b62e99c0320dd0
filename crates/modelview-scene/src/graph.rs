//! Arena-based scene graph
//!
//! Nodes live in a slot arena addressed by generational handles; parent and
//! child links are handle pairs, so subtrees can be grafted and pruned
//! without back-reference cycles. Handles to removed nodes go stale and
//! every accessor reports them as absent.

use std::fmt;

use glam::{Mat4, Vec3};

use modelview_assets::MeshData;
use modelview_core::{Color, Transform};

/// A generational node handle. Compact u32 index + generation, incremented
/// on slot reuse.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// Surface appearance of a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    /// Modulate with the geometry's per-vertex colors.
    pub vertex_colors: bool,
    pub opacity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            vertex_colors: false,
            opacity: 1.0,
        }
    }
}

/// What a node contributes to the rendered scene.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: MeshData,
        material: Material,
    },
    Lines {
        segments: Vec<[Vec3; 2]>,
        color: Color,
    },
    /// Camera-facing disc with an optional text glyph, used by the gizmo.
    Sprite {
        color: Color,
        text: Option<String>,
        opacity: f32,
        size: f32,
    },
    /// 2D-anchored overlay text positioned by 3D-to-2D projection.
    Label { text: String, color: Color },
    AmbientLight { color: Color, intensity: f32 },
    DirectionalLight { color: Color, intensity: f32 },
    Grid {
        size: f32,
        divisions: u32,
        color: Color,
        /// Render over everything regardless of depth.
        always_on_top: bool,
    },
}

/// One scene node: a name, a local transform, a visibility flag, and a kind.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: MeshData, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn lines(name: impl Into<String>, segments: Vec<[Vec3; 2]>, color: Color) -> Self {
        Self::new(name, NodeKind::Lines { segments, color })
    }

    pub fn label(name: impl Into<String>, text: impl Into<String>, color: Color) -> Self {
        Self::new(
            name,
            NodeKind::Label {
                text: text.into(),
                color,
            },
        )
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The node arena. Always holds a root group node.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph whose root is a group with the given name.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        graph.root = graph.allocate(Node::group(root_name), None);
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn allocate(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let entry = Entry {
            node,
            parent,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).map(|e| &e.node)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entry_mut(id).map(|e| &mut e.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Insert a node under `parent`.
    ///
    /// # Panics
    /// Panics if `parent` is stale.
    pub fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        assert!(self.contains(parent), "stale parent handle");
        let id = self.allocate(node, Some(parent));
        self.entry_mut(parent)
            .expect("parent checked above")
            .children
            .push(id);
        id
    }

    /// Detach and free a node and all its descendants. Returns `false` for a
    /// stale handle or the root (the root cannot be removed).
    pub fn remove_subtree(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(entry) = self.entry_mut(parent) {
                entry.children.retain(|&c| c != id);
            }
        }
        self.free_recursive(id);
        true
    }

    fn free_recursive(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.free_recursive(child);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.entry = None;
        slot.generation += 1;
        self.free.push(id.index);
    }

    /// Graft a whole fragment graph under `parent`, remapping its handles
    /// into this arena. Returns the handle of the fragment's root.
    pub fn adopt(&mut self, parent: NodeId, fragment: &SceneGraph) -> NodeId {
        self.adopt_subtree(parent, fragment, fragment.root())
    }

    fn adopt_subtree(&mut self, parent: NodeId, src: &SceneGraph, id: NodeId) -> NodeId {
        let node = src.node(id).expect("fragment handle is live").clone();
        let new_id = self.insert(parent, node);
        for &child in src.children(id) {
            self.adopt_subtree(new_id, src, child);
        }
        new_id
    }

    /// Depth-first search for a node by name, starting at (and including)
    /// `start`.
    pub fn find_by_name(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(start)?;
        if node.name == name {
            return Some(start);
        }
        self.children(start)
            .iter()
            .find_map(|&child| self.find_by_name(child, name))
    }

    /// All nodes of a subtree in depth-first order, including `start`.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(start, &mut out);
        out
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if !self.contains(id) {
            return;
        }
        out.push(id);
        for &child in self.children(id) {
            self.collect(child, out);
        }
    }

    /// Node-to-world matrix, composed root-down.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let local = match self.node(id) {
            Some(node) => node.transform.matrix(),
            None => return Mat4::IDENTITY,
        };
        match self.parent(id) {
            Some(parent) => self.world_transform(parent) * local,
            None => local,
        }
    }

    /// Whether a node and all its ancestors are visible.
    pub fn visible_world(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.visible {
            return false;
        }
        match self.parent(id) {
            Some(parent) => self.visible_world(parent),
            None => true,
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        false // the root always exists
    }
}
