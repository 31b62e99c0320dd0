//! Modelview Scene - Scene graph and model composition
//!
//! Provides the arena-based scene graph, geometry normalization, wireframe
//! extraction, the model assembler that turns raw assets into display-ready
//! subtrees, and annotation placement.

pub mod annotation;
pub mod assemble;
pub mod graph;
pub mod normalize;
pub mod primitives;
pub mod wireframe;

pub use annotation::{build_annotation, resolve_anchor, AnnotationError, AnnotationKind, AnnotationSpec};
pub use assemble::{assemble, DisplayModel};
pub use graph::{Material, Node, NodeId, NodeKind, SceneGraph};
pub use normalize::{compute_transform, NormalizeTransform};
pub use primitives::{box_mesh, cylinder_mesh, sphere_mesh};
pub use wireframe::build_edges;
