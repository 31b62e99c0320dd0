//! Annotation placement
//!
//! Resolves declarative anchors (`absolute=x,y,z` / `vertex=i`, joined with
//! `;`) against a model's vertex buffer and builds the matching visual
//! primitive: a sphere marker, a billboard label, or a cylinder connector
//! between two points.

use std::str::FromStr;

use glam::{Quat, Vec3};
use tracing::warn;

use modelview_core::{Color, Transform};

use crate::graph::{Material, Node};
use crate::primitives::{cylinder_mesh, sphere_mesh};

const MARKER_RADIUS: f32 = 0.5;
const CONNECTOR_RADIUS: f32 = 0.2;
const CONNECTOR_SEGMENTS: u32 = 20;

/// Errors in annotation declarations. The annotation is omitted; the model
/// stays intact.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("unknown annotation kind '{0}'")]
    UnknownKind(String),

    #[error("invalid anchor cardinality: {kind:?} takes {expected} point(s), got {got}")]
    InvalidAnchorCardinality {
        kind: AnnotationKind,
        expected: usize,
        got: usize,
    },

    #[error("invalid anchor part '{0}'")]
    InvalidAnchor(String),

    #[error("vertex index {index} out of range ({count} vertices)")]
    VertexOutOfRange { index: usize, count: usize },
}

/// What an annotation renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Sphere primitive at one point.
    Marker,
    /// Billboard text at one point.
    Label,
    /// Cylinder joining two points.
    Connector,
}

impl AnnotationKind {
    fn expected_points(self) -> usize {
        match self {
            AnnotationKind::Marker | AnnotationKind::Label => 1,
            AnnotationKind::Connector => 2,
        }
    }
}

impl FromStr for AnnotationKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marker" | "sphere" => Ok(AnnotationKind::Marker),
            "label" => Ok(AnnotationKind::Label),
            "connector" | "cylinder" => Ok(AnnotationKind::Connector),
            other => Err(AnnotationError::UnknownKind(other.to_string())),
        }
    }
}

/// A declared annotation, as handed over by the embedding layer.
#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    pub kind: AnnotationKind,
    /// Anchor declaration, e.g. `"vertex=12"` or `"absolute=0,1,0;vertex=3"`.
    pub anchor: String,
    pub color: Color,
    /// Label text; ignored by the other kinds.
    pub text: Option<String>,
}

/// Resolve an anchor declaration into world points, order preserved.
pub fn resolve_anchor(
    anchor: &str,
    positions: &[[f32; 3]],
) -> Result<Vec<Vec3>, AnnotationError> {
    let mut out = Vec::new();
    for part in anchor.split(';') {
        let (reference, value) = part
            .split_once('=')
            .ok_or_else(|| AnnotationError::InvalidAnchor(part.to_string()))?;
        match reference.trim() {
            "absolute" => {
                let mut coords = [0.0f32; 3];
                let mut items = value.split(',');
                for c in &mut coords {
                    let item = items
                        .next()
                        .ok_or_else(|| AnnotationError::InvalidAnchor(part.to_string()))?;
                    *c = item
                        .trim()
                        .parse()
                        .map_err(|_| AnnotationError::InvalidAnchor(part.to_string()))?;
                }
                if items.next().is_some() {
                    return Err(AnnotationError::InvalidAnchor(part.to_string()));
                }
                out.push(Vec3::from(coords));
            }
            "vertex" => {
                let index: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| AnnotationError::InvalidAnchor(part.to_string()))?;
                let position = positions.get(index).ok_or(
                    AnnotationError::VertexOutOfRange {
                        index,
                        count: positions.len(),
                    },
                )?;
                out.push(Vec3::from(*position));
            }
            _ => return Err(AnnotationError::InvalidAnchor(part.to_string())),
        }
    }
    Ok(out)
}

/// Resolve the anchor and build the annotation node, named `"annotation"`.
pub fn build_annotation(
    spec: &AnnotationSpec,
    positions: &[[f32; 3]],
) -> Result<Node, AnnotationError> {
    let points = resolve_anchor(&spec.anchor, positions)?;
    let expected = spec.kind.expected_points();

    match spec.kind {
        AnnotationKind::Marker | AnnotationKind::Label => {
            if points.is_empty() {
                return Err(AnnotationError::InvalidAnchorCardinality {
                    kind: spec.kind,
                    expected,
                    got: 0,
                });
            }
            if points.len() > 1 {
                // Observed behavior is ambiguous here; take the first point
                // but say so.
                warn!(
                    "{:?} annotation given {} anchor points, using the first",
                    spec.kind,
                    points.len()
                );
            }
            let point = points[0];
            let node = match spec.kind {
                AnnotationKind::Marker => Node::mesh(
                    "annotation",
                    sphere_mesh(MARKER_RADIUS, 16, 12),
                    Material {
                        color: spec.color,
                        ..Default::default()
                    },
                ),
                _ => Node::label(
                    "annotation",
                    spec.text.clone().unwrap_or_default(),
                    spec.color,
                ),
            };
            Ok(node.with_position(point))
        }
        AnnotationKind::Connector => {
            if points.len() != 2 {
                return Err(AnnotationError::InvalidAnchorCardinality {
                    kind: spec.kind,
                    expected,
                    got: points.len(),
                });
            }
            let (a, b) = (points[0], points[1]);
            let axis = b - a;
            let length = axis.length();
            // Rotate the cylinder's +Y onto the connector direction.
            let rotation = if length > 0.0 {
                Quat::from_rotation_arc(Vec3::Y, axis / length)
            } else {
                Quat::IDENTITY
            };
            let node = Node::mesh(
                "annotation",
                cylinder_mesh(CONNECTOR_RADIUS, length, CONNECTOR_SEGMENTS),
                Material {
                    color: spec.color,
                    ..Default::default()
                },
            )
            .with_transform(Transform {
                position: (a + b) * 0.5,
                rotation,
                scale: Vec3::ONE,
            });
            Ok(node)
        }
    }
}
