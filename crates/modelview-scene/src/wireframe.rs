//! Wireframe extraction
//!
//! Derives an edge-only line representation from a triangle mesh: an edge is
//! kept when the normals of its two adjacent faces differ by more than the
//! crease-angle threshold, or when only one triangle touches it (an open
//! boundary). Vertices are merged by rounded position first so watertight
//! meshes with duplicated vertices don't report false boundaries.

use std::collections::HashMap;

use glam::Vec3;

use modelview_assets::MeshData;

/// Positions closer than this merge into one adjacency vertex.
const MERGE_PRECISION: f32 = 1e-4;

/// Extract crease and boundary edges. `crease_angle_degrees` defaults to 5.0
/// at the configuration layer.
pub fn build_edges(mesh: &MeshData, crease_angle_degrees: f32) -> Vec<[Vec3; 2]> {
    let threshold_dot = crease_angle_degrees.to_radians().cos();

    let positions: Vec<Vec3> = mesh.positions.iter().map(|p| Vec3::from(*p)).collect();
    if positions.is_empty() {
        return Vec::new();
    }

    // Merge coincident vertices so adjacency sees shared edges.
    let mut merged: HashMap<[i64; 3], u32> = HashMap::new();
    let mut canonical = vec![0u32; positions.len()];
    for (i, p) in positions.iter().enumerate() {
        let key = [
            (p.x / MERGE_PRECISION).round() as i64,
            (p.y / MERGE_PRECISION).round() as i64,
            (p.z / MERGE_PRECISION).round() as i64,
        ];
        let next = merged.len() as u32;
        canonical[i] = *merged.entry(key).or_insert(next);
    }

    struct EdgeData {
        normal: Vec3,
        a: Vec3,
        b: Vec3,
        matched: bool,
        keep: bool,
    }

    let mut edges: HashMap<(u32, u32), EdgeData> = HashMap::new();

    let mut visit_triangle = |i0: usize, i1: usize, i2: usize| {
        let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
        let normal = (p1 - p0).cross(p2 - p0);
        if normal.length_squared() == 0.0 {
            return; // degenerate triangle contributes no adjacency
        }
        let normal = normal.normalize();

        let corners = [(i0, p0), (i1, p1), (i2, p2)];
        for e in 0..3 {
            let (ia, pa) = corners[e];
            let (ib, pb) = corners[(e + 1) % 3];
            let (ca, cb) = (canonical[ia], canonical[ib]);
            let key = if ca < cb { (ca, cb) } else { (cb, ca) };

            match edges.get_mut(&key) {
                Some(edge) => {
                    edge.matched = true;
                    // Crease test against the first face seen.
                    if edge.normal.dot(normal) <= threshold_dot {
                        edge.keep = true;
                    }
                }
                None => {
                    edges.insert(
                        key,
                        EdgeData {
                            normal,
                            a: pa,
                            b: pb,
                            matched: false,
                            keep: false,
                        },
                    );
                }
            }
        }
    };

    match &mesh.indices {
        Some(indices) => {
            for tri in indices.chunks_exact(3) {
                visit_triangle(tri[0] as usize, tri[1] as usize, tri[2] as usize);
            }
        }
        None => {
            for t in 0..positions.len() / 3 {
                visit_triangle(t * 3, t * 3 + 1, t * 3 + 2);
            }
        }
    }

    edges
        .into_values()
        .filter(|e| e.keep || !e.matched)
        .map(|e| [e.a, e.b])
        .collect()
}
