//! Procedural primitive meshes
//!
//! Small generators for the geometry the viewer creates itself: annotation
//! markers and connectors, and the gizmo's axis bars.

use std::f32::consts::PI;

use glam::Vec3;

use modelview_assets::MeshData;

/// Axis-aligned box centered at the origin.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);

    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Y, -Vec3::Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::Z, -Vec3::X),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::X, -Vec3::Y),
    ];
    let half = Vec3::new(hw, hh, hd);

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * half;
            positions.push(p.to_array());
            normals.push(normal.to_array());
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData {
        positions,
        normals: Some(normals),
        colors: None,
        indices: Some(indices),
    }
}

/// UV sphere centered at the origin.
pub fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> MeshData {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
            positions.push((normal * radius).to_array());
            normals.push(normal.to_array());
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    MeshData {
        positions,
        normals: Some(normals),
        colors: None,
        indices: Some(indices),
    }
}

/// Capped cylinder along the Y axis, centered at the origin.
pub fn cylinder_mesh(radius: f32, height: f32, segments: u32) -> MeshData {
    let half = height * 0.5;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    // Side wall
    for ring in 0..=1 {
        let y = half - ring as f32 * height;
        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
            positions.push([normal.x * radius, y, normal.z * radius]);
            normals.push(normal.to_array());
        }
    }
    for seg in 0..segments {
        let current = seg;
        let next = current + segments + 1;
        indices.extend([current, next, current + 1, current + 1, next, next + 1]);
    }

    // Caps, fanned around a center vertex
    for (y, normal) in [(half, Vec3::Y), (-half, -Vec3::Y)] {
        let center = positions.len() as u32;
        positions.push([0.0, y, 0.0]);
        normals.push(normal.to_array());
        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            positions.push([theta.cos() * radius, y, theta.sin() * radius]);
            normals.push(normal.to_array());
        }
        for seg in 0..segments {
            let a = center + 1 + seg;
            let b = center + 1 + seg + 1;
            if normal.y > 0.0 {
                indices.extend([center, b, a]);
            } else {
                indices.extend([center, a, b]);
            }
        }
    }

    MeshData {
        positions,
        normals: Some(normals),
        colors: None,
        indices: Some(indices),
    }
}
