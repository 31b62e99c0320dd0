//! Orthographic viewing camera
//!
//! The frustum is sized so the view matches a perspective camera standing
//! 25 units away with a 45 degree vertical field of view. Half extents are
//! recomputed from the container aspect ratio on every resize.

use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

/// Distance the synthetic perspective camera would stand at.
pub const PERSPECTIVE_DISTANCE: f32 = 25.0;
/// Half of the synthetic vertical field of view, degrees.
pub const HALF_FOV_DEGREES: f32 = 22.5;

const NEAR: f32 = -2000.0;
const FAR: f32 = 2000.0;

/// An orthographic camera with an explicit up vector.
///
/// Orientation follows the right-handed convention: local `-Z` is forward,
/// so `rotation * Vec3::Z` points from the focus back toward the camera.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub position: Vec3,
    pub rotation: Quat,
    pub up: Vec3,
    /// Divides the frustum extents; larger means closer.
    pub zoom: f32,
    half_width: f32,
    half_height: f32,
    near: f32,
    far: f32,
}

impl OrthographicCamera {
    /// Frustum derived from the container aspect ratio.
    pub fn from_aspect(aspect: f32) -> Self {
        let mut camera = Self::with_extents(1.0, 1.0, NEAR, FAR);
        camera.set_aspect(aspect);
        camera
    }

    /// Fixed frustum, used by the gizmo inset.
    pub fn with_extents(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
            zoom: 1.0,
            half_width,
            half_height,
            near,
            far,
        }
    }

    /// Recompute the half extents for a new aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        let half_fov_v = HALF_FOV_DEGREES.to_radians();
        let half_fov_h = (aspect * half_fov_v.tan()).atan();
        self.half_width = PERSPECTIVE_DISTANCE * half_fov_h.tan();
        self.half_height = PERSPECTIVE_DISTANCE * half_fov_v.tan();
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// Point the camera at `focus`, keeping the current up vector.
    pub fn look_at(&mut self, focus: Vec3) {
        let forward = focus - self.position;
        if forward.length_squared() > 0.0 {
            self.rotation = look_rotation(forward.normalize(), self.up);
        }
    }

    /// World-space direction the camera looks along.
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// World-space direction from the scene back toward the camera.
    pub fn backward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let hw = self.half_width / self.zoom;
        let hh = self.half_height / self.zoom;
        Mat4::orthographic_rh(-hw, hw, -hh, hh, self.near, self.far)
    }

    /// Project a world point into normalized device coordinates.
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        let clip = self.projection_matrix() * self.view_matrix();
        clip.project_point3(point)
    }
}

/// Quaternion looking along `forward` with `up` as the vertical reference.
/// Falls back to a perpendicular reference when the two are parallel.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = -forward.normalize();
    let mut x = up.cross(z);
    if x.length_squared() < 1e-8 {
        x = if z.x.abs() < 0.9 { Vec3::X.cross(z) } else { Vec3::Y.cross(z) };
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Rotate `from` toward `to` by at most `max_angle` radians. Reaches `to`
/// exactly once the remaining angle is within `max_angle`.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle / angle)
}
