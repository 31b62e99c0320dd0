//! Orbit controls
//!
//! Rotate, pan and zoom around a focus point. Pointer deltas arrive in
//! container pixels; the host's input layer decides which buttons map to
//! which gesture.

use glam::{Quat, Vec2, Vec3};

use crate::camera::OrthographicCamera;

const ROTATE_SPEED: f32 = 0.01;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 50.0;

struct Pose {
    position: Vec3,
    up: Vec3,
    zoom: f32,
    focus: Vec3,
}

/// Orbit-style camera controls around a movable focus point.
pub struct OrbitControls {
    focus: Vec3,
    initial: Pose,
}

impl OrbitControls {
    /// Capture the camera's current pose as the reset target.
    pub fn new(camera: &OrthographicCamera, focus: Vec3) -> Self {
        Self {
            focus,
            initial: Pose {
                position: camera.position,
                up: camera.up,
                zoom: camera.zoom,
                focus,
            },
        }
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus = focus;
    }

    /// Orbit the camera around the focus. `delta` is in pixels; horizontal
    /// motion spins around the up axis, vertical motion tilts around the
    /// camera's right axis.
    pub fn rotate(&mut self, camera: &mut OrthographicCamera, delta: Vec2) {
        let yaw = Quat::from_axis_angle(camera.up, -delta.x * ROTATE_SPEED);
        let pitch = Quat::from_axis_angle(camera.right(), -delta.y * ROTATE_SPEED);
        let spin = yaw * pitch;
        let offset = camera.position - self.focus;
        camera.position = self.focus + spin * offset;
        camera.up = (spin * camera.up).normalize();
        camera.look_at(self.focus);
    }

    /// Slide camera and focus together in the view plane. `delta` is in
    /// pixels; `viewport_height` converts it to world units at current zoom.
    pub fn pan(&mut self, camera: &mut OrthographicCamera, delta: Vec2, viewport_height: f32) {
        let world_per_pixel = (camera.half_extents().y * 2.0) / (camera.zoom * viewport_height);
        let shift =
            camera.right() * (-delta.x * world_per_pixel) + camera.up * (delta.y * world_per_pixel);
        camera.position += shift;
        self.focus += shift;
    }

    /// Multiply the zoom factor, clamped to a sane range.
    pub fn zoom(&mut self, camera: &mut OrthographicCamera, factor: f32) {
        camera.zoom = (camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Restore the pose captured at construction.
    pub fn reset(&mut self, camera: &mut OrthographicCamera) {
        camera.position = self.initial.position;
        camera.up = self.initial.up;
        camera.zoom = self.initial.zoom;
        self.focus = self.initial.focus;
        camera.look_at(self.focus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> OrthographicCamera {
        let mut camera = OrthographicCamera::from_aspect(1.0);
        camera.position = position;
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn rotate_keeps_focus_distance() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(&camera, Vec3::ZERO);
        controls.rotate(&mut camera, Vec2::new(40.0, 25.0));
        assert!((camera.position.length() - 10.0).abs() < 1e-4);
        // Still looking at the focus.
        let toward = (Vec3::ZERO - camera.position).normalize();
        assert!((camera.forward() - toward).length() < 1e-4);
    }

    #[test]
    fn pan_moves_camera_and_focus_in_lockstep() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(&camera, Vec3::ZERO);
        let before = camera.position;
        controls.pan(&mut camera, Vec2::new(100.0, 0.0), 600.0);
        let shift = camera.position - before;
        assert!(shift.length() > 0.0);
        assert!((controls.focus() - shift).length() < 1e-5);
    }

    #[test]
    fn zoom_clamps() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(&camera, Vec3::ZERO);
        controls.zoom(&mut camera, 1e6);
        assert_eq!(camera.zoom, MAX_ZOOM);
        controls.zoom(&mut camera, 1e-9);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(&camera, Vec3::ZERO);
        controls.rotate(&mut camera, Vec2::new(50.0, 50.0));
        controls.pan(&mut camera, Vec2::new(30.0, 30.0), 600.0);
        controls.zoom(&mut camera, 3.0);
        controls.reset(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert_eq!(camera.zoom, 1.0);
        assert_eq!(controls.focus(), Vec3::ZERO);
    }
}
