//! Orientation gizmo
//!
//! The axis inset at the container's bottom-right corner. Six billboard
//! handles sit on the unit axes inside a tiny private scene rendered through
//! a fixed orthographic camera. Clicking a handle animates the main camera
//! onto that axis at its current focus distance.

use glam::{Quat, Vec2, Vec3};

use modelview_core::Color;
use modelview_scene::{box_mesh, Material, Node, NodeId, NodeKind, SceneGraph};

use crate::backend::ViewportRect;
use crate::camera::{look_rotation, rotate_towards, OrthographicCamera};

/// Side length of the inset viewport, pixels.
pub const INSET_SIZE: f32 = 128.0;
/// Animation speed, radians per second.
pub const TURN_RATE: f32 = std::f32::consts::TAU;

const X_COLOR: u32 = 0xff3653;
const Y_COLOR: u32 = 0x8adb00;
const Z_COLOR: u32 = 0x2c8fff;

const DIM_OPACITY: f32 = 0.5;
const ANGLE_EPSILON: f32 = 1e-4;

/// One of the six clickable axis handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoHandle {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl GizmoHandle {
    pub const ALL: [GizmoHandle; 6] = [
        GizmoHandle::PosX,
        GizmoHandle::NegX,
        GizmoHandle::PosY,
        GizmoHandle::NegY,
        GizmoHandle::PosZ,
        GizmoHandle::NegZ,
    ];

    /// Canonical world direction the camera lands on.
    pub fn direction(self) -> Vec3 {
        match self {
            GizmoHandle::PosX => Vec3::X,
            GizmoHandle::NegX => -Vec3::X,
            GizmoHandle::PosY => Vec3::Y,
            GizmoHandle::NegY => -Vec3::Y,
            GizmoHandle::PosZ => Vec3::Z,
            GizmoHandle::NegZ => -Vec3::Z,
        }
    }

    /// Up vector the camera settles on. Looking down the vertical axis the
    /// usual Y-up reference is degenerate, so those two handles roll onto Z.
    pub fn target_up(self) -> Vec3 {
        match self {
            GizmoHandle::PosY => -Vec3::Z,
            GizmoHandle::NegY => Vec3::Z,
            _ => Vec3::Y,
        }
    }

    fn is_positive(self) -> bool {
        matches!(
            self,
            GizmoHandle::PosX | GizmoHandle::PosY | GizmoHandle::PosZ
        )
    }

    fn color(self) -> Color {
        match self {
            GizmoHandle::PosX | GizmoHandle::NegX => Color::from_hex(X_COLOR),
            GizmoHandle::PosY | GizmoHandle::NegY => Color::from_hex(Y_COLOR),
            GizmoHandle::PosZ | GizmoHandle::NegZ => Color::from_hex(Z_COLOR),
        }
    }

    fn label(self) -> Option<&'static str> {
        match self {
            GizmoHandle::PosX => Some("X"),
            GizmoHandle::PosY => Some("Y"),
            GizmoHandle::PosZ => Some("Z"),
            _ => None,
        }
    }

    /// Billboard side length; negative handles are drawn smaller.
    fn sprite_size(self) -> f32 {
        if self.is_positive() {
            1.0
        } else {
            0.8
        }
    }

    /// Component of a direction vector along this handle's axis.
    fn axis_component(self, v: Vec3) -> f32 {
        match self {
            GizmoHandle::PosX | GizmoHandle::NegX => v.x,
            GizmoHandle::PosY | GizmoHandle::NegY => v.y,
            GizmoHandle::PosZ | GizmoHandle::NegZ => v.z,
        }
    }
}

struct Animation {
    radius: f32,
    focus: Vec3,
    /// Rotation whose +Z, scaled by `radius`, is the camera offset from
    /// the focus. Steered toward `to_look` each frame.
    from_look: Quat,
    to_look: Quat,
    target_up: Vec3,
}

enum State {
    Idle,
    Animating(Animation),
}

/// The axis-handle inset and its camera-snap state machine.
pub struct OrientationGizmo {
    scene: SceneGraph,
    camera: OrthographicCamera,
    sprites: Vec<(GizmoHandle, NodeId)>,
    state: State,
}

impl OrientationGizmo {
    pub fn new() -> Self {
        let mut scene = SceneGraph::new("axis-helper");
        let root = scene.root();

        // Positive axes carry a colored bar from the origin.
        let bars = [
            (box_mesh(0.8, 0.05, 0.05), Vec3::X, X_COLOR),
            (box_mesh(0.05, 0.8, 0.05), Vec3::Y, Y_COLOR),
            (box_mesh(0.05, 0.05, 0.8), Vec3::Z, Z_COLOR),
        ];
        for (geometry, axis, color) in bars {
            scene.insert(
                root,
                Node::mesh(
                    "axis-bar",
                    geometry,
                    Material {
                        color: Color::from_hex(color),
                        ..Default::default()
                    },
                )
                .with_position(axis * 0.4),
            );
        }

        let mut sprites = Vec::with_capacity(6);
        for handle in GizmoHandle::ALL {
            let node = Node::new(
                "axis-handle",
                NodeKind::Sprite {
                    color: handle.color(),
                    text: handle.label().map(str::to_string),
                    opacity: 1.0,
                    size: handle.sprite_size(),
                },
            )
            .with_position(handle.direction());
            sprites.push((handle, scene.insert(root, node)));
        }

        // Fixed ortho camera looking down -Z at the handle cluster.
        let mut camera = OrthographicCamera::with_extents(2.0, 2.0, 0.0, 4.0);
        camera.position = Vec3::new(0.0, 0.0, 2.0);

        Self {
            scene,
            camera,
            sprites,
            state: State::Idle,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, State::Animating(_))
    }

    /// Inset rectangle pinned to the container's bottom-right corner.
    pub fn inset_rect(container: Vec2) -> ViewportRect {
        ViewportRect {
            x: container.x - INSET_SIZE,
            y: container.y - INSET_SIZE,
            width: INSET_SIZE,
            height: INSET_SIZE,
        }
    }

    /// Counter-rotate the cluster and dim the handles pointing away from
    /// the viewer. Called once per rendered frame.
    pub fn sync_to_camera(&mut self, main_rotation: Quat) {
        if let Some(root) = self.scene.node_mut(self.scene.root()) {
            root.transform.rotation = main_rotation.inverse();
        }
        let backward = main_rotation * Vec3::Z;
        for &(handle, id) in &self.sprites {
            let component = handle.axis_component(backward);
            let toward_viewer = if handle.is_positive() {
                component >= 0.0
            } else {
                component < 0.0
            };
            if let Some(node) = self.scene.node_mut(id) {
                if let NodeKind::Sprite { opacity, .. } = &mut node.kind {
                    *opacity = if toward_viewer { 1.0 } else { DIM_OPACITY };
                }
            }
        }
    }

    /// Map a pointer position to the handle under it, if any. Handles are
    /// billboards facing the inset camera, so the test is a square around
    /// each projected center; the handle nearest the camera wins.
    pub fn hit_test(&self, pointer: Vec2, container: Vec2) -> Option<GizmoHandle> {
        let rect = Self::inset_rect(container);
        if !rect.contains(pointer) {
            return None;
        }
        // Pixel coords inside the inset to the camera's view plane. Pixel y
        // grows downward, view y upward.
        let ndc_x = (pointer.x - rect.x) / INSET_SIZE * 2.0 - 1.0;
        let ndc_y = 1.0 - (pointer.y - rect.y) / INSET_SIZE * 2.0;
        let ray = Vec2::new(ndc_x * 2.0, ndc_y * 2.0);

        let orientation = self
            .scene
            .node(self.scene.root())
            .map(|root| root.transform.rotation)
            .unwrap_or(Quat::IDENTITY);

        let mut best: Option<(f32, GizmoHandle)> = None;
        for &(handle, _) in &self.sprites {
            let center = orientation * handle.direction();
            let half = handle.sprite_size() * 0.5;
            if (ray.x - center.x).abs() > half || (ray.y - center.y).abs() > half {
                continue;
            }
            // The ray travels down -Z, so the largest z is the nearest hit.
            if best.map_or(true, |(z, _)| center.z > z) {
                best = Some((center.z, handle));
            }
        }
        best.map(|(_, handle)| handle)
    }

    /// Begin snapping the camera onto a handle's axis. Ignored while an
    /// animation is already running or when the camera sits on the focus.
    pub fn start(&mut self, handle: GizmoHandle, camera: &OrthographicCamera, focus: Vec3) {
        if self.is_animating() {
            return;
        }
        let offset = camera.position - focus;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }
        let direction = handle.direction();
        let from_look = look_rotation(-offset / radius, camera.up);
        let to_look = look_rotation(-direction, handle.target_up());
        self.state = State::Animating(Animation {
            radius,
            focus,
            from_look,
            to_look,
            target_up: handle.target_up(),
        });
    }

    /// Advance the snap animation. Returns `true` while the camera moved;
    /// a call in `Idle` is a no-op.
    pub fn update(&mut self, dt: f32, camera: &mut OrthographicCamera) -> bool {
        let State::Animating(anim) = &mut self.state else {
            return false;
        };
        let step = dt * TURN_RATE;

        anim.from_look = rotate_towards(anim.from_look, anim.to_look, step);
        camera.position = anim.focus + anim.from_look * Vec3::Z * anim.radius;
        camera.rotation = rotate_towards(camera.rotation, anim.to_look, step);

        // The up vector closes its remaining gap at the same pace.
        let residual = anim.target_up - camera.up;
        let gap = residual.length();
        if gap > 1e-6 {
            let t = (step / gap).min(1.0);
            camera.up += residual * t;
        }

        let position_done = anim.from_look.angle_between(anim.to_look) <= ANGLE_EPSILON;
        let rotation_done = camera.rotation.angle_between(anim.to_look) <= ANGLE_EPSILON;
        if position_done && rotation_done {
            camera.position = anim.focus + anim.to_look * Vec3::Z * anim.radius;
            camera.rotation = anim.to_look;
            camera.up = anim.target_up;
            self.state = State::Idle;
        }
        true
    }
}

impl Default for OrientationGizmo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_on_z(radius: f32) -> OrthographicCamera {
        let mut camera = OrthographicCamera::from_aspect(1.0);
        camera.position = Vec3::new(0.0, 0.0, radius);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn run_to_idle(gizmo: &mut OrientationGizmo, camera: &mut OrthographicCamera) {
        for _ in 0..300 {
            gizmo.update(1.0 / 60.0, camera);
            if !gizmo.is_animating() {
                return;
            }
        }
        panic!("animation did not settle");
    }

    #[test]
    fn pos_y_click_lands_on_the_y_axis() {
        let mut camera = camera_on_z(10.0);
        let mut gizmo = OrientationGizmo::new();
        gizmo.start(GizmoHandle::PosY, &camera, Vec3::ZERO);
        assert!(gizmo.is_animating());
        run_to_idle(&mut gizmo, &mut camera);

        assert!((camera.position - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-3);
        assert!((camera.up - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-3);
        assert!((camera.forward() - -Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn focus_distance_is_preserved() {
        let mut camera = camera_on_z(7.0);
        camera.position = Vec3::new(3.0, 4.0, 5.0);
        camera.look_at(Vec3::ONE);
        let mut gizmo = OrientationGizmo::new();
        gizmo.start(GizmoHandle::NegX, &camera, Vec3::ONE);
        let radius = (Vec3::new(3.0, 4.0, 5.0) - Vec3::ONE).length();
        run_to_idle(&mut gizmo, &mut camera);
        assert!((camera.position - (Vec3::ONE - Vec3::X * radius)).length() < 1e-3);
    }

    #[test]
    fn angular_distance_decreases_monotonically() {
        let mut camera = camera_on_z(10.0);
        let mut gizmo = OrientationGizmo::new();
        gizmo.start(GizmoHandle::PosX, &camera, Vec3::ZERO);
        let target = look_rotation(-Vec3::X, Vec3::Y);
        let mut last = camera.rotation.angle_between(target);
        while gizmo.is_animating() {
            gizmo.update(1.0 / 120.0, &mut camera);
            let angle = camera.rotation.angle_between(target);
            assert!(angle <= last + 1e-5);
            last = angle;
        }
        assert!(last <= ANGLE_EPSILON);
    }

    #[test]
    fn update_in_idle_is_a_no_op() {
        let mut camera = camera_on_z(10.0);
        let before = camera.position;
        let mut gizmo = OrientationGizmo::new();
        assert!(!gizmo.update(0.1, &mut camera));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn start_is_ignored_while_animating() {
        let mut camera = camera_on_z(10.0);
        let mut gizmo = OrientationGizmo::new();
        gizmo.start(GizmoHandle::PosY, &camera, Vec3::ZERO);
        gizmo.start(GizmoHandle::NegZ, &camera, Vec3::ZERO);
        run_to_idle(&mut gizmo, &mut camera);
        // First click wins.
        assert!((camera.position - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn hit_test_finds_the_projected_handle() {
        let container = Vec2::new(800.0, 600.0);
        let mut gizmo = OrientationGizmo::new();
        // Identity main camera: cluster unrotated, camera looking down -Z.
        gizmo.sync_to_camera(Quat::IDENTITY);

        // +X sits at world (1,0,0) = view plane (1,0) = inset pixel x
        // offset (1/2+1/2)*128 within the inset.
        let rect = OrientationGizmo::inset_rect(container);
        let px = Vec2::new(rect.x + 0.75 * INSET_SIZE, rect.y + 0.5 * INSET_SIZE);
        assert_eq!(gizmo.hit_test(px, container), Some(GizmoHandle::PosX));

        // +Y projects upward, which is a smaller pixel y.
        let py = Vec2::new(rect.x + 0.5 * INSET_SIZE, rect.y + 0.25 * INSET_SIZE);
        assert_eq!(gizmo.hit_test(py, container), Some(GizmoHandle::PosY));

        // Outside the inset nothing hits.
        assert_eq!(gizmo.hit_test(Vec2::new(10.0, 10.0), container), None);
    }

    #[test]
    fn nearest_handle_wins_overlap() {
        let container = Vec2::new(800.0, 600.0);
        let mut gizmo = OrientationGizmo::new();
        gizmo.sync_to_camera(Quat::IDENTITY);
        // +Z projects to the inset center nearer the camera than -Z.
        let rect = OrientationGizmo::inset_rect(container);
        let center = Vec2::new(rect.x + 0.5 * INSET_SIZE, rect.y + 0.5 * INSET_SIZE);
        assert_eq!(gizmo.hit_test(center, container), Some(GizmoHandle::PosZ));
    }

    #[test]
    fn away_facing_handles_are_dimmed() {
        let mut gizmo = OrientationGizmo::new();
        // Camera on +Z: backward is +Z, so +Z is bright and -Z dimmed.
        gizmo.sync_to_camera(Quat::IDENTITY);
        let opacity = |gizmo: &OrientationGizmo, want: GizmoHandle| -> f32 {
            let &(_, id) = gizmo
                .sprites
                .iter()
                .find(|(handle, _)| *handle == want)
                .unwrap();
            match gizmo.scene.node(id).unwrap().kind {
                NodeKind::Sprite { opacity, .. } => opacity,
                _ => unreachable!(),
            }
        };
        assert_eq!(opacity(&gizmo, GizmoHandle::PosZ), 1.0);
        assert_eq!(opacity(&gizmo, GizmoHandle::NegZ), DIM_OPACITY);
        assert_eq!(opacity(&gizmo, GizmoHandle::PosX), 1.0);
    }
}
