//! Main viewport
//!
//! Owns the scene arena, the orthographic camera, orbit controls, lighting,
//! grids, the gizmo inset and the message center, and drives the dirty-flag
//! frame loop. Everything GPU-facing goes through the [`RenderBackend`].

use glam::{Vec2, Vec3};
use tracing::debug;

use modelview_core::{Color, ViewerConfig};
use modelview_scene::{DisplayModel, Node, NodeId, NodeKind, SceneGraph};

use crate::backend::{RenderBackend, ScreenLabel, ViewportRect};
use crate::camera::{OrthographicCamera, PERSPECTIVE_DISTANCE};
use crate::controls::OrbitControls;
use crate::gizmo::OrientationGizmo;
use crate::messages::MessageCenter;

const AMBIENT_COLOR: u32 = 0x404040;
const AMBIENT_INTENSITY: f32 = 0.3;
const HEADLIGHT_INTENSITY: f32 = 0.6;

const GRID_SIZE: f32 = 30.0;
const GRID_FINE_DIVISIONS: u32 = 30;
const GRID_COARSE_DIVISIONS: u32 = 6;
const GRID_FINE_COLOR: u32 = 0x888888;
const GRID_COARSE_COLOR: u32 = 0x222222;

/// Which axis the directional headlight shines along, cycled by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LightMode {
    Z,
    X,
    Y,
    Off,
}

impl LightMode {
    fn next(self) -> Self {
        match self {
            LightMode::Z => LightMode::X,
            LightMode::X => LightMode::Y,
            LightMode::Y => LightMode::Off,
            LightMode::Off => LightMode::Z,
        }
    }

    fn offset(self) -> Option<Vec3> {
        match self {
            LightMode::Z => Some(Vec3::Z),
            LightMode::X => Some(Vec3::X),
            LightMode::Y => Some(Vec3::Y),
            LightMode::Off => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LightMode::Z => "Light: z",
            LightMode::X => "Light: x",
            LightMode::Y => "Light: y",
            LightMode::Off => "Light: off",
        }
    }
}

/// The embeddable viewer core: scene, camera, controls, gizmo, frame loop.
pub struct Viewport {
    config: ViewerConfig,
    scene: SceneGraph,
    camera: OrthographicCamera,
    controls: OrbitControls,
    gizmo: OrientationGizmo,
    messages: MessageCenter,
    container: Vec2,
    dirty: bool,
    /// Group node mirroring the camera pose; the headlight hangs off it.
    camera_node: NodeId,
    headlight: NodeId,
    ambient: NodeId,
    light_mode: LightMode,
}

impl Viewport {
    pub fn new(config: ViewerConfig, container: Vec2) -> Self {
        let mut camera = OrthographicCamera::from_aspect(container.x / container.y);
        camera.position = config.camera_position * PERSPECTIVE_DISTANCE;
        camera.zoom = config.camera_zoom;
        if config.camera_up.length_squared() > 0.0 {
            camera.up = config.camera_up.normalize();
        }
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::new(&camera, Vec3::ZERO);

        let mut scene = SceneGraph::new("scene");
        let root = scene.root();

        let ambient = scene.insert(
            root,
            Node::new(
                "ambient",
                NodeKind::AmbientLight {
                    color: Color::from_hex(AMBIENT_COLOR),
                    intensity: AMBIENT_INTENSITY,
                },
            ),
        );

        let camera_node = scene.insert(root, Node::group("camera"));
        let headlight = scene.insert(
            camera_node,
            Node::new(
                "headlight",
                NodeKind::DirectionalLight {
                    color: Color::WHITE,
                    intensity: HEADLIGHT_INTENSITY,
                },
            )
            .with_position(Vec3::Z),
        );

        for (name, divisions, color, always_on_top) in [
            ("grid", GRID_FINE_DIVISIONS, GRID_FINE_COLOR, false),
            ("grid-coarse", GRID_COARSE_DIVISIONS, GRID_COARSE_COLOR, true),
        ] {
            let mut node = Node::new(
                name,
                NodeKind::Grid {
                    size: GRID_SIZE,
                    divisions,
                    color: Color::from_hex(color),
                    always_on_top,
                },
            );
            node.visible = config.grid;
            scene.insert(root, node);
        }

        Self {
            config,
            scene,
            camera,
            controls,
            gizmo: OrientationGizmo::new(),
            messages: MessageCenter::new(),
            container,
            dirty: true,
            camera_node,
            headlight,
            ambient,
            light_mode: LightMode::Z,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene access for post-creation tweaks (label text, colors).
    /// Any access is assumed to change something visible.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        self.dirty = true;
        &mut self.scene
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn current_message(&self) -> Option<&str> {
        self.messages.current()
    }

    pub fn post_message(&mut self, text: impl Into<String>) {
        self.messages.post(text);
        self.dirty = true;
    }

    /// Graft an assembled model into the scene. Returns the handle used to
    /// remove it again.
    pub fn add_content(&mut self, model: &DisplayModel) -> NodeId {
        let id = self.scene.adopt(self.scene.root(), model.graph());
        debug!(nodes = self.scene.len(), "content added");
        self.dirty = true;
        id
    }

    /// Prune previously added content. `false` for stale handles.
    pub fn remove_content(&mut self, id: NodeId) -> bool {
        let removed = self.scene.remove_subtree(id);
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn rotate(&mut self, delta: Vec2) {
        if !self.config.controls {
            return;
        }
        self.controls.rotate(&mut self.camera, delta);
        self.dirty = true;
    }

    pub fn pan(&mut self, delta: Vec2) {
        if !self.config.controls {
            return;
        }
        self.controls.pan(&mut self.camera, delta, self.container.y);
        self.dirty = true;
    }

    pub fn zoom(&mut self, factor: f32) {
        if !self.config.controls {
            return;
        }
        self.controls.zoom(&mut self.camera, factor);
        self.dirty = true;
    }

    /// Restore the initial camera pose.
    pub fn reset_view(&mut self) {
        self.controls.reset(&mut self.camera);
        self.messages.post("Reset view");
        self.dirty = true;
    }

    /// Pointer release in container pixels. Returns `true` when the event
    /// landed on a gizmo handle.
    pub fn pointer_up(&mut self, position: Vec2) -> bool {
        if !self.config.axis_helper {
            return false;
        }
        let Some(handle) = self.gizmo.hit_test(position, self.container) else {
            return false;
        };
        self.gizmo.start(handle, &self.camera, self.controls.focus());
        self.dirty = true;
        true
    }

    /// New container size in pixels; recomputes the frustum.
    pub fn resize(&mut self, container: Vec2) {
        self.container = container;
        self.camera.set_aspect(container.x / container.y);
        self.dirty = true;
    }

    /// Walk the headlight through z, x, y, off.
    pub fn cycle_light(&mut self) {
        self.light_mode = self.light_mode.next();
        if let Some(node) = self.scene.node_mut(self.headlight) {
            match self.light_mode.offset() {
                Some(offset) => {
                    node.visible = true;
                    node.transform.position = offset;
                }
                None => node.visible = false,
            }
        }
        self.messages.post(self.light_mode.label());
        self.dirty = true;
    }

    pub fn toggle_ambient(&mut self) {
        let on = if let Some(node) = self.scene.node_mut(self.ambient) {
            node.visible = !node.visible;
            node.visible
        } else {
            false
        };
        self.messages
            .post(if on { "Ambient light on" } else { "Ambient light off" });
        self.dirty = true;
    }

    /// Advance one frame. Renders only when something changed; returns
    /// whether a render happened.
    pub fn advance(&mut self, dt: f32, backend: &mut dyn RenderBackend) -> bool {
        if self.messages.tick(dt) {
            self.dirty = true;
        }
        if self.gizmo.update(dt, &mut self.camera) {
            self.dirty = true;
        }
        if !self.dirty {
            return false;
        }

        // Keep the headlight riding along with the camera.
        if let Some(node) = self.scene.node_mut(self.camera_node) {
            node.transform.position = self.camera.position;
            node.transform.rotation = self.camera.rotation;
        }

        backend.set_viewport(ViewportRect::full(self.container));
        backend.render(&self.scene, &self.camera);

        let labels = self.project_labels();
        backend.draw_labels(&labels);

        if self.config.axis_helper {
            backend.set_viewport(OrientationGizmo::inset_rect(self.container));
            backend.clear_depth();
            self.gizmo.sync_to_camera(self.camera.rotation);
            backend.render(self.gizmo.scene(), self.gizmo.camera());
        }

        self.dirty = false;
        true
    }

    /// Project every visible label node into container pixel coordinates.
    fn project_labels(&self) -> Vec<ScreenLabel> {
        let mut out = Vec::new();
        for id in self.scene.descendants(self.scene.root()) {
            let Some(node) = self.scene.node(id) else {
                continue;
            };
            let NodeKind::Label { text, color } = &node.kind else {
                continue;
            };
            if !self.scene.visible_world(id) {
                continue;
            }
            let world = self
                .scene
                .world_transform(id)
                .transform_point3(Vec3::ZERO);
            let ndc = self.camera.world_to_ndc(world);
            let position = Vec2::new(
                (ndc.x * 0.5 + 0.5) * self.container.x,
                (1.0 - (ndc.y * 0.5 + 0.5)) * self.container.y,
            );
            out.push(ScreenLabel {
                text: text.clone(),
                position,
                color: *color,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use modelview_assets::{MeshData, RawAsset};
    use modelview_core::ModelConfig;
    use modelview_scene::assemble;

    use crate::gizmo::INSET_SIZE;

    const CONTAINER: Vec2 = Vec2::new(800.0, 600.0);
    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingBackend {
        viewports: Vec<ViewportRect>,
        renders: usize,
        depth_clears: usize,
        labels: Vec<ScreenLabel>,
    }

    impl RenderBackend for RecordingBackend {
        fn set_viewport(&mut self, rect: ViewportRect) {
            self.viewports.push(rect);
        }

        fn clear_depth(&mut self) {
            self.depth_clears += 1;
        }

        fn render(&mut self, _scene: &SceneGraph, _camera: &OrthographicCamera) {
            self.renders += 1;
        }

        fn draw_labels(&mut self, labels: &[ScreenLabel]) {
            self.labels = labels.to_vec();
        }
    }

    fn triangle_model() -> DisplayModel {
        let mesh = MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
            colors: None,
            indices: None,
        };
        assemble(
            "triangle.stl",
            RawAsset::SingleMesh(mesh),
            &ModelConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn static_scenes_render_once() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        assert!(viewport.advance(DT, &mut backend));
        // Nothing changed since, so nothing renders.
        assert!(!viewport.advance(DT, &mut backend));
        assert!(!viewport.advance(DT, &mut backend));
    }

    #[test]
    fn frame_renders_main_and_inset_passes() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        assert_eq!(backend.renders, 2);
        assert_eq!(backend.depth_clears, 1);
        assert_eq!(backend.viewports.len(), 2);
        assert_eq!(backend.viewports[0], ViewportRect::full(CONTAINER));
        let inset = backend.viewports[1];
        assert_eq!(inset.width, INSET_SIZE);
        assert_eq!(inset.x, CONTAINER.x - INSET_SIZE);
        assert_eq!(inset.y, CONTAINER.y - INSET_SIZE);
    }

    #[test]
    fn disabling_the_gizmo_skips_the_inset_pass() {
        let config = ViewerConfig {
            axis_helper: false,
            ..Default::default()
        };
        let mut viewport = Viewport::new(config, CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        assert_eq!(backend.renders, 1);
        assert_eq!(backend.depth_clears, 0);
    }

    #[test]
    fn content_changes_mark_dirty() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);

        let before = viewport.scene().len();
        let id = viewport.add_content(&triangle_model());
        assert!(viewport.advance(DT, &mut backend));
        assert!(viewport.scene().len() > before);
        assert!(viewport
            .scene()
            .find_by_name(viewport.scene().root(), "main-mesh")
            .is_some());

        assert!(viewport.remove_content(id));
        assert!(viewport.advance(DT, &mut backend));
        assert_eq!(viewport.scene().len(), before);
        // Stale handle: second removal is refused, nothing re-renders.
        assert!(!viewport.remove_content(id));
        assert!(!viewport.advance(DT, &mut backend));
    }

    #[test]
    fn reset_posts_a_message_and_restores_the_pose() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let initial = viewport.camera().position;
        viewport.rotate(Vec2::new(120.0, 40.0));
        viewport.zoom(2.0);
        viewport.reset_view();
        assert_eq!(viewport.current_message(), Some("Reset view"));
        assert!((viewport.camera().position - initial).length() < 1e-4);
        assert_eq!(viewport.camera().zoom, 1.0);
    }

    #[test]
    fn messages_auto_dismiss_and_trigger_a_redraw() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);

        viewport.post_message("hello");
        assert!(viewport.advance(DT, &mut backend));
        assert!(!viewport.advance(DT, &mut backend));

        // Run past the 2 second deadline; the expiry itself redraws once.
        let mut redraws = 0;
        for _ in 0..180 {
            if viewport.advance(DT, &mut backend) {
                redraws += 1;
            }
        }
        assert_eq!(redraws, 1);
        assert_eq!(viewport.current_message(), None);
    }

    #[test]
    fn controls_are_inert_when_disabled() {
        let config = ViewerConfig {
            controls: false,
            ..Default::default()
        };
        let mut viewport = Viewport::new(config, CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        let before = viewport.camera().position;
        viewport.rotate(Vec2::new(100.0, 100.0));
        viewport.zoom(4.0);
        assert_eq!(viewport.camera().position, before);
        assert!(!viewport.advance(DT, &mut backend));
    }

    #[test]
    fn resize_marks_dirty_and_updates_the_frustum() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        let before = viewport.camera().half_extents();
        viewport.resize(Vec2::new(1600.0, 600.0));
        assert!(viewport.advance(DT, &mut backend));
        assert!(viewport.camera().half_extents().x > before.x);
    }

    #[test]
    fn light_cycles_z_x_y_off() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        viewport.cycle_light();
        assert_eq!(viewport.current_message(), Some("Light: x"));
        viewport.cycle_light();
        assert_eq!(viewport.current_message(), Some("Light: y"));
        viewport.cycle_light();
        assert_eq!(viewport.current_message(), Some("Light: off"));
        let headlight = viewport
            .scene()
            .find_by_name(viewport.scene().root(), "headlight")
            .unwrap();
        assert!(!viewport.scene().node(headlight).unwrap().visible);
        viewport.cycle_light();
        assert_eq!(viewport.current_message(), Some("Light: z"));
        assert!(viewport.scene().node(headlight).unwrap().visible);
    }

    #[test]
    fn ambient_toggle_flips_visibility() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let ambient = viewport
            .scene()
            .find_by_name(viewport.scene().root(), "ambient")
            .unwrap();
        assert!(viewport.scene().node(ambient).unwrap().visible);
        viewport.toggle_ambient();
        assert!(!viewport.scene().node(ambient).unwrap().visible);
        assert_eq!(viewport.current_message(), Some("Ambient light off"));
    }

    #[test]
    fn labels_project_to_container_pixels() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let root = viewport.scene().root();
        viewport
            .scene_mut()
            .insert(root, Node::label("annotation", "origin", Color::RED));
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        assert_eq!(backend.labels.len(), 1);
        let label = &backend.labels[0];
        assert_eq!(label.text, "origin");
        // The origin sits at the focus, so it projects to the center.
        assert!((label.position.x - CONTAINER.x * 0.5).abs() < 1.0);
        assert!((label.position.y - CONTAINER.y * 0.5).abs() < 1.0);
    }

    #[test]
    fn gizmo_click_snaps_the_camera_onto_the_axis() {
        // Camera straight down +Z keeps the gizmo cluster unrotated, so the
        // +Y handle projects to a known inset pixel.
        let config = ViewerConfig {
            camera_position: Vec3::new(0.0, 0.0, 1.0),
            ..Default::default()
        };
        let mut viewport = Viewport::new(config, CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);

        let inset = OrientationGizmo::inset_rect(CONTAINER);
        let pointer = Vec2::new(inset.x + 0.5 * INSET_SIZE, inset.y + 0.25 * INSET_SIZE);
        assert!(viewport.pointer_up(pointer));

        for _ in 0..300 {
            viewport.advance(DT, &mut backend);
        }
        let camera = viewport.camera();
        assert!((camera.position - Vec3::new(0.0, PERSPECTIVE_DISTANCE, 0.0)).length() < 1e-2);
        assert!((camera.up - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-2);
    }

    #[test]
    fn pointer_off_the_inset_is_not_handled() {
        let mut viewport = Viewport::new(ViewerConfig::default(), CONTAINER);
        let mut backend = RecordingBackend::default();
        viewport.advance(DT, &mut backend);
        assert!(!viewport.pointer_up(Vec2::new(5.0, 5.0)));
        assert!(!viewport.advance(DT, &mut backend));
    }
}
