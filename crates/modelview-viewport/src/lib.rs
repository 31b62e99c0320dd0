//! Modelview Viewport - Camera, controls, gizmo and frame loop
//!
//! Hosts an assembled model scene behind a render-backend seam: an
//! orthographic camera with orbit controls, lighting and reference grids,
//! the orientation gizmo inset, transient status messages, and a dirty-flag
//! frame loop that only renders when something changed.

pub mod backend;
pub mod camera;
pub mod controls;
pub mod gizmo;
pub mod messages;
pub mod viewport;

pub use backend::{RenderBackend, ScreenLabel, ViewportRect};
pub use camera::{look_rotation, rotate_towards, OrthographicCamera, PERSPECTIVE_DISTANCE};
pub use controls::OrbitControls;
pub use gizmo::{GizmoHandle, OrientationGizmo, INSET_SIZE, TURN_RATE};
pub use messages::MessageCenter;
pub use viewport::Viewport;
