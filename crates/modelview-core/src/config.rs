//! Typed viewer and model configuration
//!
//! The host embedding layer translates its external string attributes into
//! these structs; the core only ever sees typed options.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::Color;

/// How a loaded model is scaled during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Leave the model at its authored size.
    Off,
    /// Scale uniformly so the largest bounding-box dimension equals
    /// [`ScaleMode::TARGET_SIZE`].
    Auto,
    /// Scale uniformly by a fixed factor.
    Factor(f32),
}

impl ScaleMode {
    /// Canonical target size for `Auto` scaling, in scene units.
    pub const TARGET_SIZE: f32 = 12.0;
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Off
    }
}

/// Per-model load and display options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Translate the model so its bounding box is centered at the origin.
    pub center: bool,
    /// Uniform scaling applied during normalization.
    pub scale: ScaleMode,
    /// Surface color for meshes without per-vertex colors.
    pub face_color: Color,
    /// Color of the wireframe overlay.
    pub edge_color: Color,
    /// Crease-angle threshold for the wireframe overlay, in degrees.
    pub wireframe_angle: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            center: false,
            scale: ScaleMode::Off,
            face_color: Color::from_hex(0x9dc2cf),
            edge_color: Color::from_hex(0xff0000),
            wireframe_angle: 5.0,
        }
    }
}

/// Viewer-wide options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Show the reference grid.
    pub grid: bool,
    /// Show the orientation gizmo inset.
    pub axis_helper: bool,
    /// Enable orbit/pan/zoom controls.
    pub controls: bool,
    /// Initial camera direction; scaled out to viewing distance on setup.
    pub camera_position: Vec3,
    /// Initial orthographic zoom.
    pub camera_zoom: f32,
    /// Initial camera up vector.
    pub camera_up: Vec3,
    /// Show the toolbar affordance.
    pub toolbar: bool,
    /// Show the controls help text.
    pub help: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            grid: true,
            axis_helper: true,
            controls: true,
            camera_position: Vec3::new(1.0, 1.0, 1.0),
            camera_zoom: 1.0,
            camera_up: Vec3::Y,
            toolbar: true,
            help: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults() {
        let config = ModelConfig::default();
        assert!(!config.center);
        assert_eq!(config.scale, ScaleMode::Off);
        assert_eq!(config.wireframe_angle, 5.0);
    }

    #[test]
    fn viewer_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.camera_position, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(config.camera_up, Vec3::Y);
        assert_eq!(config.camera_zoom, 1.0);
        assert!(config.grid);
    }
}
