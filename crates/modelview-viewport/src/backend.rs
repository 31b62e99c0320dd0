//! Render backend seam
//!
//! The viewport owns the scene and cameras; everything GPU-facing sits
//! behind this trait so hosts can plug in whatever renderer they embed.

use glam::Vec2;

use modelview_core::Color;
use modelview_scene::SceneGraph;

use crate::camera::OrthographicCamera;

/// A sub-rectangle of the container, in pixels from the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn full(size: Vec2) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.x,
            height: size.y,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A label already projected into container pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub text: String,
    pub position: Vec2,
    pub color: Color,
}

/// Renderer capability the host provides.
pub trait RenderBackend {
    /// Restrict subsequent draws to a rectangle of the container.
    fn set_viewport(&mut self, rect: ViewportRect);
    /// Clear only the depth buffer, keeping the color image.
    fn clear_depth(&mut self);
    /// Draw every visible node of the graph through the camera.
    fn render(&mut self, scene: &SceneGraph, camera: &OrthographicCamera);
    /// Draw overlay text at projected positions.
    fn draw_labels(&mut self, labels: &[ScreenLabel]);
}
