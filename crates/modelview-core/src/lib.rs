//! Modelview Core - Core types and configuration for the modelview viewer
//!
//! This crate provides the foundational types used throughout the viewer:
//! - Mathematical primitives (re-exported from glam)
//! - Axis-aligned bounding boxes
//! - Transform component for scene-node positioning
//! - Typed viewer and model configuration

pub mod aabb;
pub mod config;
pub mod types;

pub use aabb::Aabb;
pub use config::{ModelConfig, ScaleMode, ViewerConfig};
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use types::{Color, Transform};
