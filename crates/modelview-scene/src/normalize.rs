//! Geometry normalization
//!
//! Pure transform logic: given a bounding volume and options, compute the
//! uniform scale factor and centering translation that place a model in the
//! viewer's canonical volume.

use glam::Vec3;

use modelview_core::{Aabb, ScaleMode};

/// A normalization result, applied as `p' = scale * p + translation`.
/// The translation is expressed in already-scaled units: scaling happens
/// first, centering second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeTransform {
    pub translation: Vec3,
    pub scale: f32,
}

impl NormalizeTransform {
    pub const IDENTITY: NormalizeTransform = NormalizeTransform {
        translation: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn apply(&self, point: Vec3) -> Vec3 {
        point * self.scale + self.translation
    }
}

/// Compute the normalization for a bounding box.
///
/// `ScaleMode::Auto` maps the largest dimension to
/// [`ScaleMode::TARGET_SIZE`]; a degenerate zero-size box keeps scale 1
/// rather than dividing by zero. Centering translates the scaled box's
/// center to the origin.
pub fn compute_transform(aabb: &Aabb, center: bool, scale: ScaleMode) -> NormalizeTransform {
    let factor = match scale {
        ScaleMode::Off => 1.0,
        ScaleMode::Factor(f) => f,
        ScaleMode::Auto => {
            let largest = aabb.max_dimension();
            if largest > 0.0 {
                ScaleMode::TARGET_SIZE / largest
            } else {
                1.0
            }
        }
    };

    // Re-expand the box under the applied scale before centering, so the
    // translation is computed post-scale.
    let translation = if center && !aabb.is_empty() {
        -aabb.scaled(factor).center()
    } else {
        Vec3::ZERO
    };

    NormalizeTransform {
        translation,
        scale: factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> Aabb {
        // 20 x 10 x 5, centered at (5, 5, 5).
        Aabb::new(Vec3::new(-5.0, 0.0, 2.5), Vec3::new(15.0, 10.0, 7.5))
    }

    #[test]
    fn auto_scale_hits_target_size() {
        let t = compute_transform(&sample_box(), false, ScaleMode::Auto);
        let scaled = sample_box().scaled(t.scale);
        assert!((scaled.max_dimension() - ScaleMode::TARGET_SIZE).abs() < 1e-5);
        // Uniform: aspect ratios preserved (4 : 2 : 1).
        let size = scaled.size();
        assert!((size.x / size.y - 2.0).abs() < 1e-5);
        assert!((size.y / size.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn center_puts_box_centroid_at_origin() {
        let t = compute_transform(&sample_box(), true, ScaleMode::Auto);
        let min = t.apply(sample_box().min);
        let max = t.apply(sample_box().max);
        let centroid = (min + max) * 0.5;
        assert!(centroid.length() < 1e-5);
    }

    #[test]
    fn fixed_factor_is_used_verbatim() {
        let t = compute_transform(&sample_box(), false, ScaleMode::Factor(0.5));
        assert_eq!(t.scale, 0.5);
        assert_eq!(t.translation, Vec3::ZERO);
    }

    #[test]
    fn center_without_scale_negates_center() {
        let t = compute_transform(&sample_box(), true, ScaleMode::Off);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.translation, Vec3::new(-5.0, -5.0, -5.0));
    }

    #[test]
    fn degenerate_box_keeps_scale_one() {
        let point = Aabb::new(Vec3::ONE, Vec3::ONE);
        let t = compute_transform(&point, false, ScaleMode::Auto);
        assert_eq!(t.scale, 1.0);

        let t = compute_transform(&Aabb::EMPTY, true, ScaleMode::Auto);
        assert_eq!(t, NormalizeTransform::IDENTITY);
    }
}
