use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{DensityError, DensityResult};
use crate::points::PointSource;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Box enclosing every sphere (center +/- radius) of the source.
    pub fn from_spheres<P: PointSource + ?Sized>(points: &P) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for idx in 0..points.len() {
            let center = points.position(idx);
            let radius = points.radius(idx).max(0.0);
            min = min.min(center - Vec3::splat(radius));
            max = max.max(center + Vec3::splat(radius));
        }
        Some(Self {
            min: min.to_array(),
            max: max.to_array(),
        })
    }

    pub fn min_vec(&self) -> Vec3 {
        Vec3::from(self.min)
    }

    pub fn max_vec(&self) -> Vec3 {
        Vec3::from(self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max_vec() - self.min_vec()
    }

    /// Copy grown by `pad` on every face.
    pub fn expanded(&self, pad: f32) -> Self {
        Self {
            min: (self.min_vec() - Vec3::splat(pad)).to_array(),
            max: (self.max_vec() + Vec3::splat(pad)).to_array(),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min_vec()).all() && point.cmple(self.max_vec()).all()
    }

    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        !self.min_vec().is_finite()
            || !self.max_vec().is_finite()
            || size.x <= 0.0
            || size.y <= 0.0
            || size.z <= 0.0
    }

    pub(crate) fn validate(&self) -> DensityResult<()> {
        if self.is_degenerate() {
            return Err(DensityError::DegenerateBox {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::WeightedPoint;

    #[test]
    fn from_spheres_covers_radii() {
        let points = vec![
            WeightedPoint::new(0, [0.0, 0.0, 0.0], 1.0),
            WeightedPoint::new(1, [2.0, 0.0, 0.0], 1.0),
        ];
        let aabb = Aabb::from_spheres(&points).expect("bounds");
        assert_eq!(aabb.min, [-1.0, -1.0, -1.0]);
        assert_eq!(aabb.max, [3.0, 1.0, 1.0]);
        assert!(Aabb::from_spheres(&Vec::<WeightedPoint>::new()).is_none());
    }

    #[test]
    fn expanded_leaves_original_untouched() {
        let aabb = Aabb::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        let grown = aabb.expanded(0.5);
        assert_eq!(aabb.min, [0.0, 0.0, 0.0]);
        assert_eq!(grown.min, [-0.5, -0.5, -0.5]);
        assert_eq!(grown.max, [1.5, 2.5, 3.5]);
        assert!(grown.contains(Vec3::new(1.4, 0.0, 0.0)));
        assert!(!aabb.contains(Vec3::new(1.4, 0.0, 0.0)));
    }

    #[test]
    fn flat_or_inverted_boxes_are_degenerate() {
        assert!(Aabb::new([0.0, 0.0, 0.0], [1.0, 0.0, 1.0]).is_degenerate());
        assert!(Aabb::new([0.0, 0.0, 0.0], [-1.0, 1.0, 1.0]).is_degenerate());
        assert!(Aabb::new([0.0, f32::NAN, 0.0], [1.0, 1.0, 1.0]).is_degenerate());
        assert!(!Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]).is_degenerate());
        assert!(matches!(
            Aabb::new([0.0; 3], [0.0; 3]).validate(),
            Err(DensityError::DegenerateBox { .. })
        ));
    }
}
