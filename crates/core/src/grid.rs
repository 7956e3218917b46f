use glam::Vec3;

use crate::bounds::Aabb;
use crate::config::GridConfig;
use crate::error::{DensityError, DensityResult};
use crate::points::{PointSource, SelectionOrder};

/// Voxel lattice covering the padded bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub dims: [usize; 3],
    /// World position of voxel (0, 0, 0), the expanded box minimum.
    pub origin: Vec3,
    pub resolution: f32,
    pub max_radius: f32,
    pub expanded: Aabb,
}

impl Grid {
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    pub fn coords(&self, index: usize) -> [usize; 3] {
        let slice = self.dims[0] * self.dims[1];
        let z = index / slice;
        let rem = index - z * slice;
        let y = rem / self.dims[0];
        let x = rem - y * self.dims[0];
        [x, y, z]
    }

    pub fn voxel_position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.origin + Vec3::new(x as f32, y as f32, z as f32) * self.resolution
    }

    /// Voxel whose lattice point is closest to `point`, clamped to the grid.
    pub fn nearest_voxel(&self, point: Vec3) -> [usize; 3] {
        let local = (point - self.origin) / self.resolution;
        let clamp = |value: f32, dim: usize| -> usize {
            (value.round().max(0.0) as usize).min(dim.saturating_sub(1))
        };
        [
            clamp(local.x, self.dims[0]),
            clamp(local.y, self.dims[1]),
            clamp(local.z, self.dims[2]),
        ]
    }
}

/// Effective radius for every selected point, in selection order.
pub fn resolve_radii<P: PointSource + ?Sized>(
    points: &P,
    selection: &SelectionOrder,
    config: &GridConfig,
) -> DensityResult<Vec<f32>> {
    selection
        .iter()
        .map(|index| {
            let position = points.position(index);
            if !position.is_finite() {
                return Err(DensityError::invalid_config(format!(
                    "point {index} has non-finite position {position}"
                )));
            }
            config.effective_radius(points.radius(index))
        })
        .collect()
}

pub fn build_grid(bounds: &Aabb, radii: &[f32], config: &GridConfig) -> DensityResult<Grid> {
    bounds.validate()?;
    let resolution = config.resolution;
    let max_radius = radii.iter().copied().fold(0.0f32, f32::max);
    let pad = max_radius * 2.0 + resolution;
    let expanded = bounds.expanded(pad);
    let too_large = |voxels: u64| DensityError::GridTooLarge {
        voxels,
        max: config.max_voxels,
    };
    let axes = axis_counts(expanded.size(), resolution).ok_or_else(|| too_large(u64::MAX))?;
    let voxels = axes
        .iter()
        .try_fold(1u64, |total, axis| total.checked_mul(*axis))
        .ok_or_else(|| too_large(u64::MAX))?;
    if voxels > config.max_voxels {
        return Err(too_large(voxels));
    }
    let mut dims = [0usize; 3];
    for (dim, axis) in dims.iter_mut().zip(axes) {
        *dim = usize::try_from(axis).map_err(|_| too_large(voxels))?;
    }

    tracing::debug!(
        "density grid: dims {:?}, resolution {}, max radius {}, pad {}",
        dims,
        resolution,
        max_radius,
        pad
    );

    Ok(Grid {
        dims,
        origin: expanded.min_vec(),
        resolution,
        max_radius,
        expanded,
    })
}

/// Voxels per axis, `None` when an axis does not fit in a `u64`.
fn axis_counts(size: Vec3, resolution: f32) -> Option<[u64; 3]> {
    let axis = |extent: f32| -> Option<u64> {
        let count = (f64::from(extent) / f64::from(resolution)).ceil().max(1.0);
        (count.is_finite() && count < u64::MAX as f64).then_some(count as u64)
    };
    Some([axis(size.x)?, axis(size.y)?, axis(size.z)?])
}
