use glam::Vec3;

use crate::error::DensityResult;
use crate::field::{IdentityField, ScalarField, NO_CONTRIBUTOR};
use crate::grid::Grid;

/// Owned output buffers of one computation.
#[derive(Debug)]
pub(crate) struct DensityBuffers {
    pub(crate) scalar: ScalarField,
    /// Largest single contribution seen per voxel; drives identity ownership.
    pub(crate) best: ScalarField,
    pub(crate) identity: IdentityField,
}

impl DensityBuffers {
    pub(crate) fn allocate(grid: &Grid) -> DensityResult<Self> {
        Ok(Self {
            scalar: ScalarField::try_filled(grid.dims, 0.0)?,
            best: ScalarField::try_filled(grid.dims, 0.0)?,
            identity: IdentityField::try_filled(grid.dims, NO_CONTRIBUTOR)?,
        })
    }
}

/// Gaussian splat of one weighted point, truncated at twice its radius.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kernel {
    pub(crate) center: Vec3,
    pub(crate) radius: f32,
    pub(crate) id: i32,
}

impl Kernel {
    pub(crate) fn contribution(&self, dist_sq: f32, smoothness: f32) -> Option<f32> {
        let cutoff = self.radius * 2.0;
        if dist_sq > cutoff * cutoff {
            return None;
        }
        Some((-smoothness * dist_sq / (self.radius * self.radius)).exp())
    }
}

/// Rasterizes one kernel into the buffers.
///
/// Visits the voxel box around the `2r` cutoff (one voxel of slack on the far
/// side), adds every contribution to the scalar field, and hands voxel
/// ownership to the kernel only when it strictly beats the best so far.
pub(crate) fn accumulate_kernel(
    grid: &Grid,
    smoothness: f32,
    kernel: &Kernel,
    buffers: &mut DensityBuffers,
) {
    if kernel.radius <= 0.0 {
        return;
    }
    let scale = 1.0 / grid.resolution;
    let reach = (kernel.radius * 2.0 * scale).ceil() as isize;
    let local = (kernel.center - grid.origin) * scale;
    let range = |center: f32, dim: usize| -> (usize, usize) {
        let cell = center.floor() as isize;
        let begin = cell.saturating_sub(reach).max(0);
        let end = cell.saturating_add(reach).saturating_add(2).min(dim as isize);
        if end <= begin {
            return (0, 0);
        }
        (begin as usize, end as usize)
    };
    let (x0, x1) = range(local.x, grid.dims[0]);
    let (y0, y1) = range(local.y, grid.dims[1]);
    let (z0, z1) = range(local.z, grid.dims[2]);

    let scalar = buffers.scalar.values_mut();
    let best = buffers.best.values_mut();
    let identity = buffers.identity.values_mut();
    let nx = grid.dims[0];
    let ny = grid.dims[1];
    for iz in z0..z1 {
        let dz = grid.origin.z + iz as f32 * grid.resolution - kernel.center.z;
        for iy in y0..y1 {
            let dy = grid.origin.y + iy as f32 * grid.resolution - kernel.center.y;
            let dyz_sq = dy * dy + dz * dz;
            let row = nx * (iy + ny * iz);
            for ix in x0..x1 {
                let dx = grid.origin.x + ix as f32 * grid.resolution - kernel.center.x;
                let Some(density) = kernel.contribution(dx * dx + dyz_sq, smoothness) else {
                    continue;
                };
                let idx = row + ix;
                scalar[idx] += density;
                if density > best[idx] {
                    best[idx] = density;
                    identity[idx] = kernel.id;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;

    fn unit_grid(dim: usize) -> Grid {
        let size = dim as f32;
        Grid {
            dims: [dim; 3],
            origin: Vec3::ZERO,
            resolution: 1.0,
            max_radius: 1.0,
            expanded: Aabb::new([0.0; 3], [size; 3]),
        }
    }

    #[test]
    fn saturates_at_center_and_truncates_at_twice_radius() {
        let grid = unit_grid(9);
        let mut buffers = DensityBuffers::allocate(&grid).unwrap();
        let kernel = Kernel {
            center: Vec3::splat(4.0),
            radius: 1.5,
            id: 7,
        };
        accumulate_kernel(&grid, 1.5, &kernel, &mut buffers);

        assert!((buffers.scalar.get(4, 4, 4).unwrap() - 1.0).abs() < 1.0e-6);
        assert_eq!(buffers.identity.get(4, 4, 4), Some(7));
        // d = 3 sits exactly on the cutoff.
        assert!(buffers.scalar.get(7, 4, 4).unwrap() > 0.0);
        assert_eq!(buffers.scalar.get(8, 4, 4), Some(0.0));
        assert_eq!(buffers.identity.get(8, 4, 4), Some(NO_CONTRIBUTOR));
        for idx in 0..grid.voxel_count() {
            let [x, y, z] = grid.coords(idx);
            let d = grid.voxel_position(x, y, z).distance(kernel.center);
            if d > 3.0 + 1.0e-5 {
                assert_eq!(buffers.scalar.values()[idx], 0.0);
            }
        }
    }

    #[test]
    fn ties_keep_first_owner() {
        let grid = unit_grid(5);
        let mut buffers = DensityBuffers::allocate(&grid).unwrap();
        let first = Kernel {
            center: Vec3::new(1.0, 2.0, 2.0),
            radius: 1.0,
            id: 10,
        };
        let second = Kernel {
            center: Vec3::new(3.0, 2.0, 2.0),
            radius: 1.0,
            id: 20,
        };
        accumulate_kernel(&grid, 1.0, &first, &mut buffers);
        accumulate_kernel(&grid, 1.0, &second, &mut buffers);

        let expected = 2.0 * (-1.0f32).exp();
        assert!((buffers.scalar.get(2, 2, 2).unwrap() - expected).abs() < 1.0e-6);
        assert_eq!(buffers.identity.get(2, 2, 2), Some(10));
        assert_eq!(buffers.identity.get(3, 2, 2), Some(20));
    }

    #[test]
    fn zero_radius_contributes_nothing() {
        let grid = unit_grid(3);
        let mut buffers = DensityBuffers::allocate(&grid).unwrap();
        let kernel = Kernel {
            center: Vec3::splat(1.0),
            radius: 0.0,
            id: 1,
        };
        accumulate_kernel(&grid, 1.0, &kernel, &mut buffers);
        assert!(buffers.scalar.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn kernel_outside_grid_is_clamped() {
        let grid = unit_grid(4);
        let mut buffers = DensityBuffers::allocate(&grid).unwrap();
        let kernel = Kernel {
            center: Vec3::new(-1.0, 1.0, 1.0),
            radius: 1.0,
            id: 3,
        };
        accumulate_kernel(&grid, 1.0, &kernel, &mut buffers);
        assert!(buffers.scalar.get(0, 1, 1).unwrap() > 0.0);
        assert_eq!(buffers.scalar.get(2, 1, 1), Some(0.0));
    }

    #[test]
    fn far_away_kernel_touches_nothing() {
        let grid = unit_grid(4);
        let mut buffers = DensityBuffers::allocate(&grid).unwrap();
        for center in [
            Vec3::new(1.0e19, 0.0, 0.0),
            Vec3::new(-1.0e19, 1.0, 1.0),
            Vec3::new(1.0, f32::MAX, 1.0),
        ] {
            let kernel = Kernel {
                center,
                radius: 1.0,
                id: 5,
            };
            accumulate_kernel(&grid, 1.0, &kernel, &mut buffers);
        }
        assert!(buffers.scalar.values().iter().all(|v| *v == 0.0));
        assert!(buffers.identity.values().iter().all(|id| *id == NO_CONTRIBUTOR));
    }
}
