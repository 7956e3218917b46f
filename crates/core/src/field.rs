use glam::{Mat4, Vec3};

use crate::error::{DensityError, DensityResult};

/// Identity value of voxels no point reaches.
pub const NO_CONTRIBUTOR: i32 = -1;

/// Dense voxel array, x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct Field3<T> {
    dims: [usize; 3],
    values: Vec<T>,
}

pub type ScalarField = Field3<f32>;
pub type IdentityField = Field3<i32>;

impl<T: Copy> Field3<T> {
    pub(crate) fn try_filled(dims: [usize; 3], fill: T) -> DensityResult<Self> {
        let len = dims[0] * dims[1] * dims[2];
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| DensityError::AllocationFailed { voxels: len as u64 })?;
        values.resize(len, fill);
        Ok(Self { dims, values })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<T> {
        if x >= self.dims[0] || y >= self.dims[1] || z >= self.dims[2] {
            return None;
        }
        self.values.get(self.value_index(x, y, z)).copied()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl IdentityField {
    /// Dominant point id at a voxel, `None` for the sentinel.
    pub fn owner(&self, x: usize, y: usize, z: usize) -> Option<i32> {
        self.get(x, y, z).filter(|id| *id != NO_CONTRIBUTOR)
    }
}

/// Voxel index to world: scale by resolution, then translate to the grid origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    matrix: Mat4,
}

impl GridTransform {
    pub fn new(resolution: f32, origin: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(origin) * Mat4::from_scale(Vec3::splat(resolution)),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn voxel_to_world(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.matrix
            .transform_point3(Vec3::new(x as f32, y as f32, z as f32))
    }

    /// Fractional voxel coordinates of a world position.
    pub fn world_to_voxel(&self, world: Vec3) -> Vec3 {
        self.matrix.inverse().transform_point3(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_field_has_requested_shape() {
        let field = IdentityField::try_filled([2, 3, 4], NO_CONTRIBUTOR).unwrap();
        assert_eq!(field.len(), 24);
        assert_eq!(field.get(1, 2, 3), Some(NO_CONTRIBUTOR));
        assert_eq!(field.owner(1, 2, 3), None);
        assert_eq!(field.get(2, 0, 0), None);
        assert!(field.into_values().iter().all(|id| *id == NO_CONTRIBUTOR));
    }

    #[test]
    fn transform_scales_then_translates() {
        let transform = GridTransform::new(0.5, Vec3::new(-3.5, -1.0, 2.0));
        assert_eq!(transform.voxel_to_world(0, 0, 0), Vec3::new(-3.5, -1.0, 2.0));
        assert_eq!(transform.voxel_to_world(2, 4, 6), Vec3::new(-2.5, 1.0, 5.0));
        let back = transform.world_to_voxel(Vec3::new(-2.5, 1.0, 5.0));
        assert!((back - Vec3::new(2.0, 4.0, 6.0)).length() < 1.0e-5);
    }
}
