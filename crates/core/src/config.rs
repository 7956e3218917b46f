use serde::{Deserialize, Serialize};

use crate::error::{DensityError, DensityResult};

pub const DEFAULT_RESOLUTION: f32 = 1.0;
pub const DEFAULT_RADIUS_OFFSET: f32 = 0.0;
pub const DEFAULT_SMOOTHNESS: f32 = 1.5;
pub const DEFAULT_MAX_VOXELS: u64 = 32_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World units per voxel.
    pub resolution: f32,
    /// Added to every point radius before use.
    pub radius_offset: f32,
    /// Gaussian falloff coefficient.
    pub smoothness: f32,
    pub max_voxels: u64,
    /// Fixed points per slice; `None` sizes slices from the largest radius.
    pub slice_size: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            radius_offset: DEFAULT_RADIUS_OFFSET,
            smoothness: DEFAULT_SMOOTHNESS,
            max_voxels: DEFAULT_MAX_VOXELS,
            slice_size: None,
        }
    }
}

impl GridConfig {
    pub fn with_resolution(mut self, resolution: f32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self
    }

    pub fn with_radius_offset(mut self, radius_offset: f32) -> Self {
        self.radius_offset = radius_offset;
        self
    }

    pub fn with_slice_size(mut self, slice_size: usize) -> Self {
        self.slice_size = Some(slice_size);
        self
    }

    pub fn validate(&self) -> DensityResult<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(DensityError::invalid_config(format!(
                "resolution must be > 0 (got {})",
                self.resolution
            )));
        }
        if !self.smoothness.is_finite() || self.smoothness <= 0.0 {
            return Err(DensityError::invalid_config(format!(
                "smoothness must be > 0 (got {})",
                self.smoothness
            )));
        }
        if !self.radius_offset.is_finite() {
            return Err(DensityError::invalid_config(format!(
                "radius offset must be finite (got {})",
                self.radius_offset
            )));
        }
        if self.max_voxels == 0 {
            return Err(DensityError::invalid_config("max voxels must be > 0"));
        }
        if self.slice_size == Some(0) {
            return Err(DensityError::invalid_config("slice size must be > 0"));
        }
        Ok(())
    }

    /// Radius with the offset applied; errors when the result would be negative.
    pub fn effective_radius(&self, radius: f32) -> DensityResult<f32> {
        let r = radius + self.radius_offset;
        if !r.is_finite() || r < 0.0 {
            return Err(DensityError::invalid_config(format!(
                "effective radius {} + {} is negative",
                radius, self.radius_offset
            )));
        }
        Ok(r)
    }
}
