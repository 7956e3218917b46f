use thiserror::Error;

pub type DensityResult<T> = Result<T, DensityError>;

/// Terminal non-success outcomes of a density computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DensityError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("selection index {index} out of range for {len} points")]
    InvalidSelection { index: usize, len: usize },

    #[error("degenerate bounding box (min {min:?}, max {max:?})")]
    DegenerateBox { min: [f32; 3], max: [f32; 3] },

    #[error("density grid too large ({voxels} voxels, max {max})")]
    GridTooLarge { voxels: u64, max: u64 },

    #[error("failed to allocate density grid of {voxels} voxels")]
    AllocationFailed { voxels: u64 },

    #[error("cancelled after {processed} of {total} points")]
    Cancelled { processed: usize, total: usize },

    #[error("isosurface extraction failed: {0}")]
    Isosurface(String),
}

impl DensityError {
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// True for failures caused by the caller's inputs, detected before any grid exists.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::InvalidSelection { .. }
                | Self::DegenerateBox { .. }
                | Self::GridTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_outcomes() {
        let cancelled = DensityError::Cancelled {
            processed: 3,
            total: 10,
        };
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_invalid_input());

        let bad = DensityError::invalid_config("resolution must be > 0");
        assert!(bad.is_invalid_input());
        assert!(!bad.is_cancelled());
        assert_eq!(bad.to_string(), "invalid config: resolution must be > 0");
    }
}
