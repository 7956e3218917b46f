use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{DensityError, DensityResult};

/// Sphere center plus radius, tagged with a caller-assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub id: i32,
    pub position: [f32; 3],
    pub radius: f32,
}

impl WeightedPoint {
    pub fn new(id: i32, position: [f32; 3], radius: f32) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }
}

/// Read-only accessor over a point set, addressed by ordering index.
pub trait PointSource {
    fn len(&self) -> usize;
    fn position(&self, index: usize) -> Vec3;
    fn radius(&self, index: usize) -> f32;
    fn id(&self, index: usize) -> i32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSource for [WeightedPoint] {
    fn len(&self) -> usize {
        <[WeightedPoint]>::len(self)
    }

    fn position(&self, index: usize) -> Vec3 {
        Vec3::from(self[index].position)
    }

    fn radius(&self, index: usize) -> f32 {
        self[index].radius
    }

    fn id(&self, index: usize) -> i32 {
        self[index].id
    }
}

impl PointSource for Vec<WeightedPoint> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn position(&self, index: usize) -> Vec3 {
        self.as_slice().position(index)
    }

    fn radius(&self, index: usize) -> f32 {
        self.as_slice().radius(index)
    }

    fn id(&self, index: usize) -> i32 {
        self.as_slice().id(index)
    }
}

/// Sorted, deduplicated ordering indices to include in a computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOrder {
    indices: Vec<usize>,
}

impl SelectionOrder {
    pub fn all(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub(crate) fn validate(&self, len: usize) -> DensityResult<()> {
        // Sorted, so only the last index can be out of range.
        match self.indices.last() {
            Some(&index) if index >= len => Err(DensityError::InvalidSelection { index, len }),
            _ => Ok(()),
        }
    }
}
