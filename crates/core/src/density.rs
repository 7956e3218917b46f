#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use glam::Vec3;
use serde::Serialize;

use crate::accumulate::DensityBuffers;
use crate::bounds::Aabb;
use crate::config::GridConfig;
use crate::error::DensityResult;
use crate::field::{GridTransform, IdentityField, ScalarField, NO_CONTRIBUTOR};
use crate::grid::Grid;
use crate::job::DensityJob;
use crate::points::{PointSource, SelectionOrder};
use crate::progress::{ProgressEvent, ProgressSink, FILL_MESSAGE};

/// Reserved iso-level calibration; always 1 for this accumulator.
pub const RADIUS_FACTOR: f32 = 1.0;

/// Everything an isosurface extractor needs from one computation.
#[derive(Debug, Clone)]
pub struct DensityField {
    pub scalar: ScalarField,
    pub identity: IdentityField,
    pub transform: GridTransform,
    pub grid: Grid,
    pub resolution: f32,
    pub max_radius: f32,
    pub radius_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub voxels: usize,
    pub occupied: usize,
    pub max_density: f32,
}

impl DensityField {
    pub fn dims(&self) -> [usize; 3] {
        self.grid.dims
    }

    pub fn density_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.scalar.get(x, y, z)
    }

    pub fn owner_at(&self, x: usize, y: usize, z: usize) -> Option<i32> {
        self.identity.owner(x, y, z)
    }

    /// Density at the lattice point nearest a world position.
    pub fn density_near(&self, world: Vec3) -> f32 {
        let [x, y, z] = self.grid.nearest_voxel(world);
        self.scalar.get(x, y, z).unwrap_or(0.0)
    }

    pub fn owner_near(&self, world: Vec3) -> Option<i32> {
        let [x, y, z] = self.grid.nearest_voxel(world);
        self.identity.owner(x, y, z)
    }

    /// World-space extent spanned by the lattice points.
    pub fn world_bounds(&self) -> Aabb {
        let [nx, ny, nz] = self.grid.dims;
        let min = self.transform.voxel_to_world(0, 0, 0);
        let max = self.transform.voxel_to_world(
            nx.saturating_sub(1),
            ny.saturating_sub(1),
            nz.saturating_sub(1),
        );
        Aabb::new(min.to_array(), max.to_array())
    }

    pub fn stats(&self) -> FieldStats {
        let occupied = self
            .identity
            .values()
            .iter()
            .filter(|id| **id != NO_CONTRIBUTOR)
            .count();
        let max_density = self
            .scalar
            .values()
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .fold(0.0f32, f32::max);
        FieldStats {
            voxels: self.scalar.len(),
            occupied,
            max_density,
        }
    }
}

pub(crate) fn package(grid: Grid, buffers: DensityBuffers) -> DensityField {
    let DensityBuffers {
        scalar, identity, ..
    } = buffers;
    DensityField {
        scalar,
        identity,
        transform: GridTransform::new(grid.resolution, grid.origin),
        resolution: grid.resolution,
        max_radius: grid.max_radius,
        radius_factor: RADIUS_FACTOR,
        grid,
    }
}

/// Builds the Gaussian density and identity fields for the selected points.
///
/// Progress is reported to `sink` after every slice and `should_stop` is
/// polled before each one; a stop request yields `DensityError::Cancelled`.
pub fn compute_gaussian_density<P, S>(
    points: &P,
    selection: &SelectionOrder,
    bounds: &Aabb,
    config: &GridConfig,
    sink: &S,
) -> DensityResult<DensityField>
where
    P: PointSource + ?Sized,
    S: ProgressSink + ?Sized,
{
    let start = Instant::now();
    let job = DensityJob::new(points, selection, bounds, config)?;
    let field = run_job(job, sink)?;
    tracing::info!(
        "gaussian density: {} points into {:?} voxels in {:.1} ms",
        selection.len(),
        field.dims(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(field)
}

/// Drives a job slice by slice, honouring the sink's stop flag.
pub fn run_job<P, S>(mut job: DensityJob<'_, P>, sink: &S) -> DensityResult<DensityField>
where
    P: PointSource + ?Sized,
    S: ProgressSink + ?Sized,
{
    let total = job.total();
    sink.report(ProgressEvent::Start { total });
    while !job.is_complete() {
        if sink.should_stop() {
            let err = job.cancel();
            tracing::warn!("gaussian density: {err}");
            return Err(err);
        }
        let report = job.step();
        sink.report(ProgressEvent::Advance {
            current: report.processed,
            total: report.total,
            message: FILL_MESSAGE,
        });
    }
    sink.report(ProgressEvent::Finish { total });
    Ok(job.finish())
}
