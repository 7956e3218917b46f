use crate::accumulate::{accumulate_kernel, DensityBuffers, Kernel};
use crate::bounds::Aabb;
use crate::config::GridConfig;
use crate::density::{package, DensityField};
use crate::error::{DensityError, DensityResult};
use crate::grid::{build_grid, resolve_radii, Grid};
use crate::points::{PointSource, SelectionOrder};

/// Voxel visits one slice should roughly stay under.
const SLICE_VOXEL_BUDGET: usize = 1 << 20;

/// Points per slice, shrinking as each point's voxel footprint grows.
pub fn slice_size_for(max_radius: f32, resolution: f32) -> usize {
    let reach = (max_radius * 2.0 / resolution).ceil();
    if !reach.is_finite() || reach < 0.0 {
        return 1;
    }
    let span = (reach as usize).saturating_mul(2).saturating_add(2);
    let footprint = span.saturating_mul(span).saturating_mul(span).max(1);
    (SLICE_VOXEL_BUDGET / footprint).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceReport {
    pub processed: usize,
    pub total: usize,
}

impl SliceReport {
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Resumable accumulation over a selection.
///
/// The job owns the output buffers; the only scheduling state is the cursor
/// into the selection. Each `step` runs one slice and returns, so callers poll
/// for cancellation between slices or just call `finish`.
pub struct DensityJob<'a, P: PointSource + ?Sized> {
    points: &'a P,
    selection: &'a SelectionOrder,
    radii: Vec<f32>,
    grid: Grid,
    smoothness: f32,
    slice_size: usize,
    cursor: usize,
    buffers: DensityBuffers,
}

impl<'a, P: PointSource + ?Sized> DensityJob<'a, P> {
    pub fn new(
        points: &'a P,
        selection: &'a SelectionOrder,
        bounds: &Aabb,
        config: &GridConfig,
    ) -> DensityResult<Self> {
        config.validate()?;
        selection.validate(points.len())?;
        bounds.validate()?;
        let radii = resolve_radii(points, selection, config)?;
        let grid = build_grid(bounds, &radii, config)?;
        let buffers = DensityBuffers::allocate(&grid)?;
        let slice_size = config
            .slice_size
            .unwrap_or_else(|| slice_size_for(grid.max_radius, grid.resolution));
        tracing::debug!(
            "density job: {} points, slice size {}, {} voxels",
            selection.len(),
            slice_size,
            grid.voxel_count()
        );
        Ok(Self {
            points,
            selection,
            radii,
            grid,
            smoothness: config.smoothness,
            slice_size,
            cursor: 0,
            buffers,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    pub fn processed(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.selection.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total()
    }

    /// Accumulates the next slice of points in ordering-index order.
    pub fn step(&mut self) -> SliceReport {
        let end = (self.cursor + self.slice_size).min(self.total());
        for position in self.cursor..end {
            let Some(index) = self.selection.get(position) else {
                break;
            };
            let kernel = Kernel {
                center: self.points.position(index),
                radius: self.radii[position],
                id: self.points.id(index),
            };
            accumulate_kernel(&self.grid, self.smoothness, &kernel, &mut self.buffers);
        }
        self.cursor = end;
        tracing::trace!("density slice: {}/{}", self.cursor, self.total());
        SliceReport {
            processed: self.cursor,
            total: self.total(),
        }
    }

    /// Runs any remaining slices and packages the fields.
    pub fn finish(mut self) -> DensityField {
        while !self.is_complete() {
            self.step();
        }
        package(self.grid, self.buffers)
    }

    /// Abandons the job, releasing its buffers.
    pub fn cancel(self) -> DensityError {
        DensityError::Cancelled {
            processed: self.cursor,
            total: self.total(),
        }
    }
}
