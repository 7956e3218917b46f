//! Gaussian density fields for blending weighted spheres into one surface.
//!
//! Points are splatted into a padded voxel grid as truncated Gaussians. The
//! result carries a scalar field for isosurface extraction and an identity
//! field naming the dominant point of every voxel, used to label the mesh.

mod accumulate;
mod bounds;
mod config;
mod density;
mod error;
mod field;
mod grid;
mod isosurface;
mod job;
mod parallel;
mod points;
mod progress;

pub use bounds::Aabb;
pub use config::{
    GridConfig, DEFAULT_MAX_VOXELS, DEFAULT_RADIUS_OFFSET, DEFAULT_RESOLUTION, DEFAULT_SMOOTHNESS,
};
pub use density::{compute_gaussian_density, run_job, DensityField, FieldStats, RADIUS_FACTOR};
pub use error::{DensityError, DensityResult};
pub use field::{Field3, GridTransform, IdentityField, ScalarField, NO_CONTRIBUTOR};
pub use grid::{build_grid, resolve_radii, Grid};
pub use isosurface::{extract_isosurface, iso_level, SurfaceMesh};
pub use job::{slice_size_for, DensityJob, SliceReport};
pub use points::{PointSource, SelectionOrder, WeightedPoint};
pub use progress::{
    CancelToken, ProgressCallback, ProgressEvent, ProgressSink, TaskContext, FILL_MESSAGE,
};
