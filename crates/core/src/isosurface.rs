use glam::Vec3;
use lin_alg::f32::Vec3 as McVec3;
use mcubes::{MarchingCubes, MeshSide};
use serde::Serialize;

use crate::density::DensityField;
use crate::error::{DensityError, DensityResult};
use crate::field::NO_CONTRIBUTOR;
use crate::parallel;

/// Density threshold of the blended surface: `exp(-smoothness) / radius_factor`.
pub fn iso_level(smoothness: f32, radius_factor: f32) -> f32 {
    (-smoothness).exp() / radius_factor
}

/// Triangle mesh in world space with the owning point id of every vertex.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SurfaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub ids: Vec<i32>,
}

impl SurfaceMesh {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Id of a triangle, taken from its first vertex.
    pub fn triangle_id(&self, triangle: usize) -> Option<i32> {
        let vertex = *self.indices.get(triangle * 3)? as usize;
        self.ids.get(vertex).copied()
    }
}

/// Hands the scalar field to the marching-cubes crate and labels vertices
/// from the identity field.
pub fn extract_isosurface(field: &DensityField, iso: f32) -> DensityResult<SurfaceMesh> {
    let [nx, ny, nz] = field.dims();
    if nx < 2 || ny < 2 || nz < 2 || field.scalar.is_empty() {
        return Ok(SurfaceMesh::default());
    }

    // Negated so dense regions read as inside, the same sign convention as an SDF.
    let outside = -(iso - 1.0);
    let values: Vec<f32> = field
        .scalar
        .values()
        .iter()
        .map(|value| if value.is_finite() { -*value } else { outside })
        .collect();

    let dx = field.resolution;
    let extent = Vec3::new(
        (nx - 1) as f32 * dx,
        (ny - 1) as f32 * dx,
        (nz - 1) as f32 * dx,
    );
    let origin = field.grid.origin;
    let mc = MarchingCubes::new(
        (nx, ny, nz),
        (extent.x, extent.y, extent.z),
        ((nx - 1) as f32, (ny - 1) as f32, (nz - 1) as f32),
        McVec3::new(origin.x, origin.y, origin.z),
        values,
        -iso,
    )
    .map_err(|err| DensityError::Isosurface(err.to_string()))?;
    let output = mc.generate(MeshSide::Both);

    let positions: Vec<[f32; 3]> = output
        .vertices
        .into_iter()
        .map(|vertex| [vertex.posit.x, vertex.posit.y, vertex.posit.z])
        .collect();
    let indices: Vec<u32> = output.indices.into_iter().map(|idx| idx as u32).collect();

    let mut ids = vec![NO_CONTRIBUTOR; positions.len()];
    parallel::for_each_indexed_mut(&mut ids, |idx, slot| {
        *slot = vertex_owner(field, Vec3::from(positions[idx]));
    });

    tracing::debug!(
        "isosurface: level {}, {} vertices, {} triangles",
        iso,
        positions.len(),
        indices.len() / 3
    );

    Ok(SurfaceMesh {
        positions,
        indices,
        ids,
    })
}

/// Owner of the densest labelled corner of the cell containing `world`.
fn vertex_owner(field: &DensityField, world: Vec3) -> i32 {
    let [nx, ny, nz] = field.dims();
    let local = (world - field.grid.origin) / field.resolution;
    let base = |value: f32, dim: usize| -> usize {
        (value.floor().max(0.0) as usize).min(dim.saturating_sub(2))
    };
    let (x0, y0, z0) = (base(local.x, nx), base(local.y, ny), base(local.z, nz));

    let mut best = NO_CONTRIBUTOR;
    let mut best_density = f32::NEG_INFINITY;
    for corner in 0..8usize {
        let x = x0 + (corner & 1);
        let y = y0 + ((corner >> 1) & 1);
        let z = z0 + ((corner >> 2) & 1);
        let Some(owner) = field.identity.owner(x, y, z) else {
            continue;
        };
        let density = field.scalar.get(x, y, z).unwrap_or(0.0);
        if density > best_density {
            best_density = density;
            best = owner;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::config::GridConfig;
    use crate::density::compute_gaussian_density;
    use crate::points::{SelectionOrder, WeightedPoint};

    #[test]
    fn iso_level_matches_smoothness() {
        assert!((iso_level(1.5, 1.0) - 0.22313).abs() < 1.0e-4);
        assert!((iso_level(2.0, 2.0) - (-2.0f32).exp() / 2.0).abs() < 1.0e-7);
    }

    #[test]
    fn extracts_labelled_sphere() {
        let points = vec![WeightedPoint::new(5, [0.0, 0.0, 0.0], 1.0)];
        let bounds = Aabb::from_spheres(&points).unwrap();
        let config = GridConfig::default().with_resolution(0.25);
        let field =
            compute_gaussian_density(&points, &SelectionOrder::all(1), &bounds, &config, &())
                .unwrap();
        let mesh = extract_isosurface(&field, iso_level(config.smoothness, field.radius_factor))
            .unwrap();

        assert!(!mesh.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(mesh.ids.len(), mesh.positions.len());
        assert!(mesh.ids.iter().all(|id| *id == 5));
        assert_eq!(mesh.triangle_id(0), Some(5));
        for position in &mesh.positions {
            let d = Vec3::from(*position).length();
            assert!(d > 0.5 && d < 1.5, "vertex at distance {d}");
        }
    }

    #[test]
    fn two_spheres_keep_their_ids() {
        let points = vec![
            WeightedPoint::new(1, [-2.0, 0.0, 0.0], 1.0),
            WeightedPoint::new(2, [2.0, 0.0, 0.0], 1.0),
        ];
        let bounds = Aabb::from_spheres(&points).unwrap();
        let config = GridConfig::default().with_resolution(0.25);
        let field =
            compute_gaussian_density(&points, &SelectionOrder::all(2), &bounds, &config, &())
                .unwrap();
        let mesh = extract_isosurface(&field, iso_level(config.smoothness, 1.0)).unwrap();
        assert!(!mesh.is_empty());
        for (position, id) in mesh.positions.iter().zip(&mesh.ids) {
            let expected = if position[0] < 0.0 { 1 } else { 2 };
            assert_eq!(*id, expected);
        }
    }

    #[test]
    fn vertex_takes_densest_labelled_corner() {
        let points = vec![
            WeightedPoint::new(1, [0.0, 0.0, 0.0], 1.0),
            WeightedPoint::new(2, [1.5, 0.0, 0.0], 0.75),
        ];
        let bounds = Aabb::from_spheres(&points).unwrap();
        let config = GridConfig::default().with_resolution(0.5);
        let field =
            compute_gaussian_density(&points, &SelectionOrder::all(2), &bounds, &config, &())
                .unwrap();

        // x = 1.0 is the nearest lattice point and belongs to 2, but x = 0.5 is denser.
        let vertex = Vec3::new(0.9, 0.0, 0.0);
        assert_eq!(field.owner_near(vertex), Some(2));
        assert_eq!(vertex_owner(&field, vertex), 1);

        assert_eq!(vertex_owner(&field, field.grid.origin), NO_CONTRIBUTOR);
    }
}
