use std::collections::BTreeMap;
use std::path::PathBuf;

use blobsurf_core::{
    compute_gaussian_density, extract_isosurface, iso_level, DensityField, ProgressEvent,
    SelectionOrder, SurfaceMesh, TaskContext,
};
use serde::Serialize;

use crate::obj::save_obj;
use crate::scene::Scene;

#[derive(Debug, Default, PartialEq)]
pub(crate) struct HeadlessArgs {
    pub(crate) scene_path: Option<PathBuf>,
    pub(crate) obj_path: Option<PathBuf>,
    pub(crate) resolution: Option<f32>,
    pub(crate) smoothness: Option<f32>,
    pub(crate) radius_offset: Option<f32>,
    pub(crate) iso: Option<f32>,
    pub(crate) log_level: Option<String>,
    pub(crate) print: bool,
    pub(crate) help: bool,
}

pub(crate) fn parse_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut parsed = HeadlessArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--scene" => parsed.scene_path = Some(PathBuf::from(value("--scene")?)),
            "--obj" => parsed.obj_path = Some(PathBuf::from(value("--obj")?)),
            "--resolution" => parsed.resolution = Some(parse_float(arg, &value(arg)?)?),
            "--smoothness" => parsed.smoothness = Some(parse_float(arg, &value(arg)?)?),
            "--radius-offset" => parsed.radius_offset = Some(parse_float(arg, &value(arg)?)?),
            "--iso" => parsed.iso = Some(parse_float(arg, &value(arg)?)?),
            "--log-level" => parsed.log_level = Some(value("--log-level")?),
            "--print" => parsed.print = true,
            "--help" | "-h" => parsed.help = true,
            other => return Err(format!("unknown argument {other}")),
        }
    }

    Ok(parsed)
}

fn parse_float(name: &str, value: &str) -> Result<f32, String> {
    value
        .parse::<f32>()
        .map_err(|err| format!("{name}: {value:?} is not a number ({err})"))
}

pub(crate) fn print_help() {
    println!(
        "Usage: blobsurf [options]\n  --scene <path>         sphere scene JSON (default: two-sphere demo)\n  --obj <path>           write the extracted surface as OBJ\n  --resolution <f>       world units per voxel\n  --smoothness <f>       Gaussian falloff\n  --radius-offset <f>    added to every radius\n  --iso <f>              iso level (default exp(-smoothness))\n  --log-level <level>    error|warn|info|debug|trace (or BLOBSURF_LOG)\n  --print                print a JSON summary to stdout"
    );
}

#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    pub(crate) points: usize,
    pub(crate) dims: [usize; 3],
    pub(crate) resolution: f32,
    pub(crate) max_radius: f32,
    pub(crate) iso_level: f32,
    pub(crate) occupied_voxels: usize,
    pub(crate) max_density: f32,
    pub(crate) vertices: usize,
    pub(crate) triangles: usize,
    pub(crate) regions: Vec<Region>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Region {
    pub(crate) id: i32,
    pub(crate) label: Option<String>,
    pub(crate) group: Option<i32>,
    pub(crate) triangles: usize,
}

pub(crate) fn run(args: &HeadlessArgs) -> Result<Summary, String> {
    let mut scene = match &args.scene_path {
        Some(path) => Scene::load(path)?,
        None => Scene::demo(),
    };
    if let Some(resolution) = args.resolution {
        scene.config.resolution = resolution;
    }
    if let Some(smoothness) = args.smoothness {
        scene.config.smoothness = smoothness;
    }
    if let Some(radius_offset) = args.radius_offset {
        scene.config.radius_offset = radius_offset;
    }

    let points = scene.points();
    let bounds = scene.bounds(&points)?;
    let selection = SelectionOrder::all(points.len());
    let ctx = TaskContext::new().with_callback(|event| {
        if let ProgressEvent::Advance {
            current,
            total,
            message,
        } = event
        {
            tracing::debug!("{message}: {current}/{total}");
        }
    });
    let field = compute_gaussian_density(&points, &selection, &bounds, &scene.config, &ctx)
        .map_err(|err| err.to_string())?;

    let iso = args
        .iso
        .unwrap_or_else(|| iso_level(scene.config.smoothness, field.radius_factor));
    let mesh = extract_isosurface(&field, iso).map_err(|err| err.to_string())?;
    tracing::info!(
        "blobsurf: {} spheres -> {} vertices, {} triangles",
        points.len(),
        mesh.positions.len(),
        mesh.triangle_count()
    );

    if let Some(path) = &args.obj_path {
        save_obj(path, &mesh)?;
        tracing::info!("blobsurf: wrote {}", path.display());
    }

    Ok(summarize(&scene, &field, &mesh, iso))
}

fn summarize(scene: &Scene, field: &DensityField, mesh: &SurfaceMesh, iso: f32) -> Summary {
    let mut per_id: BTreeMap<i32, usize> = BTreeMap::new();
    for triangle in 0..mesh.triangle_count() {
        if let Some(id) = mesh.triangle_id(triangle) {
            *per_id.entry(id).or_default() += 1;
        }
    }
    let stats = field.stats();
    Summary {
        points: scene.spheres.len(),
        dims: field.dims(),
        resolution: field.resolution,
        max_radius: field.max_radius,
        iso_level: iso,
        occupied_voxels: stats.occupied,
        max_density: stats.max_density,
        vertices: mesh.positions.len(),
        triangles: mesh.triangle_count(),
        regions: per_id
            .into_iter()
            .map(|(id, triangles)| Region {
                id,
                label: scene.label_for(id).map(str::to_string),
                group: scene.group_for(id),
                triangles,
            })
            .collect(),
    }
}
