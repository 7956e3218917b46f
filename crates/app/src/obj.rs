use std::io::Write;
use std::path::Path;

use blobsurf_core::SurfaceMesh;
use glam::Vec3;

/// Area-weighted vertex normals.
pub(crate) fn vertex_normals(mesh: &SurfaceMesh) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; mesh.positions.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(pa), Some(pb), Some(pc)) = (
            mesh.positions.get(a),
            mesh.positions.get(b),
            mesh.positions.get(c),
        ) else {
            continue;
        };
        let pa = Vec3::from(*pa);
        let face = (Vec3::from(*pb) - pa).cross(Vec3::from(*pc) - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// Writes the mesh as OBJ, one `g id_<n>` group per owning point id.
pub(crate) fn write_obj(out: &mut impl Write, mesh: &SurfaceMesh) -> std::io::Result<()> {
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for n in vertex_normals(mesh) {
        writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
    }

    let mut current_group = None;
    for (triangle, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let group = mesh.triangle_id(triangle);
        if group != current_group {
            if let Some(id) = group {
                writeln!(out, "g id_{id}")?;
            }
            current_group = group;
        }
        let a = tri[0] + 1;
        let b = tri[1] + 1;
        let c = tri[2] + 1;
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    Ok(())
}

pub(crate) fn save_obj(path: &Path, mesh: &SurfaceMesh) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_obj(&mut writer, mesh)
        .and_then(|_| writer.flush())
        .map_err(|err| format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> SurfaceMesh {
        SurfaceMesh {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
            ids: vec![4, 4, 9, 9],
        }
    }

    #[test]
    fn normals_face_up() {
        for n in vertex_normals(&quad()) {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn writes_groups_per_id() {
        let mut out = Vec::new();
        write_obj(&mut out, &quad()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert!(text.contains("g id_4\nf 1//1 2//2 3//3\ng id_9\nf 3//3 4//4 1//1"));
    }
}
