use std::path::Path;

use blobsurf_core::{Aabb, GridConfig, WeightedPoint};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Scene {
    #[serde(default)]
    pub(crate) spheres: Vec<SceneSphere>,
    #[serde(default)]
    pub(crate) config: GridConfig,
    #[serde(default)]
    pub(crate) bounds: Option<Aabb>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SceneSphere {
    pub(crate) center: [f32; 3],
    pub(crate) radius: f32,
    #[serde(default)]
    pub(crate) id: Option<i32>,
    #[serde(default)]
    pub(crate) label: Option<String>,
    #[serde(default)]
    pub(crate) group: Option<i32>,
}

impl Scene {
    pub(crate) fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
        serde_json::from_slice(&data).map_err(|err| format!("{}: {err}", path.display()))
    }

    /// Two unit spheres two units apart.
    pub(crate) fn demo() -> Self {
        Self {
            spheres: vec![
                SceneSphere {
                    center: [0.0, 0.0, 0.0],
                    radius: 1.0,
                    id: Some(0),
                    label: Some("A".to_string()),
                    group: Some(0),
                },
                SceneSphere {
                    center: [2.0, 0.0, 0.0],
                    radius: 1.0,
                    id: Some(1),
                    label: Some("B".to_string()),
                    group: Some(1),
                },
            ],
            config: GridConfig::default().with_resolution(0.5),
            bounds: None,
        }
    }

    /// Spheres as weighted points; a missing id defaults to the sphere's index.
    pub(crate) fn points(&self) -> Vec<WeightedPoint> {
        self.spheres
            .iter()
            .enumerate()
            .map(|(idx, sphere)| {
                WeightedPoint::new(sphere.id.unwrap_or(idx as i32), sphere.center, sphere.radius)
            })
            .collect()
    }

    pub(crate) fn bounds(&self, points: &[WeightedPoint]) -> Result<Aabb, String> {
        self.bounds
            .or_else(|| Aabb::from_spheres(points))
            .ok_or_else(|| "scene has no spheres and no explicit bounds".to_string())
    }

    pub(crate) fn label_for(&self, id: i32) -> Option<&str> {
        self.spheres
            .iter()
            .enumerate()
            .find(|(idx, sphere)| sphere.id.unwrap_or(*idx as i32) == id)
            .and_then(|(_, sphere)| sphere.label.as_deref())
    }

    pub(crate) fn group_for(&self, id: i32) -> Option<i32> {
        self.spheres
            .iter()
            .enumerate()
            .find(|(idx, sphere)| sphere.id.unwrap_or(*idx as i32) == id)
            .and_then(|(_, sphere)| sphere.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scene_json() {
        let scene: Scene = serde_json::from_str(
            r#"{
                "spheres": [
                    { "center": [0, 0, 0], "radius": 1.5, "label": "N" },
                    { "center": [1, 2, 3], "radius": 1.0, "id": 42, "group": 7 }
                ],
                "config": { "resolution": 0.25, "smoothness": 2.0 }
            }"#,
        )
        .unwrap();
        let points = scene.points();
        assert_eq!(points[0].id, 0);
        assert_eq!(points[1].id, 42);
        assert_eq!(scene.config.resolution, 0.25);
        assert_eq!(scene.config.radius_offset, 0.0);
        assert_eq!(scene.label_for(0), Some("N"));
        assert_eq!(scene.group_for(42), Some(7));
        let bounds = scene.bounds(&points).unwrap();
        assert_eq!(bounds.min, [-1.5, -1.5, -1.5]);
        assert_eq!(bounds.max, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn empty_scene_needs_bounds() {
        let scene: Scene = serde_json::from_str(r#"{ "spheres": [] }"#).unwrap();
        assert!(scene.bounds(&scene.points()).is_err());

        let scene: Scene =
            serde_json::from_str(r#"{ "bounds": { "min": [0, 0, 0], "max": [1, 1, 1] } }"#)
                .unwrap();
        assert_eq!(scene.bounds(&scene.points()).unwrap().max, [1.0, 1.0, 1.0]);
    }
}
