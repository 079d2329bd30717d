//! Serializable scene layout.

use super::collider::BoxCollider;
use super::terrain::TerrainData;
use super::SceneObject;
use crate::error::SceneError;
use serde::{Deserialize, Serialize};

/// Upper bound on generated heightfield samples.
const MAX_SAMPLES: usize = 16_777_216;

/// Shape of a terrain heightfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TerrainShape {
    /// Flat terrain.
    Flat {
        /// Extent along X.
        width: f32,
        /// Extent along Z.
        depth: f32,
        /// Grid spacing.
        resolution: f32,
        /// Surface height.
        elevation: f32,
    },

    /// Single hill terrain.
    SingleHill {
        /// Extent along X.
        width: f32,
        /// Extent along Z.
        depth: f32,
        /// Grid spacing.
        resolution: f32,
        /// Height of the surrounding plain.
        base_elevation: f32,
        /// Height of the hill above the plain.
        hill_height: f32,
        /// Radius of the hill.
        hill_radius: f32,
    },

    /// Valley between two hills.
    ValleyBetweenHills {
        /// Extent along X.
        width: f32,
        /// Extent along Z.
        depth: f32,
        /// Grid spacing.
        resolution: f32,
        /// Height of the valley floor.
        base_elevation: f32,
        /// Height of the hills above the floor.
        hill_height: f32,
    },

    /// Explicit samples.
    Heightmap {
        /// Extent along X.
        width: f32,
        /// Extent along Z.
        depth: f32,
        /// Samples along X.
        nx: usize,
        /// Samples along Z.
        nz: usize,
        /// Row-major samples `[z * nx + x]`.
        heights: Vec<f32>,
        /// Multiplier for samples.
        #[serde(default = "unit_scale")]
        elevation_scale: f32,
        /// Offset added after scaling.
        #[serde(default)]
        base_elevation: f32,
    },
}

fn unit_scale() -> f32 {
    1.0
}

fn check_grid(width: f32, depth: f32, resolution: f32) -> Result<(), SceneError> {
    let positive = |v: f32| v.is_finite() && v > 0.0;
    if !(positive(width) && positive(depth) && positive(resolution)) {
        return Err(SceneError::invalid_heightfield(format!(
            "width, depth and resolution must be finite and positive, got {width}, {depth}, {resolution}"
        )));
    }
    let samples = ((width / resolution).ceil() + 1.0) * ((depth / resolution).ceil() + 1.0);
    if samples > MAX_SAMPLES as f32 {
        return Err(SceneError::invalid_heightfield(format!(
            "{samples} samples exceeds the limit of {MAX_SAMPLES}"
        )));
    }
    Ok(())
}

impl TerrainShape {
    /// Generate the heightfield.
    ///
    /// # Errors
    /// Returns [`SceneError::InvalidHeightfield`] for non-positive extents or
    /// spacing, oversized grids, or malformed heightmaps.
    pub fn build(&self) -> Result<TerrainData, SceneError> {
        match *self {
            TerrainShape::Flat {
                width,
                depth,
                resolution,
                elevation,
            } => {
                check_grid(width, depth, resolution)?;
                Ok(TerrainData::flat(width, depth, resolution, elevation))
            }
            TerrainShape::SingleHill {
                width,
                depth,
                resolution,
                base_elevation,
                hill_height,
                hill_radius,
            } => {
                check_grid(width, depth, resolution)?;
                Ok(TerrainData::single_hill(
                    width,
                    depth,
                    resolution,
                    base_elevation,
                    hill_height,
                    hill_radius,
                ))
            }
            TerrainShape::ValleyBetweenHills {
                width,
                depth,
                resolution,
                base_elevation,
                hill_height,
            } => {
                check_grid(width, depth, resolution)?;
                Ok(TerrainData::valley_between_hills(
                    width,
                    depth,
                    resolution,
                    base_elevation,
                    hill_height,
                ))
            }
            TerrainShape::Heightmap {
                width,
                depth,
                nx,
                nz,
                ref heights,
                elevation_scale,
                base_elevation,
            } => TerrainData::from_heightmap(
                width,
                depth,
                heights,
                nx,
                nz,
                elevation_scale,
                base_elevation,
            ),
        }
    }
}

/// Terrain entry in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    /// Heightfield shape.
    #[serde(flatten)]
    pub shape: TerrainShape,
    /// World `(x, z)` of the first sample.
    #[serde(default)]
    pub origin: [f32; 2],
    /// Collision layer.
    #[serde(default)]
    pub layer: u8,
}

/// Everything needed to build a [`super::Scene`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Terrain heightfields.
    pub terrains: Vec<TerrainSpec>,
    /// Static non-terrain colliders.
    pub colliders: Vec<BoxCollider>,
    /// Movable objects.
    pub objects: Vec<SceneObject>,
    /// Selected object ids; `None` selects every object.
    pub selection: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heightmap_scale_defaults_to_one() {
        let spec: TerrainSpec = serde_json::from_str(
            r#"{ "kind": "heightmap", "width": 10, "depth": 10, "nx": 2, "nz": 2,
                 "heights": [1, 2, 3, 4] }"#,
        )
        .unwrap();

        let terrain = spec.shape.build().unwrap();
        assert_eq!(terrain.min_elevation(), 1.0);
        assert_eq!(terrain.max_elevation(), 4.0);
        assert_eq!(spec.origin, [0.0, 0.0]);
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let shape = TerrainShape::Flat {
            width: 1.0e6,
            depth: 1.0e6,
            resolution: 0.1,
            elevation: 0.0,
        };
        assert!(matches!(shape.build(), Err(SceneError::InvalidHeightfield(_))));
    }
}
