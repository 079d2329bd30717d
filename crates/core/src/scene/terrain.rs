//! Heightfield terrain for the reference scene.
//!
//! Elevation samples sit on a regular grid over the XZ plane (Y is up).
//! Queries between samples use bilinear interpolation; queries outside the
//! footprint report no surface.

use crate::core_types::Vec3;
use crate::error::SceneError;
use serde::{Deserialize, Serialize};

/// Bisection steps used to refine an oblique ray crossing.
const REFINE_STEPS: usize = 16;

/// Terrain elevation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainData {
    /// World X of the first sample column.
    pub(crate) origin_x: f32,
    /// World Z of the first sample row.
    pub(crate) origin_z: f32,
    /// Extent along X in world units
    pub(crate) width: f32,
    /// Extent along Z in world units
    pub(crate) depth: f32,
    /// Grid spacing along X in world units per sample
    pub(crate) resolution: f32,
    /// Grid spacing along Z in world units per sample
    pub(crate) resolution_z: f32,
    /// Number of samples along X
    pub(crate) nx: usize,
    /// Number of samples along Z
    pub(crate) nz: usize,
    /// Heights (row-major order: [z * nx + x])
    pub(crate) heights: Vec<f32>,
    pub(crate) min_elevation: f32,
    pub(crate) max_elevation: f32,
}

impl TerrainData {
    /// Build from a sampler `f(x, z)` evaluated at every grid point.
    fn sampled(width: f32, depth: f32, resolution: f32, f: impl Fn(f32, f32) -> f32) -> Self {
        let nx = (width / resolution).ceil() as usize + 1;
        let nz = (depth / resolution).ceil() as usize + 1;
        let mut heights = Vec::with_capacity(nx * nz);

        let mut min_elev = f32::MAX;
        let mut max_elev = f32::MIN;

        for iz in 0..nz {
            for ix in 0..nx {
                let x = ix as f32 * resolution;
                let z = iz as f32 * resolution;
                let elev = f(x, z);

                heights.push(elev);
                min_elev = min_elev.min(elev);
                max_elev = max_elev.max(elev);
            }
        }

        TerrainData {
            origin_x: 0.0,
            origin_z: 0.0,
            width: (nx - 1) as f32 * resolution,
            depth: (nz - 1) as f32 * resolution,
            resolution,
            resolution_z: resolution,
            nx,
            nz,
            heights,
            min_elevation: min_elev,
            max_elevation: max_elev,
        }
    }

    /// Create flat terrain at given elevation
    pub fn flat(width: f32, depth: f32, resolution: f32, elevation: f32) -> Self {
        Self::sampled(width, depth, resolution, |_, _| elevation)
    }

    /// Create terrain with a single Gaussian hill in the middle
    pub fn single_hill(
        width: f32,
        depth: f32,
        resolution: f32,
        base_elevation: f32,
        hill_height: f32,
        hill_radius: f32,
    ) -> Self {
        let center_x = width / 2.0;
        let center_z = depth / 2.0;

        Self::sampled(width, depth, resolution, |x, z| {
            let dx = x - center_x;
            let dz = z - center_z;
            let dist_sq = dx * dx + dz * dz;
            base_elevation + hill_height * (-dist_sq / (hill_radius * hill_radius)).exp()
        })
    }

    /// Create terrain with a valley between two hills
    pub fn valley_between_hills(
        width: f32,
        depth: f32,
        resolution: f32,
        base_elevation: f32,
        hill_height: f32,
    ) -> Self {
        let hill1_x = width * 0.25;
        let hill2_x = width * 0.75;
        let center_z = depth / 2.0;
        let hill_radius = width * 0.2;

        Self::sampled(width, depth, resolution, |x, z| {
            let dx1 = x - hill1_x;
            let dz = z - center_z;
            let height1 =
                hill_height * (-(dx1 * dx1 + dz * dz) / (hill_radius * hill_radius)).exp();

            let dx2 = x - hill2_x;
            let height2 =
                hill_height * (-(dx2 * dx2 + dz * dz) / (hill_radius * hill_radius)).exp();

            // Valley effect (negative between hills)
            let valley_x = (x - width / 2.0) / (width * 0.25);
            let valley_depth = -10.0 * (-(valley_x * valley_x)).exp();

            base_elevation + height1 + height2 + valley_depth
        })
    }

    /// Create terrain from a heightmap array
    ///
    /// # Arguments
    /// * `width` - Extent along X in world units
    /// * `depth` - Extent along Z in world units
    /// * `heightmap` - Samples in row-major order `[z * nx + x]`
    /// * `nx` - Number of samples along X
    /// * `nz` - Number of samples along Z
    /// * `elevation_scale` - Multiplier for heightmap values
    /// * `base_elevation` - Base elevation added to all heights
    ///
    /// # Errors
    /// Returns [`SceneError::InvalidHeightfield`] if either dimension is below 2,
    /// the sample count does not match `nx * nz`, the extents are not positive,
    /// or any sample is not finite.
    pub fn from_heightmap(
        width: f32,
        depth: f32,
        heightmap: &[f32],
        nx: usize,
        nz: usize,
        elevation_scale: f32,
        base_elevation: f32,
    ) -> Result<Self, SceneError> {
        if nx < 2 || nz < 2 {
            return Err(SceneError::invalid_heightfield(format!(
                "need at least 2x2 samples, got {nx}x{nz}"
            )));
        }
        if nx.checked_mul(nz) != Some(heightmap.len()) {
            return Err(SceneError::invalid_heightfield(format!(
                "expected {nx}x{nz} samples, got {}",
                heightmap.len()
            )));
        }
        if !(width.is_finite() && width > 0.0 && depth.is_finite() && depth > 0.0) {
            return Err(SceneError::invalid_heightfield(format!(
                "extent must be finite and positive, got {width}x{depth}"
            )));
        }
        if heightmap.iter().any(|h| !h.is_finite()) {
            return Err(SceneError::invalid_heightfield("heightmap contains non-finite samples"));
        }

        let mut min_elev = f32::MAX;
        let mut max_elev = f32::MIN;

        let heights: Vec<f32> = heightmap
            .iter()
            .map(|&h| {
                let elev = base_elevation + h * elevation_scale;
                min_elev = min_elev.min(elev);
                max_elev = max_elev.max(elev);
                elev
            })
            .collect();

        let resolution = width / (nx - 1) as f32;
        let resolution_z = depth / (nz - 1) as f32;

        Ok(TerrainData {
            origin_x: 0.0,
            origin_z: 0.0,
            width,
            depth,
            resolution,
            resolution_z,
            nx,
            nz,
            heights,
            min_elevation: min_elev,
            max_elevation: max_elev,
        })
    }

    /// Move the terrain so its first sample sits at world `(x, z)`.
    pub fn with_origin(mut self, x: f32, z: f32) -> Self {
        self.origin_x = x;
        self.origin_z = z;
        self
    }

    /// Whether world `(x, z)` lies on the terrain footprint.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let lx = x - self.origin_x;
        let lz = z - self.origin_z;
        (0.0..=self.width).contains(&lx) && (0.0..=self.depth).contains(&lz)
    }

    /// Elevation at world `(x, z)` using bilinear interpolation, or `None`
    /// outside the footprint.
    pub fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.contains(x, z) {
            return None;
        }

        let gx = (x - self.origin_x) / self.resolution;
        let gz = (z - self.origin_z) / self.resolution_z;

        let ix0 = (gx.floor() as usize).min(self.nx - 2);
        let iz0 = (gz.floor() as usize).min(self.nz - 2);
        let ix1 = ix0 + 1;
        let iz1 = iz0 + 1;

        let fx = (gx - ix0 as f32).clamp(0.0, 1.0);
        let fz = (gz - iz0 as f32).clamp(0.0, 1.0);

        let e00 = self.heights[iz0 * self.nx + ix0];
        let e10 = self.heights[iz0 * self.nx + ix1];
        let e01 = self.heights[iz1 * self.nx + ix0];
        let e11 = self.heights[iz1 * self.nx + ix1];

        let e0 = e00 * (1.0 - fx) + e10 * fx;
        let e1 = e01 * (1.0 - fx) + e11 * fx;
        Some(e0 * (1.0 - fz) + e1 * fz)
    }

    /// First downward crossing of the surface along a ray.
    ///
    /// Returns the surface point and its distance from `origin`. The surface
    /// is one-sided: rays starting below it, or travelling upward through it,
    /// do not hit. Vertical rays are solved exactly; oblique rays are marched
    /// at half the grid spacing and refined by bisection.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(Vec3, f32)> {
        if !(origin.iter().all(|c| c.is_finite()) && direction.iter().all(|c| c.is_finite())) {
            return None;
        }

        if direction.x.abs() < 1e-6 && direction.z.abs() < 1e-6 {
            if direction.y >= 0.0 {
                return None;
            }
            let h = self.elevation_at(origin.x, origin.z)?;
            if origin.y < h {
                return None;
            }
            let t = (origin.y - h) / -direction.y;
            return (t <= max_distance).then(|| (Vec3::new(origin.x, h, origin.z), t));
        }

        let (t_start, t_end) = self.march_window(origin, direction, max_distance)?;

        let height_above = |t: f32| -> Option<f32> {
            let p = origin + direction * t;
            self.elevation_at(p.x, p.z).map(|h| p.y - h)
        };

        // Half a cell of horizontal travel per step
        let horizontal = direction.x.hypot(direction.z);
        let step = 0.5 * self.resolution.min(self.resolution_z) / horizontal;
        let steps = ((t_end - t_start) / step).ceil() as usize;

        let mut prev_t = t_start;
        let mut prev_above = height_above(t_start).is_some_and(|d| d > 0.0);

        for i in 1..=steps {
            let t = (t_start + i as f32 * step).min(t_end);
            let Some(d) = height_above(t) else {
                prev_above = false;
                prev_t = t;
                continue;
            };

            if prev_above && d <= 0.0 {
                let mut lo = prev_t;
                let mut hi = t;
                for _ in 0..REFINE_STEPS {
                    let mid = 0.5 * (lo + hi);
                    if height_above(mid).is_some_and(|m| m > 0.0) {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                let p = origin + direction * hi;
                let h = self.elevation_at(p.x, p.z)?;
                return Some((Vec3::new(p.x, h, p.z), hi));
            }

            prev_above = d > 0.0;
            prev_t = t;
        }

        None
    }

    /// Parameter range of an oblique ray worth marching.
    ///
    /// Clipped to the XZ footprint and, for descending rays, to the band
    /// between `max_elevation` and `min_elevation`. The window is widened by
    /// a small margin so a crossing on its edge is still bracketed.
    fn march_window(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(f32, f32)> {
        let mut t_start = 0.0_f32;
        let mut t_end = max_distance;

        let axes = [
            (origin.x, direction.x, self.origin_x, self.width),
            (origin.z, direction.z, self.origin_z, self.depth),
        ];
        for (o, d, lo, extent) in axes {
            if d.abs() < 1e-12 {
                if !(lo..=lo + extent).contains(&o) {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (lo + extent - o) / d;
            t_start = t_start.max(t1.min(t2));
            t_end = t_end.min(t1.max(t2));
        }

        if direction.y < 0.0 {
            let t_top = (origin.y - self.max_elevation) / -direction.y;
            let t_bottom = (origin.y - self.min_elevation) / -direction.y;
            t_start = t_start.max(t_top);
            t_end = t_end.min(t_bottom);
        } else if origin.y > self.max_elevation {
            return None;
        }

        let margin = 1e-3 * (t_end - t_start).abs().max(1.0);
        let t_start = (t_start - margin).max(0.0);
        let t_end = (t_end + margin).min(max_distance);
        (t_start <= t_end).then_some((t_start, t_end))
    }

    /// Get terrain extent along X
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Get terrain extent along Z
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Get minimum elevation
    pub fn min_elevation(&self) -> f32 {
        self.min_elevation
    }

    /// Get maximum elevation
    pub fn max_elevation(&self) -> f32 {
        self.max_elevation
    }

    /// Grid spacing along X
    pub fn resolution(&self) -> f32 {
        self.resolution
    }
}
