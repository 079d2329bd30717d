use std::slice;

use terrain_snap_core::core_types::{Probe, SurfaceKind, TriggerInteraction};
use terrain_snap_core::{CandidateHit, ColliderId, SnapConfig, TerrainSnapper, Vec3};

use crate::error::{DefaultFfiError, TerrainSnapErrorCode};
use crate::helpers::{track_error, track_result};

/// C-compatible 3D vector. Y is up.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainSnapVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<TerrainSnapVec3> for Vec3 {
    fn from(v: TerrainSnapVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for TerrainSnapVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// One intersection reported by the engine's physics query.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSnapHit {
    /// World-space hit point.
    pub point: TerrainSnapVec3,
    /// Distance from the probe origin.
    pub distance: f32,
    /// 1 = terrain collider, 0 = any other collider.
    pub surface: u8,
    /// Engine collider handle, echoed back for diagnostics.
    pub collider: u32,
}

/// Vertical probe the engine should cast for one object.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainSnapProbe {
    pub origin: TerrainSnapVec3,
    /// Unit direction (straight down).
    pub direction: TerrainSnapVec3,
    /// Segment length.
    pub length: f32,
    /// Collision layers to test.
    pub layer_mask: u32,
    /// Whether trigger volumes should be reported.
    pub hit_triggers: bool,
}

impl From<Probe> for TerrainSnapProbe {
    fn from(probe: Probe) -> Self {
        Self {
            origin: probe.origin.into(),
            direction: probe.direction.into(),
            length: probe.length,
            layer_mask: probe.filter.layer_mask,
            hit_triggers: probe.filter.triggers == TriggerInteraction::Collide,
        }
    }
}

fn snapper(max_distance: f32) -> Result<TerrainSnapper, DefaultFfiError> {
    TerrainSnapper::new(SnapConfig::with_max_distance(max_distance)).map_err(DefaultFfiError::from)
}

fn to_candidate(index: usize, hit: &TerrainSnapHit) -> Result<CandidateHit, DefaultFfiError> {
    let surface = SurfaceKind::from_u8(hit.surface).ok_or_else(|| {
        DefaultFfiError::invalid_parameter(format!(
            "hits[{index}].surface must be 0 or 1, got {}",
            hit.surface
        ))
    })?;
    Ok(CandidateHit {
        point: hit.point.into(),
        surface,
        distance: hit.distance,
        collider: ColliderId(hit.collider),
    })
}

/// Compute the probe to cast for an object at `position`.
///
/// The probe starts `max_distance` above the object, points straight down
/// and is `2 * max_distance` long. Cast it against every layer with trigger
/// volumes ignored, collect every hit along the segment and pass them to
/// `terrain_snap_try_snap`.
///
/// Returns
/// - `TerrainSnapErrorCode::Ok` (0) with `out_probe` filled
/// - `TerrainSnapErrorCode::NullPointer` if `out_probe` is null
/// - `TerrainSnapErrorCode::InvalidParameter` if `max_distance` is not finite and positive
///
/// # Safety
/// `out_probe` must be null or a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_probe(
    position: TerrainSnapVec3,
    max_distance: f32,
    out_probe: *mut TerrainSnapProbe,
) -> TerrainSnapErrorCode {
    if out_probe.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_probe"));
    }

    match track_result(snapper(max_distance)) {
        Ok(snapper) => {
            unsafe {
                *out_probe = snapper.probe_for(position.into()).into();
            }
            TerrainSnapErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Pick the terrain height for an object from the hits along its probe.
///
/// Only hits with `surface == 1` within `max_distance` vertically of
/// `position` qualify; the one closest to the probe origin wins. On success
/// `out_found` tells whether a terrain hit qualified and `out_position` holds
/// `position` with its Y replaced (or `position` unchanged when nothing
/// qualified).
///
/// Returns
/// - `TerrainSnapErrorCode::Ok` (0) on success
/// - `TerrainSnapErrorCode::NullPointer` if an out pointer is null, or `hits` is null with `hit_count > 0`
/// - `TerrainSnapErrorCode::InvalidParameter` for a bad `max_distance` or surface value
///
/// # Safety
/// - `hits` must point to `hit_count` readable `TerrainSnapHit` values (may be null when `hit_count` is 0).
/// - `out_position` and `out_found` must be valid pointers to writable memory.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_try_snap(
    position: TerrainSnapVec3,
    max_distance: f32,
    hits: *const TerrainSnapHit,
    hit_count: usize,
    out_position: *mut TerrainSnapVec3,
    out_found: *mut bool,
) -> TerrainSnapErrorCode {
    if out_position.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_position"));
    }
    if out_found.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_found"));
    }
    if hits.is_null() && hit_count > 0 {
        return track_error(&DefaultFfiError::null_pointer("hits"));
    }

    let raw: &[TerrainSnapHit] = if hit_count == 0 {
        &[]
    } else {
        // SAFETY: non-null and `hit_count` elements long per the contract above.
        unsafe { slice::from_raw_parts(hits, hit_count) }
    };

    let result = snapper(max_distance).and_then(|snapper| {
        let candidates = raw
            .iter()
            .enumerate()
            .map(|(i, hit)| to_candidate(i, hit))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(snapper.try_snap(position.into(), &candidates))
    });

    match track_result(result) {
        Ok(snapped) => {
            unsafe {
                *out_found = snapped.is_some();
                *out_position = snapped.map_or(position, TerrainSnapVec3::from);
            }
            TerrainSnapErrorCode::Ok
        }
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::terrain_snap_get_last_error_code;
    use std::ptr;

    fn v(x: f32, y: f32, z: f32) -> TerrainSnapVec3 {
        TerrainSnapVec3 { x, y, z }
    }

    fn hit(y: f32, distance: f32, surface: u8) -> TerrainSnapHit {
        TerrainSnapHit {
            point: v(0.0, y, 0.0),
            distance,
            surface,
            collider: 0,
        }
    }

    #[test]
    fn probe_is_centred_on_position() {
        let mut probe = TerrainSnapProbe::default();
        let code = unsafe { terrain_snap_probe(v(1.0, 5.0, 2.0), 100.0, &mut probe) };

        assert_eq!(code, TerrainSnapErrorCode::Ok);
        assert_eq!(probe.origin, v(1.0, 105.0, 2.0));
        assert_eq!(probe.direction, v(0.0, -1.0, 0.0));
        assert_eq!(probe.length, 200.0);
        assert_eq!(probe.layer_mask, u32::MAX);
        assert!(!probe.hit_triggers);
    }

    #[test]
    fn probe_rejects_bad_distance() {
        let mut probe = TerrainSnapProbe::default();
        let code = unsafe { terrain_snap_probe(v(0.0, 0.0, 0.0), -1.0, &mut probe) };

        assert_eq!(code, TerrainSnapErrorCode::InvalidParameter);
        assert_eq!(terrain_snap_get_last_error_code(), TerrainSnapErrorCode::InvalidParameter);
    }

    #[test]
    fn picks_terrain_over_closer_prop() {
        let hits = [hit(10.0, 40.0, 1), hit(49.0, 1.0, 0)];
        let mut out = TerrainSnapVec3::default();
        let mut found = false;

        let code = unsafe {
            terrain_snap_try_snap(
                v(0.0, 50.0, 0.0),
                100.0,
                hits.as_ptr(),
                hits.len(),
                &mut out,
                &mut found,
            )
        };

        assert_eq!(code, TerrainSnapErrorCode::Ok);
        assert!(found);
        assert_eq!(out, v(0.0, 10.0, 0.0));
        assert_eq!(terrain_snap_get_last_error_code(), TerrainSnapErrorCode::Ok);
    }

    #[test]
    fn no_hits_is_not_an_error() {
        let mut out = TerrainSnapVec3::default();
        let mut found = true;

        let code = unsafe {
            terrain_snap_try_snap(v(3.0, 4.0, 5.0), 100.0, ptr::null(), 0, &mut out, &mut found)
        };

        assert_eq!(code, TerrainSnapErrorCode::Ok);
        assert!(!found);
        assert_eq!(out, v(3.0, 4.0, 5.0));
    }

    #[test]
    fn null_hits_with_count_is_rejected() {
        let mut out = TerrainSnapVec3::default();
        let mut found = false;

        let code = unsafe {
            terrain_snap_try_snap(v(0.0, 0.0, 0.0), 100.0, ptr::null(), 3, &mut out, &mut found)
        };

        assert_eq!(code, TerrainSnapErrorCode::NullPointer);
    }

    #[test]
    fn unknown_surface_is_rejected() {
        let hits = [hit(0.0, 1.0, 7)];
        let mut out = TerrainSnapVec3::default();
        let mut found = false;

        let code = unsafe {
            terrain_snap_try_snap(
                v(0.0, 0.0, 0.0),
                100.0,
                hits.as_ptr(),
                1,
                &mut out,
                &mut found,
            )
        };

        assert_eq!(code, TerrainSnapErrorCode::InvalidParameter);
    }
}
