use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ptr;
use std::sync::Mutex;

use terrain_snap_core::{RandomStartTrigger, TriggerConfig, TriggerState};

use crate::error::{DefaultFfiError, TerrainSnapErrorCode};
use crate::helpers::{track_error, track_result};

/// A randomized start trigger owned by the engine.
///
/// The instance is armed on creation: it has already drawn its delay. The
/// engine calls `terrain_snap_trigger_update` every frame and sets its own
/// animator trigger (e.g. `"Start"`) on the frame `out_fired` reports true.
///
/// # Thread Safety
/// The trigger is protected by a `Mutex`, so updates may come from any thread.
pub struct TerrainSnapTrigger {
    pub(crate) inner: Mutex<RandomStartTrigger>,
}

impl TerrainSnapTrigger {
    pub(crate) fn new(
        min_delay: f32,
        max_delay: f32,
        seed: u64,
    ) -> Result<Self, DefaultFfiError> {
        let config = TriggerConfig::with_delay_range(min_delay, max_delay);
        let mut trigger = RandomStartTrigger::new(config)?;
        trigger.activate(&mut StdRng::seed_from_u64(seed));
        Ok(Self {
            inner: Mutex::new(trigger),
        })
    }

    fn with_trigger<T>(
        &self,
        f: impl FnOnce(&mut RandomStartTrigger) -> T,
    ) -> Result<T, DefaultFfiError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| DefaultFfiError::lock_poisoned("Mutex"))?;
        Ok(f(&mut guard))
    }
}

/// Create an armed trigger and return it via out-parameter.
///
/// The delay is drawn uniformly from `[min_delay, max_delay]` seconds using a
/// generator seeded with `seed`. Give each spawned character its own seed.
///
/// Returns
/// - `TerrainSnapErrorCode::Ok` (0) with a valid instance in `out_trigger`
/// - `TerrainSnapErrorCode::NullPointer` if `out_trigger` is null
/// - `TerrainSnapErrorCode::InvalidParameter` if the range is not finite with `0 <= min <= max`;
///   `out_trigger` is set to null
///
/// # Safety
/// - `out_trigger` must be a valid pointer to writable memory.
/// - The caller owns the instance and MUST call `terrain_snap_trigger_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_new(
    min_delay: f32,
    max_delay: f32,
    seed: u64,
    out_trigger: *mut *mut TerrainSnapTrigger,
) -> TerrainSnapErrorCode {
    if out_trigger.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_trigger"));
    }

    match track_result(TerrainSnapTrigger::new(min_delay, max_delay, seed)) {
        Ok(instance) => {
            unsafe {
                *out_trigger = Box::into_raw(Box::new(instance));
            }
            TerrainSnapErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_trigger = ptr::null_mut();
            }
            code
        }
    }
}

/// Advance the trigger by `dt` seconds.
///
/// `out_fired` is set to true exactly once, on the update where the delay
/// elapses. Negative or non-finite `dt` counts as zero.
///
/// # Safety
/// - `trigger` must be null or a pointer returned by `terrain_snap_trigger_new` that was not destroyed.
/// - `out_fired` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_update(
    trigger: *const TerrainSnapTrigger,
    dt: f32,
    out_fired: *mut bool,
) -> TerrainSnapErrorCode {
    if trigger.is_null() {
        return track_error(&DefaultFfiError::null_pointer("trigger"));
    }
    if out_fired.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_fired"));
    }

    // SAFETY: checked non-null; validity is the caller's contract.
    let instance = unsafe { &*trigger };
    match track_result(instance.with_trigger(|t| t.update(dt, None))) {
        Ok(fired) => {
            unsafe {
                *out_fired = fired;
            }
            TerrainSnapErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Read the delay drawn at creation, in seconds.
///
/// # Safety
/// - `trigger` must be null or a live pointer returned by `terrain_snap_trigger_new`.
/// - `out_delay` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_delay(
    trigger: *const TerrainSnapTrigger,
    out_delay: *mut f32,
) -> TerrainSnapErrorCode {
    if trigger.is_null() {
        return track_error(&DefaultFfiError::null_pointer("trigger"));
    }
    if out_delay.is_null() {
        return track_error(&DefaultFfiError::null_pointer("out_delay"));
    }

    let instance = unsafe { &*trigger };
    match track_result(instance.with_trigger(|t| t.delay().unwrap_or(0.0))) {
        Ok(delay) => {
            unsafe {
                *out_delay = delay;
            }
            TerrainSnapErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Cancel a trigger whose owner is being torn down. A trigger that already
/// fired is unaffected; a pending one never fires.
///
/// # Safety
/// `trigger` must be null or a live pointer returned by `terrain_snap_trigger_new`.
/// Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_teardown(trigger: *const TerrainSnapTrigger) {
    if trigger.is_null() {
        return;
    }
    let instance = unsafe { &*trigger };
    let _ = track_result(instance.with_trigger(RandomStartTrigger::teardown));
}

/// Whether the trigger is still waiting to fire.
///
/// Returns false for null, fired or cancelled triggers.
///
/// # Safety
/// `trigger` must be null or a live pointer returned by `terrain_snap_trigger_new`.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_is_pending(trigger: *const TerrainSnapTrigger) -> bool {
    if trigger.is_null() {
        return false;
    }
    let instance = unsafe { &*trigger };
    instance
        .with_trigger(|t| matches!(t.state(), TriggerState::Pending { .. }))
        .unwrap_or(false)
}

/// Destroy a trigger previously created by `terrain_snap_trigger_new`.
///
/// # Safety
/// - The pointer MUST have been created by `terrain_snap_trigger_new` and not freed already.
/// - The caller must not use the pointer afterwards.
/// - Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn terrain_snap_trigger_destroy(trigger: *mut TerrainSnapTrigger) {
    if trigger.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `terrain_snap_trigger_new`.
    unsafe {
        drop(Box::from_raw(trigger));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::terrain_snap_get_last_error;

    fn create(min: f32, max: f32, seed: u64) -> *mut TerrainSnapTrigger {
        let mut out = ptr::null_mut();
        let code = unsafe { terrain_snap_trigger_new(min, max, seed, &mut out) };
        assert_eq!(code, TerrainSnapErrorCode::Ok);
        assert!(!out.is_null());
        out
    }

    fn step(trigger: *const TerrainSnapTrigger, dt: f32) -> bool {
        let mut fired = false;
        let code = unsafe { terrain_snap_trigger_update(trigger, dt, &mut fired) };
        assert_eq!(code, TerrainSnapErrorCode::Ok);
        fired
    }

    #[test]
    fn fires_once_after_delay() {
        let trigger = create(0.5, 1.0, 9);
        let mut delay = 0.0;
        assert_eq!(
            unsafe { terrain_snap_trigger_delay(trigger, &mut delay) },
            TerrainSnapErrorCode::Ok
        );
        assert!((0.5..=1.0).contains(&delay));

        assert!(!step(trigger, 0.25));
        assert!(unsafe { terrain_snap_trigger_is_pending(trigger) });
        assert!(step(trigger, 1.0));
        assert!(!step(trigger, 1.0));
        assert!(!unsafe { terrain_snap_trigger_is_pending(trigger) });

        unsafe { terrain_snap_trigger_destroy(trigger) };
    }

    #[test]
    fn teardown_cancels() {
        let trigger = create(1.0, 2.0, 1);
        unsafe { terrain_snap_trigger_teardown(trigger) };
        assert!(!step(trigger, 10.0));
        unsafe { terrain_snap_trigger_destroy(trigger) };
    }

    #[test]
    fn invalid_range_nulls_output() {
        let mut out = ptr::NonNull::<TerrainSnapTrigger>::dangling().as_ptr();
        let code = unsafe { terrain_snap_trigger_new(2.0, 1.0, 0, &mut out) };

        assert_eq!(code, TerrainSnapErrorCode::InvalidParameter);
        assert!(out.is_null());
        assert!(!terrain_snap_get_last_error().is_null());
    }

    #[test]
    fn null_handles_are_tolerated() {
        let mut fired = true;
        let code = unsafe { terrain_snap_trigger_update(ptr::null(), 0.1, &mut fired) };
        assert_eq!(code, TerrainSnapErrorCode::NullPointer);

        unsafe {
            terrain_snap_trigger_teardown(ptr::null());
            terrain_snap_trigger_destroy(ptr::null_mut());
        }
    }
}
