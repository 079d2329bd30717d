//! C ABI for engine plugins.
//!
//! The engine owns physics, selection, undo and animation. It asks for a
//! probe, casts it with its own physics API, and hands the hits back to
//! `terrain_snap_try_snap`. Randomized start triggers are owned boxes driven
//! by `terrain_snap_trigger_update` each frame.
//!
//! Every fallible function returns a `TerrainSnapErrorCode`; details of the
//! last failure on the calling thread are available from
//! `terrain_snap_get_last_error`.

mod error;
mod helpers;
mod snap;
mod trigger;

pub use error::{terrain_snap_get_last_error, terrain_snap_get_last_error_code, TerrainSnapErrorCode};
pub use snap::{
    terrain_snap_probe, terrain_snap_try_snap, TerrainSnapHit, TerrainSnapProbe, TerrainSnapVec3,
};
pub use trigger::{
    terrain_snap_trigger_delay, terrain_snap_trigger_destroy, terrain_snap_trigger_is_pending,
    terrain_snap_trigger_new, terrain_snap_trigger_teardown, terrain_snap_trigger_update,
    TerrainSnapTrigger,
};
