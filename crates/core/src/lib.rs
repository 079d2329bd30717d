//! Terrain Snap Core Library
//!
//! Engine-agnostic logic behind an editor "align selected to terrain" tool
//! and a randomized animation start trigger.
//!
//! - [`snap`]: picks a ground height from the hits along a vertical probe
//! - [`host`]: collaborator traits the host engine implements (physics
//!   queries, undoable mutation, selection, view repaint)
//! - [`align`]: batch orchestration over a selection
//! - [`scene`]: in-memory reference host with heightfield terrain and undo
//! - [`trigger`]: one-shot randomized-delay animation trigger
//! - [`config`]: JSON configuration

// Core types and utilities
pub mod core_types;
pub mod error;

// Snapping and orchestration
pub mod align;
pub mod host;
pub mod snap;

// Reference host and gameplay trigger
pub mod config;
pub mod scene;
pub mod trigger;

// Re-export core types
pub use core_types::{CandidateHit, ColliderId, Probe, QueryFilter, SurfaceKind, Vec3};
pub use error::{ConfigError, SceneError, SnapError};

// Re-export snapping types
pub use align::{AlignOutcome, Aligner, HostPair};
pub use host::{MutationApplier, NoViews, ProbeProvider, SelectionSource, TargetId, ViewRefresher};
pub use snap::{try_snap, SnapConfig, SnapMatch, TerrainSnapper, TieBreak};

pub use config::ToolConfig;
pub use scene::{RedrawCounter, Scene, SceneObject, TerrainData};
pub use trigger::{AnimationController, RandomStartTrigger, TriggerConfig, TriggerState};
