//! Core types and utilities

pub mod hit;
pub mod probe;
pub mod vec3;

pub use hit::{CandidateHit, ColliderId, SurfaceKind};
pub use probe::{Probe, QueryFilter, TriggerInteraction, ALL_LAYERS};
pub use vec3::Vec3;
