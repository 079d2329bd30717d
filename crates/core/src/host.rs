//! Host engine collaborators.
//!
//! The snapper never touches an engine directly. Physics queries, object
//! mutation with undo, the user's selection and view repaints are injected
//! through these traits. [`crate::scene::Scene`] implements them for tests
//! and headless tools, with [`crate::scene::RedrawCounter`] as the view hook.

use crate::core_types::{CandidateHit, Probe, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of a scene object that can be aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physics query backend.
pub trait ProbeProvider {
    /// Every intersection along `probe`, at most one per collider, in no
    /// particular order. Returns an empty vector when nothing is hit.
    fn cast(&self, probe: &Probe) -> Vec<CandidateHit>;
}

/// Applies computed positions to targets.
pub trait MutationApplier {
    /// Current world position of `target`, or `None` if it no longer exists.
    fn position_of(&self, target: TargetId) -> Option<Vec3>;

    /// Move `target` to `position`.
    ///
    /// Implementations must make the move undoable as a single inverse
    /// operation recorded under `label`, and mark the target as changed so the
    /// host persists it.
    fn apply_position(&mut self, target: TargetId, position: Vec3, label: &str);

    /// Start a new undo group; every `apply_position` until the next call is
    /// reverted together.
    fn begin_undo_group(&mut self, _label: &str) {}

    /// Close the group opened by `begin_undo_group`. Later moves, even under
    /// the same label, start a fresh group.
    fn end_undo_group(&mut self) {}
}

/// Supplies the objects an invocation should process.
pub trait SelectionSource {
    /// Currently selected targets. Empty means there is nothing to do.
    fn selected_targets(&self) -> Vec<TargetId>;
}

/// Interactive view repaint hook.
pub trait ViewRefresher {
    /// Ask every interactive view to redraw.
    fn request_redraw(&mut self);
}

/// Refresher for hosts without interactive views.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViews;

impl ViewRefresher for NoViews {
    fn request_redraw(&mut self) {}
}

impl<T: ProbeProvider + ?Sized> ProbeProvider for &T {
    fn cast(&self, probe: &Probe) -> Vec<CandidateHit> {
        (**self).cast(probe)
    }
}

impl SelectionSource for [TargetId] {
    fn selected_targets(&self) -> Vec<TargetId> {
        self.to_vec()
    }
}

impl SelectionSource for Vec<TargetId> {
    fn selected_targets(&self) -> Vec<TargetId> {
        self.clone()
    }
}

/// Fixed list of hits returned for every probe.
impl ProbeProvider for [CandidateHit] {
    fn cast(&self, _probe: &Probe) -> Vec<CandidateHit> {
        self.to_vec()
    }
}
