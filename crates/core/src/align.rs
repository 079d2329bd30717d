//! Batch alignment of selected objects onto terrain.
//!
//! Each invocation snaps every target independently, applies the moves as
//! one undo group and reports how many objects moved. Empty selections and
//! "nothing found" are ordinary outcomes, not errors.

use crate::core_types::{CandidateHit, Probe, Vec3};
use crate::host::{MutationApplier, ProbeProvider, SelectionSource, TargetId, ViewRefresher};
use crate::snap::{TerrainSnapper, ALIGN_UNDO_LABEL};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Result of one alignment invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOutcome {
    /// The selection was empty; nothing was processed.
    NoSelection,
    /// No target had terrain within range.
    NoTerrainFound {
        /// Targets that were probed.
        examined: usize,
    },
    /// At least one target moved.
    Moved {
        /// Targets that moved.
        moved: usize,
        /// Targets that were probed.
        examined: usize,
    },
}

impl AlignOutcome {
    /// Number of targets that moved.
    pub fn moved_count(&self) -> usize {
        match *self {
            AlignOutcome::Moved { moved, .. } => moved,
            AlignOutcome::NoSelection | AlignOutcome::NoTerrainFound { .. } => 0,
        }
    }
}

/// Planned move for one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMove {
    /// Target being aligned.
    pub target: TargetId,
    /// Position before alignment.
    pub start: Vec3,
    /// Corrected position, or `None` when no terrain was found.
    pub snapped: Option<Vec3>,
}

/// Joins separate probe and mutation collaborators into one host.
pub struct HostPair<'a, P: ?Sized, M: ?Sized> {
    /// Physics query backend.
    pub probes: &'a P,
    /// Mutation backend.
    pub mutations: &'a mut M,
}

impl<P, M> ProbeProvider for HostPair<'_, P, M>
where
    P: ProbeProvider + ?Sized,
    M: ?Sized,
{
    fn cast(&self, probe: &Probe) -> Vec<CandidateHit> {
        self.probes.cast(probe)
    }
}

impl<P, M> MutationApplier for HostPair<'_, P, M>
where
    P: ?Sized,
    M: MutationApplier + ?Sized,
{
    fn position_of(&self, target: TargetId) -> Option<Vec3> {
        self.mutations.position_of(target)
    }

    fn apply_position(&mut self, target: TargetId, position: Vec3, label: &str) {
        self.mutations.apply_position(target, position, label);
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.mutations.begin_undo_group(label);
    }

    fn end_undo_group(&mut self) {
        self.mutations.end_undo_group();
    }
}

/// Runs the snapper over a list of targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    snapper: TerrainSnapper,
}

impl Aligner {
    /// Create an aligner around a configured snapper.
    pub fn new(snapper: TerrainSnapper) -> Self {
        Self { snapper }
    }

    /// Snapper used for every target.
    pub fn snapper(&self) -> &TerrainSnapper {
        &self.snapper
    }

    /// Align whatever `selection` reports as selected.
    pub fn align_selection<S, H, V>(&self, selection: &S, host: &mut H, views: &mut V) -> AlignOutcome
    where
        S: SelectionSource + ?Sized,
        H: ProbeProvider + MutationApplier + ?Sized,
        V: ViewRefresher + ?Sized,
    {
        let targets = selection.selected_targets();
        self.align_targets(&targets, host, views)
    }

    /// Align `targets` one after another.
    pub fn align_targets<H, V>(&self, targets: &[TargetId], host: &mut H, views: &mut V) -> AlignOutcome
    where
        H: ProbeProvider + MutationApplier + ?Sized,
        V: ViewRefresher + ?Sized,
    {
        if targets.is_empty() {
            warn!("No objects selected.");
            return AlignOutcome::NoSelection;
        }

        let starts = collect_positions(targets, &*host);
        let plan: Vec<PlannedMove> = starts
            .iter()
            .map(|&(target, start)| PlannedMove {
                target,
                start,
                snapped: self.snapper.snap_with(&*host, start),
            })
            .collect();

        self.apply_plan(&plan, host, views)
    }

    /// Align `targets`, probing in parallel.
    ///
    /// Probes run on the rayon pool against a shared borrow of `host`; moves
    /// are then applied on the calling thread in target order, so the result
    /// matches [`Aligner::align_targets`].
    pub fn align_targets_parallel<H, V>(
        &self,
        targets: &[TargetId],
        host: &mut H,
        views: &mut V,
    ) -> AlignOutcome
    where
        H: ProbeProvider + MutationApplier + Sync + ?Sized,
        V: ViewRefresher + ?Sized,
    {
        if targets.is_empty() {
            warn!("No objects selected.");
            return AlignOutcome::NoSelection;
        }

        let plan = {
            let shared: &H = host;
            let starts = collect_positions(targets, shared);
            self.plan_parallel(shared, &starts)
        };

        self.apply_plan(&plan, host, views)
    }

    /// Compute moves for known start positions on the rayon pool.
    pub fn plan_parallel<P>(&self, probes: &P, starts: &[(TargetId, Vec3)]) -> Vec<PlannedMove>
    where
        P: ProbeProvider + Sync + ?Sized,
    {
        starts
            .par_iter()
            .map(|&(target, start)| PlannedMove {
                target,
                start,
                snapped: self.snapper.snap_with(probes, start),
            })
            .collect()
    }

    fn apply_plan<M, V>(&self, plan: &[PlannedMove], host: &mut M, views: &mut V) -> AlignOutcome
    where
        M: MutationApplier + ?Sized,
        V: ViewRefresher + ?Sized,
    {
        let mut moved = 0;
        for planned in plan {
            let Some(position) = planned.snapped else {
                debug!("{}: no terrain in range", planned.target);
                continue;
            };
            if moved == 0 {
                host.begin_undo_group(ALIGN_UNDO_LABEL);
            }
            host.apply_position(planned.target, position, ALIGN_UNDO_LABEL);
            debug!(
                "{}: y {:.3} -> {:.3}",
                planned.target, planned.start.y, position.y
            );
            moved += 1;
        }

        let examined = plan.len();
        if moved > 0 {
            host.end_undo_group();
            info!("AlignToTerrain: moved {moved} object(s).");
            views.request_redraw();
            AlignOutcome::Moved { moved, examined }
        } else {
            info!(
                "AlignToTerrain: no terrain within {} units for selected objects.",
                self.snapper.max_vertical_distance()
            );
            AlignOutcome::NoTerrainFound { examined }
        }
    }
}

fn collect_positions<M>(targets: &[TargetId], host: &M) -> Vec<(TargetId, Vec3)>
where
    M: MutationApplier + ?Sized,
{
    targets
        .iter()
        .filter_map(|&target| match host.position_of(target) {
            Some(position) => Some((target, position)),
            None => {
                debug!("{target}: not found, skipping");
                None
            }
        })
        .collect()
}
