//! In-memory reference host.
//!
//! A small scene of heightfield terrain, box colliders and movable objects
//! that implements the host collaborators. Headless tools and tests use it
//! in place of an editor's physics engine and undo system.

pub mod collider;
pub mod description;
pub mod terrain;
pub mod undo;

pub use collider::BoxCollider;
pub use description::{SceneDescription, TerrainShape, TerrainSpec};
pub use terrain::TerrainData;
pub use undo::{UndoGroup, UndoRecord, UndoStack};

use crate::core_types::{CandidateHit, ColliderId, Probe, Vec3};
use crate::error::SceneError;
use crate::host::{MutationApplier, ProbeProvider, SelectionSource, TargetId, ViewRefresher};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Movable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique id.
    pub id: TargetId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// World position (pivot).
    pub position: Vec3,
    /// Half-extents of a box collider that follows the object.
    #[serde(default)]
    pub half_extents: Option<Vec3>,
    /// Collision layer of the attached collider.
    #[serde(default)]
    pub layer: u8,
}

impl SceneObject {
    /// Object without a collider.
    pub fn new(id: u32, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: TargetId(id),
            name: name.into(),
            position,
            half_extents: None,
            layer: 0,
        }
    }

    /// Attach a box collider centred on the object.
    pub fn with_box(mut self, half_extents: Vec3) -> Self {
        self.half_extents = Some(half_extents);
        self
    }

    /// Current world-space collider, if any.
    pub fn collider(&self) -> Option<BoxCollider> {
        self.half_extents
            .map(|he| BoxCollider::centered(self.position, he).on_layer(self.layer))
    }
}

/// Terrain heightfield registered in a scene.
#[derive(Debug, Clone)]
pub struct TerrainCollider {
    /// Collider id reported in hits.
    pub id: ColliderId,
    /// Heightfield.
    pub terrain: TerrainData,
    /// Collision layer.
    pub layer: u8,
}

/// Counts redraw requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawCounter {
    /// Number of requests received.
    pub requests: usize,
}

impl ViewRefresher for RedrawCounter {
    fn request_redraw(&mut self) {
        self.requests += 1;
    }
}

/// Reference scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    terrains: Vec<TerrainCollider>,
    boxes: Vec<(ColliderId, BoxCollider)>,
    objects: FxHashMap<TargetId, SceneObject>,
    object_colliders: FxHashMap<TargetId, ColliderId>,
    selection: Vec<TargetId>,
    undo: UndoStack,
    dirty: FxHashSet<TargetId>,
    next_collider: u32,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from a description.
    ///
    /// # Errors
    /// Returns [`SceneError`] for invalid heightfields, duplicate object ids,
    /// or a selection naming an unknown object.
    pub fn from_description(description: &SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Scene::new();

        for spec in &description.terrains {
            let terrain = spec.shape.build()?.with_origin(spec.origin[0], spec.origin[1]);
            scene.add_terrain_on_layer(terrain, spec.layer);
        }
        for collider in &description.colliders {
            scene.add_box(*collider);
        }
        for object in &description.objects {
            scene.add_object(object.clone())?;
        }

        match &description.selection {
            Some(ids) => {
                let ids: Vec<TargetId> = ids.iter().map(|&id| TargetId(id)).collect();
                scene.select(&ids)?;
            }
            None => scene.select_all(),
        }

        Ok(scene)
    }

    /// Load a JSON scene description.
    ///
    /// # Errors
    /// Returns [`SceneError`] if the file cannot be read or parsed, or if the
    /// description is invalid.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        let description: SceneDescription = serde_json::from_str(&contents)?;
        Self::from_description(&description)
    }

    fn next_collider_id(&mut self) -> ColliderId {
        let id = ColliderId(self.next_collider);
        self.next_collider += 1;
        id
    }

    /// Add terrain on layer 0.
    pub fn add_terrain(&mut self, terrain: TerrainData) -> ColliderId {
        self.add_terrain_on_layer(terrain, 0)
    }

    /// Add terrain on a collision layer.
    pub fn add_terrain_on_layer(&mut self, terrain: TerrainData, layer: u8) -> ColliderId {
        let id = self.next_collider_id();
        self.terrains.push(TerrainCollider { id, terrain, layer });
        id
    }

    /// Add a static box collider.
    pub fn add_box(&mut self, collider: BoxCollider) -> ColliderId {
        let id = self.next_collider_id();
        self.boxes.push((id, collider));
        id
    }

    /// Add a movable object.
    ///
    /// # Errors
    /// Returns [`SceneError::DuplicateObject`] if the id is taken.
    pub fn add_object(&mut self, object: SceneObject) -> Result<TargetId, SceneError> {
        let id = object.id;
        if self.objects.contains_key(&id) {
            return Err(SceneError::DuplicateObject(id.0));
        }
        if object.half_extents.is_some() {
            let collider = self.next_collider_id();
            self.object_colliders.insert(id, collider);
        }
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Object by id.
    pub fn object(&self, id: TargetId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// All object ids in ascending order.
    pub fn object_ids(&self) -> Vec<TargetId> {
        let mut ids: Vec<TargetId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Registered terrains.
    pub fn terrains(&self) -> &[TerrainCollider] {
        &self.terrains
    }

    /// Replace the selection.
    ///
    /// # Errors
    /// Returns [`SceneError::UnknownSelection`] if an id is not in the scene;
    /// the selection is left unchanged.
    pub fn select(&mut self, ids: &[TargetId]) -> Result<(), SceneError> {
        if let Some(missing) = ids.iter().find(|id| !self.objects.contains_key(id)) {
            return Err(SceneError::UnknownSelection(missing.0));
        }
        self.selection = ids.to_vec();
        Ok(())
    }

    /// Select every object in id order.
    pub fn select_all(&mut self) {
        self.selection = self.object_ids();
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Current selection.
    pub fn selection(&self) -> &[TargetId] {
        &self.selection
    }

    /// Whether `id` changed since the last [`Scene::clear_dirty`].
    pub fn is_dirty(&self, id: TargetId) -> bool {
        self.dirty.contains(&id)
    }

    /// Number of changed objects.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Forget change tracking, e.g. after saving.
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Undo history.
    pub fn history(&self) -> &UndoStack {
        &self.undo
    }

    /// Revert the most recent undo group. Returns the number of objects moved back.
    pub fn undo(&mut self) -> usize {
        let Some(group) = self.undo.take_undo() else {
            return 0;
        };
        for record in group.records.iter().rev() {
            self.set_position(record.target, record.before);
        }
        tracing::debug!("Undo {}: {} object(s)", group.label, group.records.len());
        group.records.len()
    }

    /// Reapply the most recently undone group. Returns the number of objects moved.
    pub fn redo(&mut self) -> usize {
        let Some(group) = self.undo.take_redo() else {
            return 0;
        };
        for record in &group.records {
            self.set_position(record.target, record.after);
        }
        tracing::debug!("Redo {}: {} object(s)", group.label, group.records.len());
        group.records.len()
    }

    fn set_position(&mut self, id: TargetId, position: Vec3) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.position = position;
            self.dirty.insert(id);
        }
    }
}

impl ProbeProvider for Scene {
    fn cast(&self, probe: &Probe) -> Vec<CandidateHit> {
        if !probe.is_valid() {
            return Vec::new();
        }
        let filter = probe.filter;
        let mut hits = Vec::new();

        for tc in &self.terrains {
            if !filter.accepts(tc.layer, false) {
                continue;
            }
            if let Some((point, distance)) =
                tc.terrain.raycast(probe.origin, probe.direction, probe.length)
            {
                hits.push(CandidateHit::terrain(point, distance).with_collider(tc.id));
            }
        }

        for (id, collider) in &self.boxes {
            if !filter.accepts(collider.layer, collider.is_trigger) {
                continue;
            }
            if let Some(t) = collider.raycast(probe.origin, probe.direction, probe.length) {
                hits.push(CandidateHit::other(probe.point_at(t), t).with_collider(*id));
            }
        }

        for (target, collider_id) in &self.object_colliders {
            let Some(collider) = self.objects.get(target).and_then(SceneObject::collider) else {
                continue;
            };
            if !filter.accepts(collider.layer, false) {
                continue;
            }
            if let Some(t) = collider.raycast(probe.origin, probe.direction, probe.length) {
                hits.push(CandidateHit::other(probe.point_at(t), t).with_collider(*collider_id));
            }
        }

        hits
    }
}

impl MutationApplier for Scene {
    fn position_of(&self, target: TargetId) -> Option<Vec3> {
        self.objects.get(&target).map(|o| o.position)
    }

    fn apply_position(&mut self, target: TargetId, position: Vec3, label: &str) {
        let Some(before) = self.position_of(target) else {
            return;
        };
        self.undo.record(
            label,
            UndoRecord {
                target,
                before,
                after: position,
            },
        );
        self.set_position(target, position);
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.undo.begin_group(label);
    }

    fn end_undo_group(&mut self) {
        self.undo.end_group();
    }
}

impl SelectionSource for Scene {
    fn selected_targets(&self) -> Vec<TargetId> {
        self.selection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{QueryFilter, TriggerInteraction};

    fn scene_with_ground(height: f32) -> Scene {
        let mut scene = Scene::new();
        scene.add_terrain(TerrainData::flat(100.0, 100.0, 5.0, height));
        scene
    }

    #[test]
    fn cast_reports_terrain_and_boxes() {
        let mut scene = scene_with_ground(0.0);
        scene.add_box(BoxCollider::centered(
            Vec3::new(50.0, 10.0, 50.0),
            Vec3::new(2.0, 2.0, 2.0),
        ));

        let hits = scene.cast(&Probe::vertical_through(Vec3::new(50.0, 20.0, 50.0), 100.0));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits.iter().filter(|h| h.is_terrain()).count(), 1);
        let other = hits.iter().find(|h| !h.is_terrain()).unwrap();
        assert_eq!(other.point.y, 12.0);
        assert_eq!(other.distance, 108.0);
    }

    #[test]
    fn triggers_and_masked_layers_are_filtered() {
        let mut scene = Scene::new();
        scene.add_terrain_on_layer(TerrainData::flat(10.0, 10.0, 1.0, 0.0), 8);
        scene.add_box(
            BoxCollider::centered(Vec3::new(5.0, 5.0, 5.0), Vec3::new(1.0, 1.0, 1.0)).as_trigger(),
        );
        let probe = Probe::vertical_through(Vec3::new(5.0, 0.0, 5.0), 50.0);

        assert_eq!(scene.cast(&probe).len(), 1);

        let with_triggers = probe.with_filter(QueryFilter {
            triggers: TriggerInteraction::Collide,
            ..QueryFilter::default()
        });
        assert_eq!(scene.cast(&with_triggers).len(), 2);

        let masked = probe.with_filter(QueryFilter {
            layer_mask: !(1 << 8),
            ..QueryFilter::default()
        });
        assert!(scene.cast(&masked).is_empty());
    }

    #[test]
    fn apply_records_undo_and_dirty() {
        let mut scene = scene_with_ground(0.0);
        let id = scene
            .add_object(SceneObject::new(1, "crate", Vec3::new(10.0, 30.0, 10.0)))
            .unwrap();

        scene.begin_undo_group("Align To Terrain");
        scene.apply_position(id, Vec3::new(10.0, 0.0, 10.0), "Align To Terrain");

        assert!(scene.is_dirty(id));
        assert_eq!(scene.position_of(id), Some(Vec3::new(10.0, 0.0, 10.0)));
        assert_eq!(scene.history().peek_undo_label(), Some("Align To Terrain"));

        assert_eq!(scene.undo(), 1);
        assert_eq!(scene.position_of(id), Some(Vec3::new(10.0, 30.0, 10.0)));
        assert_eq!(scene.redo(), 1);
        assert_eq!(scene.position_of(id), Some(Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn duplicate_and_unknown_ids_are_rejected() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(1, "a", Vec3::zeros())).unwrap();
        assert!(scene.add_object(SceneObject::new(1, "b", Vec3::zeros())).is_err());
        assert!(scene.select(&[TargetId(2)]).is_err());
        assert!(scene.select(&[TargetId(1)]).is_ok());
        assert_eq!(scene.selected_targets(), vec![TargetId(1)]);
    }

    #[test]
    fn object_collider_follows_object() {
        let mut scene = scene_with_ground(0.0);
        let id = scene
            .add_object(
                SceneObject::new(3, "rock", Vec3::new(20.0, 5.0, 20.0))
                    .with_box(Vec3::new(1.0, 1.0, 1.0)),
            )
            .unwrap();
        let probe = Probe::vertical_through(Vec3::new(20.0, 5.0, 20.0), 100.0);
        let top = |scene: &Scene| {
            scene
                .cast(&probe)
                .into_iter()
                .find(|h| !h.is_terrain())
                .map(|h| h.point.y)
        };

        assert_eq!(top(&scene), Some(6.0));
        scene.apply_position(id, Vec3::new(20.0, 1.0, 20.0), "Move");
        assert_eq!(top(&scene), Some(2.0));
    }

    #[test]
    fn description_round_trip_through_json() {
        let json = r#"{
            "terrains": [
                { "kind": "flat", "width": 50, "depth": 50, "resolution": 5, "elevation": 2, "origin": [-25, -25] }
            ],
            "colliders": [ { "min": [0, 0, 0], "max": [1, 1, 1] } ],
            "objects": [
                { "id": 1, "name": "a", "position": [0, 10, 0] },
                { "id": 2, "position": [5, 10, 5], "half_extents": [0.5, 0.5, 0.5] }
            ],
            "selection": [2]
        }"#;
        let description: SceneDescription = serde_json::from_str(json).unwrap();
        let scene = Scene::from_description(&description).unwrap();

        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.selection(), &[TargetId(2)]);
        assert_eq!(scene.terrains()[0].terrain.elevation_at(-20.0, 20.0), Some(2.0));
    }

    #[test]
    fn bad_terrain_in_description_fails() {
        let description = SceneDescription {
            terrains: vec![TerrainSpec {
                shape: TerrainShape::Flat {
                    width: 10.0,
                    depth: 10.0,
                    resolution: 0.0,
                    elevation: 0.0,
                },
                origin: [0.0, 0.0],
                layer: 0,
            }],
            ..SceneDescription::default()
        };
        assert!(matches!(
            Scene::from_description(&description),
            Err(SceneError::InvalidHeightfield(_))
        ));
    }
}
