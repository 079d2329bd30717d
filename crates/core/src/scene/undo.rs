//! Grouped undo history for object moves.

use crate::core_types::Vec3;
use crate::host::TargetId;

/// One recorded move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UndoRecord {
    /// Object that moved.
    pub target: TargetId,
    /// Position before the move.
    pub before: Vec3,
    /// Position after the move.
    pub after: Vec3,
}

/// Moves reverted together by a single undo.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoGroup {
    /// Label shown in the host's undo menu.
    pub label: String,
    /// Moves in the order they were applied.
    pub records: Vec<UndoRecord>,
}

/// Undo and redo stacks.
///
/// Records go into the open group; a record with a different label than the
/// open group starts a new one. Recording anything clears the redo stack.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo: Vec<UndoGroup>,
    redo: Vec<UndoGroup>,
    open: bool,
}

impl UndoStack {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the open group and start a new one named `label`.
    pub fn begin_group(&mut self, label: &str) {
        self.drop_empty_top();
        self.undo.push(UndoGroup {
            label: label.to_owned(),
            records: Vec::new(),
        });
        self.open = true;
    }

    /// Close the open group; the next record starts a new one.
    pub fn end_group(&mut self) {
        self.drop_empty_top();
        self.open = false;
    }

    /// Record a move under `label`.
    pub fn record(&mut self, label: &str, record: UndoRecord) {
        let reuse = self.open && self.undo.last().is_some_and(|g| g.label == label);
        if !reuse {
            self.begin_group(label);
        }
        if let Some(group) = self.undo.last_mut() {
            group.records.push(record);
        }
        self.redo.clear();
    }

    /// Take the most recent group for reverting; it moves to the redo stack.
    pub fn take_undo(&mut self) -> Option<UndoGroup> {
        self.end_group();
        let group = self.undo.pop()?;
        self.redo.push(group.clone());
        Some(group)
    }

    /// Take the most recently undone group for reapplying; it moves back to
    /// the undo stack.
    pub fn take_redo(&mut self) -> Option<UndoGroup> {
        self.end_group();
        let group = self.redo.pop()?;
        self.undo.push(group.clone());
        Some(group)
    }

    /// Number of groups that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo.iter().filter(|g| !g.records.is_empty()).count()
    }

    /// Number of groups that can be redone.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Label of the group the next undo would revert.
    pub fn peek_undo_label(&self) -> Option<&str> {
        self.undo
            .iter()
            .rev()
            .find(|g| !g.records.is_empty())
            .map(|g| g.label.as_str())
    }

    fn drop_empty_top(&mut self) {
        if self.undo.last().is_some_and(|g| g.records.is_empty()) {
            self.undo.pop();
        }
    }
}
