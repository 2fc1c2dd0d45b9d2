//! Cards and rows: the client-side state of one voyage and its cargo.
//!
//! A `Card` pairs the voyage's display state with the remaining-capacity
//! counter; a `Row` is one cargo item with its editable draft and
//! last-committed snapshot. Neither talks to the store — the board validates,
//! persists, and then applies the matching state change here, so the counter
//! and the displayed values can never drift apart.

use uuid::Uuid;

use crate::capacity::can_allocate;
use crate::model::Cargo;

use super::BoardError;

/// One voyage on the board.
#[derive(Debug)]
pub struct Card {
    pub voyage_id: Uuid,
    pub destination_id: Uuid,
    /// Destination display label. Transfers match on this.
    pub destination: String,
    pub auto_id: Uuid,
    /// Auto display label.
    pub auto: String,
    pub capacity_units: u32,
    /// Capacity not yet consumed by committed cargo. Adjusted only through
    /// [`Card::check_allocate`]-guarded paths.
    remaining_units: u32,
    info_editing: bool,
    info_draft: RouteDraft,
    rows: Vec<Row>,
}

/// Staged main-info changes: destination and/or auto, by catalog id.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteDraft {
    pub destination: Option<Uuid>,
    pub auto: Option<Uuid>,
}

impl RouteDraft {
    fn is_edited(&self) -> bool {
        self.destination.is_some() || self.auto.is_some()
    }
}

impl Card {
    pub(super) fn new(
        voyage_id: Uuid,
        destination_id: Uuid,
        destination: String,
        auto_id: Uuid,
        auto: String,
        capacity_units: u32,
    ) -> Self {
        Self {
            voyage_id,
            destination_id,
            destination,
            auto_id,
            auto,
            capacity_units,
            remaining_units: capacity_units,
            info_editing: false,
            info_draft: RouteDraft::default(),
            rows: Vec::new(),
        }
    }

    pub fn remaining_units(&self) -> u32 {
        self.remaining_units
    }

    /// Total size of all committed cargo on this card.
    pub fn consumed_units(&self) -> u32 {
        self.rows.iter().filter_map(Row::committed_size).sum()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: Uuid) -> Result<&Row, BoardError> {
        self.rows
            .iter()
            .find(|r| r.id == id)
            .ok_or(BoardError::RowNotFound(id))
    }

    pub(super) fn row_mut(&mut self, id: Uuid) -> Result<&mut Row, BoardError> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(BoardError::RowNotFound(id))
    }

    /// Adds a row for an already-persisted cargo record, in display state.
    /// Used when loading the board; does not touch the counter.
    pub(super) fn adopt_committed(&mut self, cargo: Cargo) {
        self.rows.push(Row::committed(cargo));
    }

    /// Recomputes the counter from committed rows after a load.
    ///
    /// Clamped at zero: a store that somehow overfills a voyage yields no
    /// remaining capacity, so every later allocation fails closed.
    pub(super) fn settle_remaining(&mut self) {
        self.remaining_units = self.capacity_units.saturating_sub(self.consumed_units());
    }

    /// Adds a fresh, never-persisted row in editable state.
    pub(super) fn add_row(&mut self, id: Uuid) {
        self.rows.push(Row::new_editable(id));
    }

    pub(super) fn take_row(&mut self, id: Uuid) -> Result<Row, BoardError> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(BoardError::RowNotFound(id))?;
        Ok(self.rows.remove(pos))
    }

    pub(super) fn adopt_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Whether `delta` more consumed units fit on this card.
    pub(super) fn check_allocate(&self, delta: i64) -> Result<(), BoardError> {
        if can_allocate(self.remaining_units, delta) {
            Ok(())
        } else {
            Err(BoardError::Capacity {
                remaining_units: self.remaining_units,
            })
        }
    }

    /// Applies a previously checked delta to the counter.
    pub(super) fn apply_allocate(&mut self, delta: i64) {
        let remaining = i64::from(self.remaining_units) - delta;
        // check_allocate ran first, so this never clamps.
        self.remaining_units = u32::try_from(remaining).unwrap_or(0);
    }

    // ── Main-info edit ──

    pub fn is_info_editing(&self) -> bool {
        self.info_editing
    }

    pub(super) fn info_draft(&self) -> RouteDraft {
        self.info_draft
    }

    pub(super) fn begin_info_edit(&mut self) {
        self.info_editing = true;
        self.info_draft = RouteDraft::default();
    }

    pub(super) fn stage_info(&mut self, destination: Option<Uuid>, auto: Option<Uuid>) {
        if destination.is_some() {
            self.info_draft.destination = destination;
        }
        if auto.is_some() {
            self.info_draft.auto = auto;
        }
    }

    pub(super) fn is_info_edited(&self) -> bool {
        self.info_draft.is_edited()
    }

    pub(super) fn cancel_info_edit(&mut self) {
        self.info_draft = RouteDraft::default();
        self.info_editing = false;
    }

    /// Applies an approved main-info edit: new ids, labels, and capacity in
    /// one step, with the counter recomputed against current consumption.
    pub(super) fn apply_route(
        &mut self,
        destination_id: Uuid,
        destination: String,
        auto_id: Uuid,
        auto: String,
        capacity_units: u32,
    ) {
        self.destination_id = destination_id;
        self.destination = destination;
        self.auto_id = auto_id;
        self.auto = auto;
        self.capacity_units = capacity_units;
        self.remaining_units = capacity_units.saturating_sub(self.consumed_units());
        self.info_draft = RouteDraft::default();
        self.info_editing = false;
    }
}

/// One cargo item on a card.
///
/// `committed` is `None` until the first approve persists the item; until
/// then the row exists only on the board and can be discarded without a
/// store call.
#[derive(Debug)]
pub struct Row {
    pub id: Uuid,
    committed: Option<Committed>,
    draft: Draft,
    editing: bool,
}

#[derive(Debug, Clone)]
struct Committed {
    name: String,
    size: u32,
}

/// Editable fields. `size` stays text until approval so "must be numeric"
/// is a validation outcome rather than a type error.
#[derive(Debug, Default, Clone)]
struct Draft {
    name: String,
    size: String,
    edited: bool,
}

impl Row {
    fn new_editable(id: Uuid) -> Self {
        Self {
            id,
            committed: None,
            draft: Draft::default(),
            editing: true,
        }
    }

    fn committed(cargo: Cargo) -> Self {
        Self {
            id: cargo.id,
            committed: Some(Committed {
                name: cargo.name,
                size: cargo.size,
            }),
            draft: Draft::default(),
            editing: false,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub(super) fn is_edited(&self) -> bool {
        self.draft.edited
    }

    /// Last-committed name, if the row has ever been approved.
    pub fn name(&self) -> Option<&str> {
        self.committed.as_ref().map(|c| c.name.as_str())
    }

    /// Last-committed size, if the row has ever been approved.
    pub fn committed_size(&self) -> Option<u32> {
        self.committed.as_ref().map(|c| c.size)
    }

    /// Switches a committed row into edit mode, restoring the draft from the
    /// last-committed snapshot.
    pub(super) fn begin_edit(&mut self) {
        if let Some(c) = &self.committed {
            self.draft = Draft {
                name: c.name.clone(),
                size: c.size.to_string(),
                edited: false,
            };
        }
        self.editing = true;
    }

    /// Stages field changes into the draft.
    pub(super) fn stage(&mut self, name: Option<&str>, size: Option<&str>) {
        if let Some(name) = name
            && name != self.draft.name
        {
            self.draft.name = name.to_string();
            self.draft.edited = true;
        }
        if let Some(size) = size
            && size != self.draft.size
        {
            self.draft.size = size.to_string();
            self.draft.edited = true;
        }
    }

    /// Validates the draft: non-empty name and a positive integer size.
    pub(super) fn validated(&self) -> Result<(String, u32), BoardError> {
        if self.draft.name.trim().is_empty() {
            return Err(BoardError::Validation { field: "name" });
        }
        let size = self.draft.size.trim().parse::<u32>().ok().filter(|&s| s > 0);
        let Some(size) = size else {
            return Err(BoardError::Validation { field: "size" });
        };
        Ok((self.draft.name.clone(), size))
    }

    /// Records an approved edit: snapshot updated, edit mode left.
    pub(super) fn commit(&mut self, name: String, size: u32) {
        self.committed = Some(Committed { name, size });
        self.draft = Draft::default();
        self.editing = false;
    }

    /// Leaves edit mode without changing the snapshot. Restoring the draft is
    /// unnecessary — it is rebuilt from the snapshot on the next edit.
    pub(super) fn end_edit(&mut self) {
        self.draft = Draft::default();
        self.editing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed_row(size: u32) -> Row {
        Row::committed(Cargo {
            id: Uuid::from_u128(7),
            name: "Timber".to_string(),
            size,
        })
    }

    #[test]
    fn new_row_rejects_empty_name() {
        let mut row = Row::new_editable(Uuid::from_u128(1));
        row.stage(None, Some("3"));

        let err = row.validated().unwrap_err();
        assert!(matches!(err, BoardError::Validation { field: "name" }));
    }

    #[test]
    fn new_row_rejects_non_numeric_size() {
        let mut row = Row::new_editable(Uuid::from_u128(1));
        row.stage(Some("Timber"), Some("lots"));

        let err = row.validated().unwrap_err();
        assert!(matches!(err, BoardError::Validation { field: "size" }));
    }

    #[test]
    fn new_row_rejects_zero_size() {
        let mut row = Row::new_editable(Uuid::from_u128(1));
        row.stage(Some("Timber"), Some("0"));

        assert!(row.validated().is_err());
    }

    #[test]
    fn begin_edit_restores_draft_from_snapshot() {
        let mut row = committed_row(4);
        row.begin_edit();

        assert!(row.is_editing());
        assert!(!row.is_edited());
        assert_eq!(row.validated().unwrap(), ("Timber".to_string(), 4));
    }

    #[test]
    fn staging_same_values_is_not_an_edit() {
        let mut row = committed_row(4);
        row.begin_edit();
        row.stage(Some("Timber"), Some("4"));

        assert!(!row.is_edited());
    }

    #[test]
    fn staging_new_values_marks_edited() {
        let mut row = committed_row(4);
        row.begin_edit();
        row.stage(None, Some("6"));

        assert!(row.is_edited());
        assert_eq!(row.validated().unwrap(), ("Timber".to_string(), 6));
        // Snapshot untouched until commit.
        assert_eq!(row.committed_size(), Some(4));
    }

    #[test]
    fn card_counter_clamps_on_overfilled_load() {
        let mut card = Card::new(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            "Riga".to_string(),
            Uuid::from_u128(3),
            "KL-403".to_string(),
            4,
        );
        card.adopt_committed(Cargo {
            id: Uuid::from_u128(4),
            name: "Bricks".to_string(),
            size: 9,
        });
        card.settle_remaining();

        assert_eq!(card.remaining_units(), 0);
        assert!(card.check_allocate(1).is_err());
    }
}
