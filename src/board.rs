//! The board: client-side state for every voyage, and the coordinator for
//! all mutations against it.
//!
//! Every gesture follows the same shape: validate against in-memory state,
//! persist through the [`Remote`] collaborator, then apply the matching
//! in-memory change. A rejected gesture returns before the first store call,
//! leaving both board and store exactly as they were. Remote failures are
//! surfaced and never retried.

mod card;

use uuid::Uuid;

use crate::capacity::capacity_of;
use crate::identity::IdSource;
use crate::model::{Auto, Cargo, Destination};
use crate::remote::{Remote, RemoteError};

pub use card::{Card, Row};

/// Outcome taxonomy for board gestures.
///
/// The first four variants are the user-facing classes: bad input, not
/// enough room, a vehicle too small for what is already loaded, and a
/// transfer across differing destinations. `Remote` wraps store failures.
/// The rest guard against driving a state machine from the wrong state.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("field '{field}' must be filled in")]
    Validation { field: &'static str },

    #[error("not enough room: remaining capacity is {remaining_units}")]
    Capacity { remaining_units: u32 },

    #[error(
        "the chosen auto cannot hold the loaded cargo: \
         capacity {capacity_units}, loaded {consumed_units}"
    )]
    Overloaded {
        capacity_units: u32,
        consumed_units: u32,
    },

    #[error("cannot move the item: destinations do not match")]
    DestinationMismatch,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("voyage not on the board: {0}")]
    CardNotFound(Uuid),

    #[error("no such cargo item on that voyage: {0}")]
    RowNotFound(Uuid),

    #[error("cargo item {0} is not being edited")]
    NotEditing(Uuid),

    #[error("cargo item {0} has unapproved changes")]
    MidEdit(Uuid),
}

pub type Result<T> = core::result::Result<T, BoardError>;

/// A lifted cargo item mid-transfer.
///
/// Captured when the drag starts: the item, its committed size, and the
/// source voyage's destination label at that moment. The drop is checked
/// against the label as captured, not as it may since have changed.
#[derive(Debug, Clone)]
pub struct DragTicket {
    pub cargo_id: Uuid,
    pub source_voyage: Uuid,
    pub size: u32,
    pub source_destination: String,
}

/// All voyages, loaded from the store and mutated one gesture at a time.
pub struct Board<R: Remote> {
    remote: R,
    ids: Box<dyn IdSource>,
    cards: Vec<Card>,
}

impl<R: Remote> Board<R> {
    /// Loads the full board: every voyage row plus each attached cargo
    /// record, with remaining capacity derived per card.
    pub fn load(remote: R, ids: Box<dyn IdSource>) -> Result<Self> {
        let rows = remote.all_voyages()?;
        let mut cards = Vec::with_capacity(rows.len());
        for v in rows {
            let mut card = Card::new(
                v.id,
                v.destination_id,
                v.destination,
                v.auto_id,
                v.auto,
                capacity_of(&v.kind),
            );
            for cargo_id in v.cargos {
                card.adopt_committed(remote.cargo(cargo_id)?);
            }
            card.settle_remaining();
            cards.push(card);
        }
        Ok(Self { remote, ids, cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, voyage: Uuid) -> Result<&Card> {
        self.cards
            .iter()
            .find(|c| c.voyage_id == voyage)
            .ok_or(BoardError::CardNotFound(voyage))
    }

    fn card_mut(&mut self, voyage: Uuid) -> Result<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| c.voyage_id == voyage)
            .ok_or(BoardError::CardNotFound(voyage))
    }

    // ── Voyage lifecycle ──

    /// Creates a voyage: persisted first, then placed on the board.
    pub fn new_voyage(&mut self, destination: Uuid, auto: Uuid) -> Result<Uuid> {
        let id = self.ids.mint();
        self.remote.create_voyage(id, destination, auto)?;

        let destination = self.remote.destination(destination)?;
        let auto = self.remote.auto(auto)?;
        self.cards.push(Card::new(
            id,
            destination.id,
            destination.value,
            auto.id,
            auto.value,
            capacity_of(&auto.kind),
        ));
        Ok(id)
    }

    /// Deletes a voyage and all its cargo, store first.
    pub fn delete_voyage(&mut self, voyage: Uuid) -> Result<()> {
        self.card(voyage)?;
        self.remote.delete_voyage(voyage)?;
        self.cards.retain(|c| c.voyage_id != voyage);
        Ok(())
    }

    // ── Cargo rows ──

    /// Adds a fresh editable row. The id is minted now, before any persist,
    /// so later gestures can reference the row. No store call.
    pub fn add_row(&mut self, voyage: Uuid) -> Result<Uuid> {
        let id = self.ids.mint();
        self.card_mut(voyage)?.add_row(id);
        Ok(id)
    }

    /// Puts a committed row into edit mode, draft restored from the
    /// last-committed snapshot. Pure toggle, no validation.
    pub fn edit_row(&mut self, voyage: Uuid, row: Uuid) -> Result<()> {
        let row = self.card_mut(voyage)?.row_mut(row)?;
        if row.is_editing() {
            return Err(BoardError::MidEdit(row.id));
        }
        row.begin_edit();
        Ok(())
    }

    /// Stages field changes into an editing row's draft.
    pub fn stage_row(
        &mut self,
        voyage: Uuid,
        row: Uuid,
        name: Option<&str>,
        size: Option<&str>,
    ) -> Result<()> {
        let row = self.card_mut(voyage)?.row_mut(row)?;
        if !row.is_editing() {
            return Err(BoardError::NotEditing(row.id));
        }
        row.stage(name, size);
        Ok(())
    }

    /// Cancels an edit: an uncommitted row is discarded outright, a
    /// committed one falls back to its snapshot. No store call either way.
    pub fn cancel_row(&mut self, voyage: Uuid, row: Uuid) -> Result<()> {
        let card = self.card_mut(voyage)?;
        if !card.row(row)?.is_committed() {
            card.take_row(row)?;
            return Ok(());
        }
        let row = card.row_mut(row)?;
        if !row.is_editing() {
            return Err(BoardError::NotEditing(row.id));
        }
        row.end_edit();
        Ok(())
    }

    /// Approves an editing row: validate, check capacity, persist, commit.
    ///
    /// An unchanged committed row leaves edit mode with no store call. A new
    /// row is persisted attached to its voyage; an edited one updates its
    /// record in place. The counter moves by the size delta only after the
    /// store accepted the write.
    pub fn approve_row(&mut self, voyage: Uuid, row_id: Uuid) -> Result<()> {
        let (name, size, delta, was_committed) = {
            let card = self.card(voyage)?;
            let row = card.row(row_id)?;
            if !row.is_editing() {
                return Err(BoardError::NotEditing(row_id));
            }
            if row.is_committed() && !row.is_edited() {
                self.card_mut(voyage)?.row_mut(row_id)?.end_edit();
                return Ok(());
            }

            let (name, size) = row.validated()?;
            let old = row.committed_size().unwrap_or(0);
            let delta = i64::from(size) - i64::from(old);
            card.check_allocate(delta)?;
            (name, size, delta, row.is_committed())
        };

        if was_committed {
            self.remote.update_cargo(row_id, &name, size)?;
        } else {
            let cargo = Cargo {
                id: row_id,
                name: name.clone(),
                size,
            };
            self.remote.attach_new_cargo(voyage, &cargo)?;
        }

        let card = self.card_mut(voyage)?;
        card.apply_allocate(delta);
        card.row_mut(row_id)?.commit(name, size);
        Ok(())
    }

    /// Deletes a committed row in display state: the store detaches and
    /// deletes the record, then the freed size returns to the counter.
    pub fn delete_row(&mut self, voyage: Uuid, row_id: Uuid) -> Result<()> {
        let size = {
            let row = self.card(voyage)?.row(row_id)?;
            if row.is_editing() {
                return Err(BoardError::MidEdit(row_id));
            }
            row.committed_size().ok_or(BoardError::RowNotFound(row_id))?
        };

        self.remote.remove_cargo(voyage, row_id)?;

        let card = self.card_mut(voyage)?;
        card.take_row(row_id)?;
        card.apply_allocate(-i64::from(size));
        Ok(())
    }

    // ── Voyage main info ──

    /// Opens the destination+auto pair for editing. Pure toggle.
    pub fn edit_info(&mut self, voyage: Uuid) -> Result<()> {
        self.card_mut(voyage)?.begin_info_edit();
        Ok(())
    }

    /// Stages a new destination and/or auto for an open main-info edit.
    pub fn stage_info(
        &mut self,
        voyage: Uuid,
        destination: Option<Uuid>,
        auto: Option<Uuid>,
    ) -> Result<()> {
        let card = self.card_mut(voyage)?;
        if !card.is_info_editing() {
            return Err(BoardError::NotEditing(voyage));
        }
        card.stage_info(destination, auto);
        Ok(())
    }

    /// Closes a main-info edit, dropping any staged changes.
    pub fn cancel_info(&mut self, voyage: Uuid) -> Result<()> {
        self.card_mut(voyage)?.cancel_info_edit();
        Ok(())
    }

    /// Approves a main-info edit as one unit.
    ///
    /// The capacity of the (possibly unchanged) auto is rechecked against
    /// everything currently loaded; if the vehicle cannot hold it, both
    /// fields are rejected together and the edit stays open. On success the
    /// counter is recomputed as new capacity minus current consumption.
    pub fn approve_info(&mut self, voyage: Uuid) -> Result<()> {
        let (draft, consumed, current_auto, current_destination) = {
            let card = self.card(voyage)?;
            if !card.is_info_editing() {
                return Err(BoardError::NotEditing(voyage));
            }
            if !card.is_info_edited() {
                self.card_mut(voyage)?.cancel_info_edit();
                return Ok(());
            }
            (
                card.info_draft(),
                card.consumed_units(),
                card.auto_id,
                card.destination_id,
            )
        };

        let auto = self.remote.auto(draft.auto.unwrap_or(current_auto))?;
        let capacity_units = capacity_of(&auto.kind);
        if consumed > capacity_units {
            return Err(BoardError::Overloaded {
                capacity_units,
                consumed_units: consumed,
            });
        }

        self.remote.set_route(voyage, draft.destination, draft.auto)?;
        let destination = self
            .remote
            .destination(draft.destination.unwrap_or(current_destination))?;

        self.card_mut(voyage)?.apply_route(
            destination.id,
            destination.value,
            auto.id,
            auto.value,
            capacity_units,
        );
        Ok(())
    }

    // ── Catalogs ──

    pub fn destinations(&self) -> Result<Vec<Destination>> {
        Ok(self.remote.destinations()?)
    }

    pub fn autos(&self) -> Result<Vec<Auto>> {
        Ok(self.remote.autos()?)
    }

    /// Creates a destination catalog entry. The value must be non-empty,
    /// as with any committed field.
    pub fn add_destination(&mut self, value: &str) -> Result<Uuid> {
        if value.trim().is_empty() {
            return Err(BoardError::Validation {
                field: "destination",
            });
        }
        let id = self.ids.mint();
        self.remote.create_destination(&Destination {
            id,
            value: value.to_string(),
        })?;
        Ok(id)
    }

    // ── Transfer ──

    /// Lifts a committed, non-editing row off its card, capturing the
    /// source destination label for the drop check.
    pub fn begin_drag(&self, voyage: Uuid, row_id: Uuid) -> Result<DragTicket> {
        let card = self.card(voyage)?;
        let row = card.row(row_id)?;
        if row.is_editing() {
            return Err(BoardError::MidEdit(row_id));
        }
        let size = row.committed_size().ok_or(BoardError::MidEdit(row_id))?;
        Ok(DragTicket {
            cargo_id: row_id,
            source_voyage: voyage,
            size,
            source_destination: card.destination.clone(),
        })
    }

    /// Drops a lifted row onto a target card.
    ///
    /// Checked in order, before any store call: destination labels must
    /// match, then the target must have room. The store update is two
    /// sequential calls — detach from the source, attach to the target —
    /// with no compensating rollback: if the attach fails the record is
    /// left detached in the store and the board is not touched.
    pub fn complete_drag(&mut self, ticket: &DragTicket, target: Uuid) -> Result<()> {
        if target == ticket.source_voyage {
            return Ok(());
        }
        self.card(ticket.source_voyage)?;
        let target_card = self.card(target)?;
        if target_card.destination != ticket.source_destination {
            return Err(BoardError::DestinationMismatch);
        }
        target_card.check_allocate(i64::from(ticket.size))?;

        self.remote.detach_cargo(ticket.source_voyage, ticket.cargo_id)?;
        self.remote.attach_cargo(target, ticket.cargo_id)?;

        let size = i64::from(ticket.size);
        let source_card = self.card_mut(ticket.source_voyage)?;
        let row = source_card.take_row(ticket.cargo_id)?;
        source_card.apply_allocate(-size);
        let target_card = self.card_mut(target)?;
        target_card.adopt_row(row);
        target_card.apply_allocate(size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::depot::Depot;
    use crate::identity::testing::SequentialIds;
    use crate::model::{Auto, Destination, VoyageRow};

    struct Fixture {
        _dir: TempDir,
        board: Board<Depot>,
        riga: Uuid,
        oslo: Uuid,
        van: Uuid,
        lorry: Uuid,
        semi: Uuid,
    }

    /// A depot seeded with two destinations and one auto of each class.
    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let depot = Depot::open(dir.path().join("depot.sqlite")).unwrap();

        let riga = Uuid::new_v4();
        let oslo = Uuid::new_v4();
        for (id, city) in [(riga, "Riga"), (oslo, "Oslo")] {
            depot
                .create_destination(&Destination {
                    id,
                    value: city.to_string(),
                })
                .unwrap();
        }

        let van = Uuid::new_v4();
        let lorry = Uuid::new_v4();
        let semi = Uuid::new_v4();
        for (id, plate, kind) in [
            (van, "KL-403", "van"),
            (lorry, "MN-218", "lorry"),
            (semi, "TR-771", "semi"),
        ] {
            depot
                .create_auto(&Auto {
                    id,
                    value: plate.to_string(),
                    kind: kind.to_string(),
                })
                .unwrap();
        }

        let board = Board::load(depot, Box::new(SequentialIds::default())).unwrap();
        Fixture {
            _dir: dir,
            board,
            riga,
            oslo,
            van,
            lorry,
            semi,
        }
    }

    /// Add, stage, and approve one cargo item in a single sweep.
    fn load_cargo(board: &mut Board<Depot>, voyage: Uuid, name: &str, size: u32) -> Uuid {
        let row = board.add_row(voyage).unwrap();
        board
            .stage_row(voyage, row, Some(name), Some(&size.to_string()))
            .unwrap();
        board.approve_row(voyage, row).unwrap();
        row
    }

    #[test]
    fn new_voyage_starts_empty_at_full_capacity() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.capacity_units, 8);
        assert_eq!(card.remaining_units(), 8);
        assert!(card.rows().is_empty());
    }

    #[test]
    fn approve_new_row_decrements_counter_and_persists() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.remaining_units(), 3);
        assert!(card.row(row).unwrap().is_committed());

        // The store agrees after a reload.
        let reloaded = Board::load(
            Depot::open(reload_path(&f)).unwrap(),
            Box::new(SequentialIds::default()),
        )
        .unwrap();
        assert_eq!(reloaded.card(voyage).unwrap().remaining_units(), 3);
    }

    fn reload_path(f: &Fixture) -> std::path::PathBuf {
        f._dir.path().join("depot.sqlite")
    }

    #[test]
    fn cancel_uncommitted_row_discards_without_store_call() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.van).unwrap();
        let row = f.board.add_row(voyage).unwrap();
        f.board
            .stage_row(voyage, row, Some("Timber"), Some("3"))
            .unwrap();

        f.board.cancel_row(voyage, row).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert!(card.rows().is_empty());
        assert_eq!(card.remaining_units(), 4);
    }

    #[test]
    fn scenario_a_edit_within_capacity_accepted() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);
        assert_eq!(f.board.card(voyage).unwrap().remaining_units(), 3);

        f.board.edit_row(voyage, row).unwrap();
        f.board.stage_row(voyage, row, None, Some("7")).unwrap();
        f.board.approve_row(voyage, row).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.remaining_units(), 1);
        assert_eq!(card.row(row).unwrap().committed_size(), Some(7));
    }

    #[test]
    fn scenario_b_edit_beyond_capacity_rejected_unchanged() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.edit_row(voyage, row).unwrap();
        f.board.stage_row(voyage, row, None, Some("12")).unwrap();
        let err = f.board.approve_row(voyage, row).unwrap_err();

        assert!(matches!(err, BoardError::Capacity { remaining_units: 3 }));
        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.remaining_units(), 3);
        assert_eq!(card.row(row).unwrap().committed_size(), Some(5));
        // Still mid-edit, as the UI leaves it.
        assert!(card.row(row).unwrap().is_editing());
    }

    #[test]
    fn shrinking_edit_frees_capacity() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.edit_row(voyage, row).unwrap();
        f.board.stage_row(voyage, row, None, Some("2")).unwrap();
        f.board.approve_row(voyage, row).unwrap();

        assert_eq!(f.board.card(voyage).unwrap().remaining_units(), 6);
    }

    #[test]
    fn approve_unedited_row_is_a_pure_toggle() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.edit_row(voyage, row).unwrap();
        f.board.approve_row(voyage, row).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert!(!card.row(row).unwrap().is_editing());
        assert_eq!(card.remaining_units(), 3);
    }

    #[test]
    fn cancel_edit_restores_snapshot() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.edit_row(voyage, row).unwrap();
        f.board
            .stage_row(voyage, row, Some("Bricks"), Some("8"))
            .unwrap();
        f.board.cancel_row(voyage, row).unwrap();

        let card = f.board.card(voyage).unwrap();
        let r = card.row(row).unwrap();
        assert!(!r.is_editing());
        assert_eq!(r.name(), Some("Timber"));
        assert_eq!(r.committed_size(), Some(5));
        assert_eq!(card.remaining_units(), 3);
    }

    #[test]
    fn delete_row_returns_size_to_counter() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.delete_row(voyage, row).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert!(card.rows().is_empty());
        assert_eq!(card.remaining_units(), 8);
    }

    #[test]
    fn info_edit_to_smaller_auto_rejected_when_overloaded() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        load_cargo(&mut f.board, voyage, "Timber", 6);

        f.board.edit_info(voyage).unwrap();
        f.board.stage_info(voyage, None, Some(f.van)).unwrap();
        let err = f.board.approve_info(voyage).unwrap_err();

        assert!(matches!(
            err,
            BoardError::Overloaded {
                capacity_units: 4,
                consumed_units: 6,
            }
        ));
        // Whole edit rejected: auto unchanged, still editable.
        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.auto, "MN-218");
        assert!(card.is_info_editing());
        assert_eq!(card.remaining_units(), 2);
    }

    #[test]
    fn info_edit_to_larger_auto_recomputes_counter() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        load_cargo(&mut f.board, voyage, "Timber", 6);

        f.board.edit_info(voyage).unwrap();
        f.board.stage_info(voyage, Some(f.oslo), Some(f.semi)).unwrap();
        f.board.approve_info(voyage).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.destination, "Oslo");
        assert_eq!(card.auto, "TR-771");
        assert_eq!(card.capacity_units, 16);
        assert_eq!(card.remaining_units(), 10);
        assert!(!card.is_info_editing());
    }

    #[test]
    fn cancel_info_edit_drops_staged_route() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();

        f.board.edit_info(voyage).unwrap();
        f.board.stage_info(voyage, Some(f.oslo), None).unwrap();
        f.board.cancel_info(voyage).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.destination, "Riga");
        assert!(!card.is_info_editing());
    }

    #[test]
    fn scenario_c_transfer_beyond_capacity_rejected() {
        let mut f = fixture();
        // X: lorry (8), item of 4 → remaining 4. Y: semi overloaded to 2.
        let x = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let item = load_cargo(&mut f.board, x, "Timber", 4);
        let y = f.board.new_voyage(f.riga, f.van).unwrap();
        load_cargo(&mut f.board, y, "Bricks", 2);
        assert_eq!(f.board.card(y).unwrap().remaining_units(), 2);

        let ticket = f.board.begin_drag(x, item).unwrap();
        let err = f.board.complete_drag(&ticket, y).unwrap_err();

        assert!(matches!(err, BoardError::Capacity { remaining_units: 2 }));
        assert_eq!(f.board.card(x).unwrap().remaining_units(), 4);
        assert_eq!(f.board.card(y).unwrap().remaining_units(), 2);
        assert!(f.board.card(x).unwrap().row(item).is_ok());
    }

    #[test]
    fn scenario_d_transfer_destination_mismatch_rejected() {
        let mut f = fixture();
        let x = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let item = load_cargo(&mut f.board, x, "Timber", 4);
        let z = f.board.new_voyage(f.oslo, f.semi).unwrap();

        let ticket = f.board.begin_drag(x, item).unwrap();
        let err = f.board.complete_drag(&ticket, z).unwrap_err();

        // Mismatch wins even though the target has plenty of room.
        assert!(matches!(err, BoardError::DestinationMismatch));
        assert_eq!(f.board.card(x).unwrap().remaining_units(), 4);
        assert_eq!(f.board.card(z).unwrap().remaining_units(), 16);
        assert!(f.board.card(x).unwrap().row(item).is_ok());
    }

    #[test]
    fn scenario_e_transfer_accepted_moves_item_and_counters() {
        let mut f = fixture();
        let x = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let item = load_cargo(&mut f.board, x, "Timber", 4);
        let w = f.board.new_voyage(f.riga, f.lorry).unwrap();
        load_cargo(&mut f.board, w, "Bricks", 2);
        assert_eq!(f.board.card(w).unwrap().remaining_units(), 6);

        let ticket = f.board.begin_drag(x, item).unwrap();
        f.board.complete_drag(&ticket, w).unwrap();

        assert_eq!(f.board.card(x).unwrap().remaining_units(), 8);
        assert_eq!(f.board.card(w).unwrap().remaining_units(), 2);
        // Exclusive ownership, on the board and in the store.
        assert!(f.board.card(x).unwrap().row(item).is_err());
        assert!(f.board.card(w).unwrap().row(item).is_ok());

        let reloaded = Board::load(
            Depot::open(reload_path(&f)).unwrap(),
            Box::new(SequentialIds::default()),
        )
        .unwrap();
        assert!(reloaded.card(x).unwrap().row(item).is_err());
        assert!(reloaded.card(w).unwrap().row(item).is_ok());
    }

    #[test]
    fn conservation_holds_across_a_mixed_sequence() {
        let mut f = fixture();
        let a = f.board.new_voyage(f.riga, f.semi).unwrap();
        let b = f.board.new_voyage(f.riga, f.lorry).unwrap();

        let t = load_cargo(&mut f.board, a, "Timber", 6);
        load_cargo(&mut f.board, a, "Bricks", 4);
        let g = load_cargo(&mut f.board, b, "Glassware", 3);

        f.board.edit_row(b, g).unwrap();
        f.board.stage_row(b, g, None, Some("5")).unwrap();
        f.board.approve_row(b, g).unwrap();

        let ticket = f.board.begin_drag(a, t).unwrap();
        f.board.complete_drag(&ticket, b).unwrap_err(); // 6 > 3 remaining
        f.board.delete_row(b, g).unwrap();
        let ticket = f.board.begin_drag(a, t).unwrap();
        f.board.complete_drag(&ticket, b).unwrap();

        for card in f.board.cards() {
            // Counter non-negative and conserved.
            assert_eq!(
                card.remaining_units(),
                card.capacity_units - card.consumed_units()
            );
        }
        assert_eq!(f.board.card(a).unwrap().remaining_units(), 12);
        assert_eq!(f.board.card(b).unwrap().remaining_units(), 2);
    }

    #[test]
    fn delete_voyage_cascades_and_frees_the_card() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        load_cargo(&mut f.board, voyage, "Timber", 5);

        f.board.delete_voyage(voyage).unwrap();
        assert!(f.board.card(voyage).is_err());

        let reloaded = Board::load(
            Depot::open(reload_path(&f)).unwrap(),
            Box::new(SequentialIds::default()),
        )
        .unwrap();
        assert!(reloaded.cards().is_empty());
    }

    #[test]
    fn add_destination_rejects_empty_value() {
        let mut f = fixture();
        let err = f.board.add_destination("  ").unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation {
                field: "destination"
            }
        ));

        let before = f.board.destinations().unwrap().len();
        f.board.add_destination("Tallinn").unwrap();
        assert_eq!(f.board.destinations().unwrap().len(), before + 1);
    }

    #[test]
    fn begin_drag_rejects_uncommitted_and_editing_rows() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();

        let fresh = f.board.add_row(voyage).unwrap();
        assert!(matches!(
            f.board.begin_drag(voyage, fresh).unwrap_err(),
            BoardError::MidEdit(_)
        ));

        f.board.cancel_row(voyage, fresh).unwrap();
        let row = load_cargo(&mut f.board, voyage, "Timber", 2);
        f.board.edit_row(voyage, row).unwrap();
        assert!(matches!(
            f.board.begin_drag(voyage, row).unwrap_err(),
            BoardError::MidEdit(_)
        ));
    }

    #[test]
    fn drop_onto_source_voyage_is_a_noop() {
        let mut f = fixture();
        let voyage = f.board.new_voyage(f.riga, f.lorry).unwrap();
        let item = load_cargo(&mut f.board, voyage, "Timber", 4);

        let ticket = f.board.begin_drag(voyage, item).unwrap();
        f.board.complete_drag(&ticket, voyage).unwrap();

        let card = f.board.card(voyage).unwrap();
        assert_eq!(card.remaining_units(), 4);
        assert!(card.row(item).is_ok());
    }

    /// The two-step transfer has no rollback: when the attach fails after a
    /// successful detach, the record is left attached to neither voyage in
    /// the store, and the board keeps its pre-drag state.
    mod non_atomic_transfer {
        use super::*;

        use std::cell::Cell;

        use crate::model::{Auto, Cargo, Destination};
        use crate::remote::{self, Remote};

        /// Delegates everything to a depot, but fails `attach_cargo` once.
        struct FailingAttach {
            depot: Depot,
            tripped: Cell<bool>,
        }

        impl Remote for FailingAttach {
            fn all_voyages(&self) -> remote::Result<Vec<VoyageRow>> {
                self.depot.all_voyages()
            }
            fn create_voyage(
                &self,
                id: Uuid,
                destination: Uuid,
                auto: Uuid,
            ) -> remote::Result<()> {
                self.depot.create_voyage(id, destination, auto)
            }
            fn set_route(
                &self,
                id: Uuid,
                destination: Option<Uuid>,
                auto: Option<Uuid>,
            ) -> remote::Result<()> {
                self.depot.set_route(id, destination, auto)
            }
            fn attach_cargo(&self, voyage: Uuid, cargo: Uuid) -> remote::Result<()> {
                if !self.tripped.replace(true) {
                    return Err(remote::RemoteError::Rejected("wire down".to_string()));
                }
                self.depot.attach_cargo(voyage, cargo)
            }
            fn detach_cargo(&self, voyage: Uuid, cargo: Uuid) -> remote::Result<()> {
                self.depot.detach_cargo(voyage, cargo)
            }
            fn attach_new_cargo(&self, voyage: Uuid, cargo: &Cargo) -> remote::Result<()> {
                self.depot.attach_new_cargo(voyage, cargo)
            }
            fn remove_cargo(&self, voyage: Uuid, cargo: Uuid) -> remote::Result<()> {
                self.depot.remove_cargo(voyage, cargo)
            }
            fn delete_voyage(&self, id: Uuid) -> remote::Result<()> {
                self.depot.delete_voyage(id)
            }
            fn cargo(&self, id: Uuid) -> remote::Result<Cargo> {
                self.depot.cargo(id)
            }
            fn update_cargo(&self, id: Uuid, name: &str, size: u32) -> remote::Result<()> {
                self.depot.update_cargo(id, name, size)
            }
            fn destinations(&self) -> remote::Result<Vec<Destination>> {
                self.depot.destinations()
            }
            fn destination(&self, id: Uuid) -> remote::Result<Destination> {
                self.depot.destination(id)
            }
            fn create_destination(&self, entry: &Destination) -> remote::Result<()> {
                self.depot.create_destination(entry)
            }
            fn autos(&self) -> remote::Result<Vec<Auto>> {
                self.depot.autos()
            }
            fn auto(&self, id: Uuid) -> remote::Result<Auto> {
                self.depot.auto(id)
            }
        }

        #[test]
        fn failed_attach_leaves_item_detached_in_store() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("depot.sqlite");
            let depot = Depot::open(&path).unwrap();

            let riga = Uuid::new_v4();
            depot
                .create_destination(&Destination {
                    id: riga,
                    value: "Riga".to_string(),
                })
                .unwrap();
            let lorry = Uuid::new_v4();
            depot
                .create_auto(&Auto {
                    id: lorry,
                    value: "MN-218".to_string(),
                    kind: "lorry".to_string(),
                })
                .unwrap();

            let remote = FailingAttach {
                depot,
                tripped: Cell::new(false),
            };
            let mut board = Board::load(remote, Box::new(SequentialIds::default())).unwrap();
            let x = board.new_voyage(riga, lorry).unwrap();
            let item = load_failing(&mut board, x);
            let w = board.new_voyage(riga, lorry).unwrap();

            let ticket = board.begin_drag(x, item).unwrap();
            let err = board.complete_drag(&ticket, w).unwrap_err();
            assert!(matches!(err, BoardError::Remote(_)));

            // Board state untouched by the failure.
            assert!(board.card(x).unwrap().row(item).is_ok());
            assert_eq!(board.card(x).unwrap().remaining_units(), 4);

            // Store state: detached from both — the documented gap.
            let depot = Depot::open(&path).unwrap();
            for row in depot.all_voyages().unwrap() {
                assert!(!row.cargos.contains(&item));
            }
            // The record itself still exists.
            assert!(depot.cargo(item).is_ok());
        }

        fn load_failing(board: &mut Board<FailingAttach>, voyage: Uuid) -> Uuid {
            let row = board.add_row(voyage).unwrap();
            board
                .stage_row(voyage, row, Some("Timber"), Some("4"))
                .unwrap();
            board.approve_row(voyage, row).unwrap();
            row
        }
    }
}
