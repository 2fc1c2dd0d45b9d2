//! Voyage storage: creation, route updates, the cargo id list, and
//! cascading deletion.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::model::{Cargo, VoyageRow};
use crate::remote::{RemoteError, Result};

use super::{Depot, parse_cargos, parse_id};

impl Depot {
    pub(super) fn insert_voyage(&self, id: Uuid, destination: Uuid, auto: Uuid) -> Result<()> {
        // Reject dangling references up front; the join in `all_voyages`
        // would silently hide a voyage pointing at a missing catalog entry.
        self.load_destination(destination)?;
        self.load_auto(auto)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO voyage (id, destination, auto, cargos, created_at)
             VALUES (?1, ?2, ?3, '[]', ?4)",
            rusqlite::params![
                id.to_string(),
                destination.to_string(),
                auto.to_string(),
                Timestamp::now().to_string(),
            ],
        )?;
        Ok(())
    }

    /// Loads every voyage joined against both catalogs, in creation order.
    pub(super) fn load_all_voyages(&self) -> Result<Vec<VoyageRow>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT voyage.id, voyage.destination, destination.value,
                    voyage.auto, auto.value, voyage.cargos, auto.kind
             FROM voyage
             JOIN destination ON voyage.destination = destination.id
             JOIN auto ON voyage.auto = auto.id
             ORDER BY voyage.created_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut voyages = Vec::new();
        for row in rows {
            let (id, destination_id, destination, auto_id, auto, cargos, kind) = row?;
            voyages.push(VoyageRow {
                id: parse_id(&id)?,
                destination_id: parse_id(&destination_id)?,
                destination,
                auto_id: parse_id(&auto_id)?,
                auto,
                cargos: parse_cargos(&cargos)?,
                kind,
            });
        }
        Ok(voyages)
    }

    pub(super) fn update_route(
        &self,
        id: Uuid,
        destination: Option<Uuid>,
        auto: Option<Uuid>,
    ) -> Result<()> {
        if destination.is_none() && auto.is_none() {
            return Ok(());
        }
        if let Some(d) = destination {
            self.load_destination(d)?;
        }
        if let Some(a) = auto {
            self.load_auto(a)?;
        }

        let conn = self.connect()?;
        let rows = conn.execute(
            "UPDATE voyage
             SET destination = COALESCE(?1, destination), auto = COALESCE(?2, auto)
             WHERE id = ?3",
            rusqlite::params![
                destination.map(|d| d.to_string()),
                auto.map(|a| a.to_string()),
                id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(RemoteError::VoyageNotFound(id));
        }
        Ok(())
    }

    pub(super) fn append_cargo_id(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut cargos = load_cargo_list(&tx, voyage)?;
        if !cargos.contains(&cargo) {
            cargos.push(cargo);
            store_cargo_list(&tx, voyage, &cargos)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub(super) fn drop_cargo_id(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut cargos = load_cargo_list(&tx, voyage)?;
        if let Some(pos) = cargos.iter().position(|&c| c == cargo) {
            cargos.remove(pos);
            store_cargo_list(&tx, voyage, &cargos)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub(super) fn insert_and_attach(&self, voyage: Uuid, cargo: &Cargo) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut cargos = load_cargo_list(&tx, voyage)?;
        tx.execute(
            "INSERT INTO cargo (id, name, size) VALUES (?1, ?2, ?3)",
            rusqlite::params![cargo.id.to_string(), &cargo.name, cargo.size],
        )?;
        if !cargos.contains(&cargo.id) {
            cargos.push(cargo.id);
            store_cargo_list(&tx, voyage, &cargos)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub(super) fn detach_and_delete(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut cargos = load_cargo_list(&tx, voyage)?;
        if let Some(pos) = cargos.iter().position(|&c| c == cargo) {
            cargos.remove(pos);
            store_cargo_list(&tx, voyage, &cargos)?;
        }
        let rows = tx.execute("DELETE FROM cargo WHERE id = ?1", [cargo.to_string()])?;
        if rows == 0 {
            return Err(RemoteError::CargoNotFound(cargo));
        }
        tx.commit()?;
        Ok(())
    }

    /// Deletes a voyage and every cargo record it still holds.
    pub(super) fn delete_voyage_cascading(&self, id: Uuid) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let cargos = load_cargo_list(&tx, id)?;
        for cargo in &cargos {
            tx.execute("DELETE FROM cargo WHERE id = ?1", [cargo.to_string()])?;
        }
        tx.execute("DELETE FROM voyage WHERE id = ?1", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

/// Reads a voyage's cargo id list inside an open transaction.
fn load_cargo_list(conn: &Connection, voyage: Uuid) -> Result<Vec<Uuid>> {
    let json = conn
        .query_row(
            "SELECT cargos FROM voyage WHERE id = ?1",
            [voyage.to_string()],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or(RemoteError::VoyageNotFound(voyage))?;
    parse_cargos(&json)
}

/// Writes a voyage's cargo id list inside an open transaction.
fn store_cargo_list(conn: &Connection, voyage: Uuid, cargos: &[Uuid]) -> Result<()> {
    let json = serde_json::to_string(cargos)
        .map_err(|e| RemoteError::Corrupt(format!("cannot encode cargos list: {e}")))?;
    conn.execute(
        "UPDATE voyage SET cargos = ?1 WHERE id = ?2",
        rusqlite::params![json, voyage.to_string()],
    )?;
    Ok(())
}
