//! Catalog storage: destinations and autos.

use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::model::{Auto, Destination};
use crate::remote::{RemoteError, Result};

use super::{Depot, parse_id};

impl Depot {
    pub(super) fn load_destinations(&self) -> Result<Vec<Destination>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, value FROM destination ORDER BY value")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, value) = row?;
            entries.push(Destination {
                id: parse_id(&id)?,
                value,
            });
        }
        Ok(entries)
    }

    pub(super) fn load_destination(&self, id: Uuid) -> Result<Destination> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM destination WHERE id = ?1",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or(RemoteError::DestinationNotFound(id))?;
        Ok(Destination { id, value })
    }

    pub(super) fn insert_destination(&self, entry: &Destination) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO destination (id, value) VALUES (?1, ?2)",
            rusqlite::params![entry.id.to_string(), &entry.value],
        )?;
        Ok(())
    }

    pub(super) fn load_autos(&self) -> Result<Vec<Auto>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, value, kind FROM auto ORDER BY value")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, value, kind) = row?;
            entries.push(Auto {
                id: parse_id(&id)?,
                value,
                kind,
            });
        }
        Ok(entries)
    }

    pub(super) fn load_auto(&self, id: Uuid) -> Result<Auto> {
        let conn = self.connect()?;
        let (value, kind) = conn
            .query_row(
                "SELECT value, kind FROM auto WHERE id = ?1",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
            .ok_or(RemoteError::AutoNotFound(id))?;
        Ok(Auto { id, value, kind })
    }

    /// Inserts an auto. Not part of the [`crate::remote::Remote`] contract —
    /// the board treats the auto catalog as read-only; this exists so the CLI
    /// can seed an empty depot.
    pub fn create_auto(&self, auto: &Auto) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO auto (id, value, kind) VALUES (?1, ?2, ?3)",
            rusqlite::params![auto.id.to_string(), &auto.value, &auto.kind],
        )?;
        Ok(())
    }
}
