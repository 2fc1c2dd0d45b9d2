//! Cargo storage: load and update individual cargo records.

use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::model::Cargo;
use crate::remote::{RemoteError, Result};

use super::Depot;

impl Depot {
    pub(super) fn load_cargo(&self, id: Uuid) -> Result<Cargo> {
        let conn = self.connect()?;
        let (name, size) = conn
            .query_row(
                "SELECT name, size FROM cargo WHERE id = ?1",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?
            .ok_or(RemoteError::CargoNotFound(id))?;
        Ok(Cargo { id, name, size })
    }

    pub(super) fn store_cargo(&self, id: Uuid, name: &str, size: u32) -> Result<()> {
        let conn = self.connect()?;
        let rows = conn.execute(
            "UPDATE cargo SET name = ?1, size = ?2 WHERE id = ?3",
            rusqlite::params![name, size, id.to_string()],
        )?;
        if rows == 0 {
            return Err(RemoteError::CargoNotFound(id));
        }
        Ok(())
    }
}
