//! The depot: a `SQLite`-backed implementation of the [`Remote`] contract.
//!
//! One database file holds all four tables:
//!
//! ```text
//! destination (id, value)
//! auto        (id, value, kind)
//! voyage      (id, destination, auto, cargos, created_at)
//! cargo       (id, name, size)
//! ```
//!
//! `voyage.cargos` is a JSON array of cargo ids in attach order, standing in
//! for the source system's array column. Each operation opens its own
//! connection, so multi-statement operations can run inside a transaction
//! without threading a mutable connection through the trait.

mod cargo;
mod catalog;
mod voyage;

use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{Auto, Cargo, Destination, VoyageRow};
use crate::remote::{Remote, RemoteError, Result};

/// SQLite-backed store for voyages, cargo, and catalogs.
pub struct Depot {
    path: PathBuf,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS destination (
        id    TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS auto (
        id    TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        kind  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS voyage (
        id          TEXT PRIMARY KEY,
        destination TEXT NOT NULL,
        auto        TEXT NOT NULL,
        cargos      TEXT NOT NULL DEFAULT '[]',
        created_at  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS cargo (
        id   TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        size INTEGER NOT NULL
    );
";

impl Depot {
    /// Opens the depot at the given database path, creating the file and
    /// schema if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RemoteError::Rejected(format!("cannot create depot dir: {e}")))?;
        }
        let depot = Self { path };
        depot.connect()?;
        Ok(depot)
    }

    /// Returns the default database path: `~/.stowage/depot.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".stowage").join("depot.sqlite"))
    }

    /// Opens a connection and ensures the schema exists.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}

/// Parses a TEXT column back into a [`Uuid`].
fn parse_id(text: &str) -> Result<Uuid> {
    text.parse()
        .map_err(|e| RemoteError::Corrupt(format!("invalid id '{text}': {e}")))
}

/// Parses the JSON `cargos` column back into an ordered id list.
fn parse_cargos(json: &str) -> Result<Vec<Uuid>> {
    serde_json::from_str(json)
        .map_err(|e| RemoteError::Corrupt(format!("invalid cargos list: {e}")))
}

impl Remote for Depot {
    fn all_voyages(&self) -> Result<Vec<VoyageRow>> {
        self.load_all_voyages()
    }

    fn create_voyage(&self, id: Uuid, destination: Uuid, auto: Uuid) -> Result<()> {
        self.insert_voyage(id, destination, auto)
    }

    fn set_route(&self, id: Uuid, destination: Option<Uuid>, auto: Option<Uuid>) -> Result<()> {
        self.update_route(id, destination, auto)
    }

    fn attach_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        self.append_cargo_id(voyage, cargo)
    }

    fn detach_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        self.drop_cargo_id(voyage, cargo)
    }

    fn attach_new_cargo(&self, voyage: Uuid, cargo: &Cargo) -> Result<()> {
        self.insert_and_attach(voyage, cargo)
    }

    fn remove_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()> {
        self.detach_and_delete(voyage, cargo)
    }

    fn delete_voyage(&self, id: Uuid) -> Result<()> {
        self.delete_voyage_cascading(id)
    }

    fn cargo(&self, id: Uuid) -> Result<Cargo> {
        self.load_cargo(id)
    }

    fn update_cargo(&self, id: Uuid, name: &str, size: u32) -> Result<()> {
        self.store_cargo(id, name, size)
    }

    fn destinations(&self) -> Result<Vec<Destination>> {
        self.load_destinations()
    }

    fn destination(&self, id: Uuid) -> Result<Destination> {
        self.load_destination(id)
    }

    fn create_destination(&self, entry: &Destination) -> Result<()> {
        self.insert_destination(entry)
    }

    fn autos(&self) -> Result<Vec<Auto>> {
        self.load_autos()
    }

    fn auto(&self, id: Uuid) -> Result<Auto> {
        self.load_auto(id)
    }
}
