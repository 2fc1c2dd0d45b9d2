//! The store collaborator the board talks to.
//!
//! The board never sees transport or query details; it issues logical
//! operations against four resources — voyages, cargo, destinations, autos —
//! and receives records or a [`RemoteError`]. The production implementation
//! is [`crate::depot::Depot`]; tests substitute wrappers to exercise failure
//! paths.

use uuid::Uuid;

use crate::model::{Auto, Cargo, Destination, VoyageRow};

/// Errors surfaced by the store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("voyage not found: {0}")]
    VoyageNotFound(Uuid),

    #[error("cargo not found: {0}")]
    CargoNotFound(Uuid),

    #[error("destination not found: {0}")]
    DestinationNotFound(Uuid),

    #[error("auto not found: {0}")]
    AutoNotFound(Uuid),

    /// The store refused the operation; the detail is the response text.
    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, RemoteError>;

/// Logical operations on the store.
///
/// `attach_new_cargo` and `remove_cargo` pair a cargo write with the voyage
/// list update, mirroring the source system's single combined request for
/// those gestures. `attach_cargo`/`detach_cargo` are the two halves of a
/// transfer and are deliberately separate calls.
pub trait Remote {
    // ── Voyages ──

    /// All voyages joined against both catalogs, in creation order.
    fn all_voyages(&self) -> Result<Vec<VoyageRow>>;

    /// Create an empty voyage.
    fn create_voyage(&self, id: Uuid, destination: Uuid, auto: Uuid) -> Result<()>;

    /// Update a voyage's destination and/or auto.
    fn set_route(&self, id: Uuid, destination: Option<Uuid>, auto: Option<Uuid>) -> Result<()>;

    /// Append a cargo id to a voyage's list. No-op if already attached.
    fn attach_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()>;

    /// Remove a cargo id from a voyage's list. No-op if not attached.
    fn detach_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()>;

    /// Insert a new cargo record and attach it to a voyage.
    fn attach_new_cargo(&self, voyage: Uuid, cargo: &Cargo) -> Result<()>;

    /// Detach a cargo id from a voyage and delete its record.
    fn remove_cargo(&self, voyage: Uuid, cargo: Uuid) -> Result<()>;

    /// Delete a voyage and every cargo record attached to it.
    fn delete_voyage(&self, id: Uuid) -> Result<()>;

    // ── Cargo ──

    /// Load one cargo record.
    fn cargo(&self, id: Uuid) -> Result<Cargo>;

    /// Update a cargo record's name and size.
    fn update_cargo(&self, id: Uuid, name: &str, size: u32) -> Result<()>;

    // ── Catalogs ──

    /// All destinations.
    fn destinations(&self) -> Result<Vec<Destination>>;

    /// Load one destination.
    fn destination(&self, id: Uuid) -> Result<Destination>;

    /// Create a destination.
    fn create_destination(&self, entry: &Destination) -> Result<()>;

    /// All autos.
    fn autos(&self) -> Result<Vec<Auto>>;

    /// Load one auto. Resolves the class label for capacity lookup.
    fn auto(&self, id: Uuid) -> Result<Auto>;
}
