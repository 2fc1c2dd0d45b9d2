//! Voyage records: one delivery trip.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A voyage joined against both catalogs, as `all_voyages` returns it.
///
/// `destination` and `auto` are display values alongside their catalog ids;
/// `kind` is the auto's class label, which drives the capacity lookup.
/// `cargos` lists attached cargo-item ids in attach order — the order carries
/// no meaning beyond display stability, but it is preserved through attach
/// and detach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyageRow {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub destination: String,
    pub auto_id: Uuid,
    pub auto: String,
    pub cargos: Vec<Uuid>,
    pub kind: String,
}
