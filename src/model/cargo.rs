//! Cargo records: one unit of freight.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cargo item as the store persists it.
///
/// `size` is in capacity units and is always positive once committed; the
/// board validates that before any record reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub id: Uuid,
    pub name: String,
    pub size: u32,
}
