//! Catalog records: destinations and autos.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A destination catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: Uuid,
    /// Display value, e.g. a city name.
    pub value: String,
}

/// An auto (vehicle) catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auto {
    pub id: Uuid,
    /// Display value, e.g. a registration plate or model name.
    pub value: String,
    /// Class label fed to the capacity table. Free-form in the store;
    /// unknown labels simply yield zero capacity.
    pub kind: String,
}
