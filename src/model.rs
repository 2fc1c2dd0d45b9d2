//! Core data model for stowage.
//!
//! These are the persisted record shapes the store exposes: voyages, cargo
//! items, and the destination and auto catalogs. The board keeps its own
//! richer client-side state in `board`; these types are the wire between the
//! two.

mod cargo;
mod catalog;
mod voyage;

pub use cargo::Cargo;
pub use catalog::{Auto, Destination};
pub use voyage::VoyageRow;
