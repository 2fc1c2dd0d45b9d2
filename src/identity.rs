//! Identifier minting for voyages and cargo items.
//!
//! Identifiers are generated client-side, before the first persist, so that
//! edit and transfer logic can reference a record that does not exist in the
//! store yet. The generator is a capability handed to the board rather than a
//! global, which keeps board tests deterministic.

use uuid::Uuid;

/// A source of fresh, collision-resistant identifiers.
pub trait IdSource {
    /// Mint a new identifier.
    fn mint(&mut self) -> Uuid;
}

/// The production source: random v4 UUIDs.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn mint(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SequentialIds;
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        let mut ids = RandomIds;
        assert_ne!(ids.mint(), ids.mint());
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.mint(), Uuid::from_u128(1));
        assert_eq!(ids.mint(), Uuid::from_u128(2));
    }
}
