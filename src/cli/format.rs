//! Output formatting for CLI display.

use uuid::Uuid;

use crate::board::Card;

/// First eight characters of an id, as shown everywhere in output.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Render one voyage card: route, capacity counter, and cargo lines.
pub(super) fn format_card(card: &Card) -> String {
    let mut out = format!(
        "{}  {} via {}  [free {}/{}]\n",
        short_id(card.voyage_id),
        card.destination,
        card.auto,
        card.remaining_units(),
        card.capacity_units,
    );
    if card.rows().is_empty() {
        out.push_str("    (no cargo loaded)\n");
        return out;
    }
    for row in card.rows() {
        out.push_str(&format!(
            "    {}  {}  {}\n",
            short_id(row.id),
            row.name().unwrap_or("(unapproved)"),
            row.committed_size()
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
        ));
    }
    out
}
