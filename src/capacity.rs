//! Capacity lookup and allocation checks.
//!
//! Capacity is a single scalar per voyage, derived from the assigned
//! vehicle's class. Allocation is first-come-first-served: a mutation is
//! either accepted whole or rejected whole.

/// Capacity in units for a vehicle class label.
///
/// Unrecognized labels map to zero. That is not an error: a voyage with an
/// unknown vehicle class has no room, so every allocation against it fails
/// closed.
pub fn capacity_of(class: &str) -> u32 {
    match class {
        "van" => 4,
        "lorry" => 8,
        "semi" => 16,
        _ => 0,
    }
}

/// Whether a voyage with `remaining_units` free can absorb `delta` more units.
///
/// `delta` is the change in consumed capacity: the item size for an add or an
/// incoming transfer, `new - old` for an edit. A negative delta frees capacity
/// and is always allowed.
pub fn can_allocate(remaining_units: u32, delta: i64) -> bool {
    i64::from(remaining_units) - delta >= 0
}
