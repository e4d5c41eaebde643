//! Detect overlaps between a proposed window and a resource's existing reservations.
//!
//! Windows are half-open: a proposal that starts exactly when a reservation ends
//! (or ends exactly when one starts) is NOT a conflict. Identical windows are.

use crate::error::Result;
use crate::window::{ProposedWindow, ReservationWindow, Window};

/// A reservation that overlaps the proposed window.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub reservation: ReservationWindow,
    pub overlap_minutes: i64,
}

/// Two windows overlap iff `a.start < b.end && b.start < a.end`.
pub fn overlaps(a: &impl Window, b: &impl Window) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Whether the proposed window overlaps ANY of the reservations.
///
/// A linear scan: reservation sets are per resource and day, so tens of entries at most.
pub fn has_conflict(proposed: &ProposedWindow, reservations: &[ReservationWindow]) -> bool {
    reservations.iter().any(|r| overlaps(r, proposed))
}

/// Every reservation overlapping the proposed window, in input order.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts(proposed: &ProposedWindow, reservations: &[ReservationWindow]) -> Vec<Conflict> {
    reservations
        .iter()
        .filter(|r| overlaps(*r, proposed))
        .map(|r| {
            let overlap_start = r.start().max(proposed.start());
            let overlap_end = r.end().min(proposed.end());
            Conflict {
                reservation: r.clone(),
                overlap_minutes: overlap_start.minutes_until(overlap_end),
            }
        })
        .collect()
}

/// Parse a raw `start`/`end` pair and check it against the reservations.
///
/// # Errors
/// Fails before any comparison with `EngineError::InvalidTime` when either time is
/// malformed, or `EngineError::InvalidWindow` when `start >= end`.
pub fn check_conflict(start: &str, end: &str, reservations: &[ReservationWindow]) -> Result<bool> {
    let proposed = ProposedWindow::parse(start, end)?;
    Ok(has_conflict(&proposed, reservations))
}
