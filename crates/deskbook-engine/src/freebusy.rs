//! Compute the free gaps of a resource's day from its reservations.
//!
//! Sorts reservations by start time, merges overlapping or adjacent ones, then
//! walks the merged list to find gaps inside the opening hours.

use serde::Serialize;

use crate::time::TimeMinutes;
use crate::window::{ReservationWindow, Window};

/// A free slot on the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeSlot {
    pub start: TimeMinutes,
    pub end: TimeMinutes,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn between(start: TimeMinutes, end: TimeMinutes) -> Self {
        FreeSlot {
            start,
            end,
            duration_minutes: start.minutes_until(end),
        }
    }
}

/// Merge overlapping or adjacent reservations, clipped to `[open, close)`.
///
/// Returns a sorted, non-overlapping list of (start, end) intervals.
pub fn merge_busy_periods(
    reservations: &[ReservationWindow],
    open: TimeMinutes,
    close: TimeMinutes,
) -> Vec<(TimeMinutes, TimeMinutes)> {
    let mut intervals: Vec<(TimeMinutes, TimeMinutes)> = reservations
        .iter()
        .filter(|r| r.start() < close && r.end() > open)
        .map(|r| (r.start().max(open), r.end().min(close)))
        .collect();

    intervals.sort_unstable();

    let mut merged: Vec<(TimeMinutes, TimeMinutes)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Free slots between `open` and `close`, sorted by start time.
///
/// An empty or inverted opening window yields no slots.
pub fn find_free_slots(
    reservations: &[ReservationWindow],
    open: TimeMinutes,
    close: TimeMinutes,
) -> Vec<FreeSlot> {
    if open >= close {
        return Vec::new();
    }

    let mut free_slots = Vec::new();
    let mut cursor = open;

    for (busy_start, busy_end) in merge_busy_periods(reservations, open, close) {
        if cursor < busy_start {
            free_slots.push(FreeSlot::between(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    // Trailing gap after the last busy period.
    if cursor < close {
        free_slots.push(FreeSlot::between(cursor, close));
    }

    free_slots
}

/// The first free slot of at least `min_duration_minutes`.
pub fn find_first_free_slot(
    reservations: &[ReservationWindow],
    open: TimeMinutes,
    close: TimeMinutes,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    find_free_slots(reservations, open, close)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
