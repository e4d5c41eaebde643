//! Property-based tests for the overlap checker using proptest.
//!
//! These verify invariants that hold for any valid windows, not just the
//! hand-picked cases in `conflict_tests.rs`.

use deskbook_engine::{
    find_conflicts, find_free_slots, has_conflict, overlaps, ProposedWindow, ReservationWindow,
    TimeMinutes, Window,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A (start, end) pair of minutes with start < end, within one day.
fn arb_bounds() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1439).prop_flat_map(|start| (Just(start), (start + 1)..1440))
}

fn arb_proposed() -> impl Strategy<Value = ProposedWindow> {
    arb_bounds().prop_map(|(s, e)| {
        ProposedWindow::new(
            TimeMinutes::from_minutes(s).unwrap(),
            TimeMinutes::from_minutes(e).unwrap(),
        )
        .unwrap()
    })
}

fn arb_reservation() -> impl Strategy<Value = ReservationWindow> {
    arb_bounds().prop_map(|(s, e)| {
        ReservationWindow::new(
            "EMP001",
            TimeMinutes::from_minutes(s).unwrap(),
            TimeMinutes::from_minutes(e).unwrap(),
        )
        .unwrap()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// A single reservation conflicts exactly when the half-open predicate holds.
    #[test]
    fn single_reservation_matches_predicate(p in arb_proposed(), r in arb_reservation()) {
        let expected = r.start() < p.end() && p.start() < r.end();
        prop_assert_eq!(has_conflict(&p, std::slice::from_ref(&r)), expected);
    }

    /// Overlap is symmetric.
    #[test]
    fn overlap_is_symmetric(p in arb_proposed(), r in arb_reservation()) {
        prop_assert_eq!(overlaps(&p, &r), overlaps(&r, &p));
    }

    /// A set conflicts iff at least one member does.
    #[test]
    fn set_conflict_is_any(p in arb_proposed(), rs in prop::collection::vec(arb_reservation(), 0..20)) {
        let any = rs.iter().any(|r| has_conflict(&p, std::slice::from_ref(r)));
        prop_assert_eq!(has_conflict(&p, &rs), any);
    }

    /// Every reported conflict has a positive overlap no longer than either window.
    #[test]
    fn overlap_minutes_are_bounded(p in arb_proposed(), rs in prop::collection::vec(arb_reservation(), 0..20)) {
        let conflicts = find_conflicts(&p, &rs);
        prop_assert_eq!(conflicts.is_empty(), !has_conflict(&p, &rs));
        for c in conflicts {
            prop_assert!(c.overlap_minutes > 0);
            prop_assert!(c.overlap_minutes <= p.duration_minutes());
            prop_assert!(c.overlap_minutes <= c.reservation.duration_minutes());
        }
    }

    /// Same inputs, same answer.
    #[test]
    fn recomputation_is_idempotent(p in arb_proposed(), rs in prop::collection::vec(arb_reservation(), 0..20)) {
        prop_assert_eq!(has_conflict(&p, &rs), has_conflict(&p, &rs));
    }

    /// A free slot never conflicts with the reservations it was derived from.
    #[test]
    fn free_slots_are_conflict_free(rs in prop::collection::vec(arb_reservation(), 0..20)) {
        let open = TimeMinutes::from_minutes(0).unwrap();
        let close = TimeMinutes::from_minutes(1439).unwrap();
        for slot in find_free_slots(&rs, open, close) {
            let p = ProposedWindow::new(slot.start, slot.end).unwrap();
            prop_assert!(!has_conflict(&p, &rs));
        }
    }
}
