//! Booking rules per resource kind.
//!
//! - Every booking lies inside the opening hours (09:00-18:00 by default).
//! - Discussion and conference rooms: at least one hour, at most the whole day.
//! - Workstations: full day only.
//! - Hot seats: any window inside opening hours.

use crate::error::{EngineError, Result};
use crate::resource::ResourceKind;
use crate::time::TimeMinutes;
use crate::window::{ProposedWindow, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub open: TimeMinutes,
    pub close: TimeMinutes,
    pub min_room_minutes: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            open: TimeMinutes::from_hm(9, 0).unwrap_or(TimeMinutes::MIDNIGHT),
            close: TimeMinutes::from_hm(18, 0).unwrap_or(TimeMinutes::MIDNIGHT),
            min_room_minutes: 60,
        }
    }
}

impl BookingPolicy {
    /// The whole bookable day as a window, if the opening hours form one.
    pub fn full_day(&self) -> Result<ProposedWindow> {
        ProposedWindow::new(self.open, self.close)
    }

    /// Check a proposed window against the rules for `kind`.
    ///
    /// # Errors
    /// Returns `EngineError::PolicyViolation` describing the first rule broken.
    pub fn check(&self, kind: ResourceKind, window: &ProposedWindow) -> Result<()> {
        if window.start() < self.open || window.end() > self.close {
            return Err(EngineError::PolicyViolation(format!(
                "{} bookings must fall within {}-{}",
                kind, self.open, self.close
            )));
        }

        match kind {
            ResourceKind::Workstation => {
                if window.start() != self.open || window.end() != self.close {
                    return Err(EngineError::PolicyViolation(format!(
                        "workstations are booked for the full day only ({}-{})",
                        self.open, self.close
                    )));
                }
            }
            ResourceKind::DiscussionRoom | ResourceKind::ConferenceRoom => {
                if window.duration_minutes() < self.min_room_minutes {
                    return Err(EngineError::PolicyViolation(format!(
                        "{} bookings last at least {} minutes",
                        kind.label().to_lowercase(),
                        self.min_room_minutes
                    )));
                }
            }
            ResourceKind::HotSeat => {}
        }

        Ok(())
    }

    /// Times offered by the start/end pickers: hourly across opening hours for
    /// rooms and hot seats, only the opening time for workstations.
    pub fn slot_times(&self, kind: ResourceKind) -> Vec<TimeMinutes> {
        if kind == ResourceKind::Workstation {
            return vec![self.open];
        }
        (self.open.hour()..=self.close.hour())
            .filter_map(|h| TimeMinutes::from_hm(h, 0))
            .filter(|t| *t >= self.open && *t <= self.close)
            .collect()
    }
}
