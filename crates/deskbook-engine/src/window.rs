//! Proposed and reserved time windows on a single resource and day.
//!
//! Both window kinds uphold `start < end`; construction and deserialization reject
//! anything else with `EngineError::InvalidWindow`.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::{parse_time, TimeMinutes};

/// Anything with a half-open `[start, end)` extent in minutes since midnight.
pub trait Window {
    fn start(&self) -> TimeMinutes;
    fn end(&self) -> TimeMinutes;

    fn duration_minutes(&self) -> i64 {
        self.start().minutes_until(self.end())
    }
}

fn check_order(start: TimeMinutes, end: TimeMinutes) -> Result<()> {
    if start < end {
        Ok(())
    } else {
        Err(EngineError::InvalidWindow { start, end })
    }
}

/// The window the current user is trying to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawProposed")]
pub struct ProposedWindow {
    start: TimeMinutes,
    end: TimeMinutes,
}

impl ProposedWindow {
    pub fn new(start: TimeMinutes, end: TimeMinutes) -> Result<Self> {
        check_order(start, end)?;
        Ok(Self { start, end })
    }

    /// Parse both ends from `H:MM` strings and validate their order.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }
}

impl Window for ProposedWindow {
    fn start(&self) -> TimeMinutes {
        self.start
    }

    fn end(&self) -> TimeMinutes {
        self.end
    }
}

#[derive(Deserialize)]
struct RawProposed {
    start: TimeMinutes,
    end: TimeMinutes,
}

impl TryFrom<RawProposed> for ProposedWindow {
    type Error = EngineError;

    fn try_from(raw: RawProposed) -> Result<Self> {
        ProposedWindow::new(raw.start, raw.end)
    }
}

/// An existing confirmed booking on the selected resource for the selected date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawReservation")]
pub struct ReservationWindow {
    occupant: String,
    start: TimeMinutes,
    end: TimeMinutes,
}

impl ReservationWindow {
    pub fn new(occupant: impl Into<String>, start: TimeMinutes, end: TimeMinutes) -> Result<Self> {
        check_order(start, end)?;
        Ok(Self {
            occupant: occupant.into(),
            start,
            end,
        })
    }

    pub fn parse(occupant: impl Into<String>, start: &str, end: &str) -> Result<Self> {
        Self::new(occupant, parse_time(start)?, parse_time(end)?)
    }

    pub fn occupant(&self) -> &str {
        &self.occupant
    }
}

impl Window for ReservationWindow {
    fn start(&self) -> TimeMinutes {
        self.start
    }

    fn end(&self) -> TimeMinutes {
        self.end
    }
}

#[derive(Deserialize)]
struct RawReservation {
    #[serde(default)]
    occupant: String,
    start: TimeMinutes,
    end: TimeMinutes,
}

impl TryFrom<RawReservation> for ReservationWindow {
    type Error = EngineError;

    fn try_from(raw: RawReservation) -> Result<Self> {
        ReservationWindow::new(raw.occupant, raw.start, raw.end)
    }
}
