//! Booking planner: holds the current selection and decides whether it may be submitted.
//!
//! The planner is a plain state machine. Every mutation recomputes the [`Verdict`],
//! so the answer always reflects the latest resource, date, window and reservations.
//! Availability fetches are tagged with a [`FetchTicket`]; a response whose ticket is
//! no longer current is dropped instead of overwriting newer data.

use chrono::NaiveDate;
use deskbook_engine::{
    find_conflicts, BookingPolicy, Conflict, EngineError, ProposedWindow, ReservationWindow,
    ResourceId,
};
use tracing::{debug, info, warn};

use crate::error::{BlockReason, ClientError, Result};
use crate::ports::{AvailabilityFetcher, BookingSubmitter};
use crate::types::{BookingConfirmation, BookingMetadata};

/// Text shown next to the submit control while the window collides with a booking.
pub const CONFLICT_WARNING: &str = "Time conflict with another booking";

/// What is known about the selected resource's reservations.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Unselected,
    Loading,
    Loaded(Vec<ReservationWindow>),
    /// The fetch failed; the reservation set is unknown.
    Failed(String),
}

/// Outcome of evaluating the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    NoResource,
    NoWindow,
    InvalidWindow(String),
    AwaitingAvailability,
    AvailabilityFailed(String),
    Conflict(Vec<Conflict>),
    Clear,
}

impl Verdict {
    /// Why submission is refused, or `None` when the verdict is `Clear`.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            Verdict::NoResource => Some(BlockReason::NoResource),
            Verdict::NoWindow => Some(BlockReason::NoWindow),
            Verdict::InvalidWindow(msg) => Some(BlockReason::InvalidWindow(msg.clone())),
            Verdict::AwaitingAvailability => Some(BlockReason::AwaitingAvailability),
            Verdict::AvailabilityFailed(msg) => Some(BlockReason::AvailabilityFailed(msg.clone())),
            Verdict::Conflict(conflicts) => Some(BlockReason::Conflict {
                count: conflicts.len(),
            }),
            Verdict::Clear => None,
        }
    }
}

/// Identifies one availability fetch. Only the most recently issued ticket is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub resource: ResourceId,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer selection was made after this fetch started.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
struct Selection {
    resource: ResourceId,
    date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
struct WindowInput {
    start: String,
    end: String,
    parsed: std::result::Result<ProposedWindow, EngineError>,
}

#[derive(Debug, Clone)]
pub struct BookingPlanner {
    policy: Option<BookingPolicy>,
    selection: Option<Selection>,
    availability: Availability,
    window: Option<WindowInput>,
    generation: u64,
    verdict: Verdict,
}

impl Default for BookingPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingPlanner {
    pub fn new() -> Self {
        Self {
            policy: None,
            selection: None,
            availability: Availability::Unselected,
            window: None,
            generation: 0,
            verdict: Verdict::NoResource,
        }
    }

    /// Also enforce the booking rules for the resource's kind. Resources whose
    /// code carries no known kind are only checked for overlaps.
    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = Some(policy);
        self.recompute();
        self
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn resource(&self) -> Option<&ResourceId> {
        self.selection.as_ref().map(|s| &s.resource)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.selection.as_ref().map(|s| s.date)
    }

    /// The parsed window, when both ends are valid and ordered.
    pub fn window(&self) -> Option<ProposedWindow> {
        self.window.as_ref().and_then(|w| w.parsed.clone().ok())
    }

    pub fn has_conflict(&self) -> bool {
        matches!(self.verdict, Verdict::Conflict(_))
    }

    pub fn can_submit(&self) -> bool {
        self.verdict == Verdict::Clear
    }

    /// Warning text to display, present only while a conflict exists.
    pub fn warning(&self) -> Option<&'static str> {
        self.has_conflict().then_some(CONFLICT_WARNING)
    }

    /// Choose a resource and date. Availability becomes `Loading` until the fetch
    /// for the returned ticket is applied.
    pub fn select(&mut self, resource: ResourceId, date: NaiveDate) -> FetchTicket {
        self.generation += 1;
        debug!(resource = %resource, date = %date, generation = self.generation, "Selection changed");

        self.selection = Some(Selection {
            resource: resource.clone(),
            date,
        });
        self.availability = Availability::Loading;
        self.recompute();

        FetchTicket {
            generation: self.generation,
            resource,
            date,
        }
    }

    /// A new ticket for the current selection, e.g. to reload after a rejected booking.
    pub fn reload(&mut self) -> Option<FetchTicket> {
        let selection = self.selection.clone()?;
        Some(self.select(selection.resource, selection.date))
    }

    /// Drop the selection and anything fetched for it.
    pub fn clear_selection(&mut self) {
        self.generation += 1;
        self.selection = None;
        self.availability = Availability::Unselected;
        self.recompute();
    }

    /// Store the result of the fetch identified by `ticket`, unless a newer fetch
    /// has been issued since.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<ReservationWindow>>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                resource = %ticket.resource,
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale availability"
            );
            return FetchOutcome::Stale;
        }

        self.availability = match result {
            Ok(reservations) => {
                debug!(resource = %ticket.resource, count = reservations.len(), "Availability applied");
                Availability::Loaded(reservations)
            }
            Err(e) => {
                warn!(resource = %ticket.resource, error = %e, "Availability fetch failed");
                Availability::Failed(e.to_string())
            }
        };
        self.recompute();
        FetchOutcome::Applied
    }

    /// Set the proposed window from raw `H:MM` strings.
    ///
    /// Invalid input is kept and reported through the verdict; the error is also
    /// returned so callers can show it next to the field.
    pub fn set_window(&mut self, start: &str, end: &str) -> std::result::Result<(), EngineError> {
        let parsed = ProposedWindow::parse(start, end);
        let outcome = parsed.clone().map(|_| ());
        self.window = Some(WindowInput {
            start: start.to_string(),
            end: end.to_string(),
            parsed,
        });
        self.recompute();
        outcome
    }

    /// The raw window strings as last entered.
    pub fn window_input(&self) -> Option<(&str, &str)> {
        self.window
            .as_ref()
            .map(|w| (w.start.as_str(), w.end.as_str()))
    }

    pub fn clear_window(&mut self) {
        self.window = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.verdict = self.evaluate();
    }

    fn evaluate(&self) -> Verdict {
        let Some(selection) = &self.selection else {
            return Verdict::NoResource;
        };
        let Some(input) = &self.window else {
            return Verdict::NoWindow;
        };
        let window = match &input.parsed {
            Ok(window) => window,
            Err(e) => return Verdict::InvalidWindow(e.to_string()),
        };

        if let (Some(policy), Some(kind)) = (&self.policy, selection.resource.kind()) {
            if let Err(e) = policy.check(kind, window) {
                return Verdict::InvalidWindow(e.to_string());
            }
        }

        match &self.availability {
            Availability::Unselected | Availability::Loading => Verdict::AwaitingAvailability,
            Availability::Failed(msg) => Verdict::AvailabilityFailed(msg.clone()),
            Availability::Loaded(reservations) => {
                let conflicts = find_conflicts(window, reservations);
                if conflicts.is_empty() {
                    Verdict::Clear
                } else {
                    Verdict::Conflict(conflicts)
                }
            }
        }
    }

    /// Fetch availability for the current selection and apply it.
    ///
    /// A failed fetch is recorded in the planner (blocking submission) and also
    /// returned to the caller.
    ///
    /// The planner stays mutably borrowed until the fetch completes, so no newer
    /// `select` can happen in between and the result is always applied. Callers that
    /// need to change the selection while a fetch is in flight should drive
    /// [`select`](Self::select) and [`apply_fetch`](Self::apply_fetch) themselves;
    /// only that path can produce [`FetchOutcome::Stale`].
    pub async fn refresh(&mut self, fetcher: &dyn AvailabilityFetcher) -> Result<FetchOutcome> {
        let ticket = self
            .reload()
            .ok_or(ClientError::Blocked(BlockReason::NoResource))?;

        let result = fetcher.fetch_reservations(&ticket.resource, ticket.date).await;
        let failure = result.as_ref().err().cloned();
        let outcome = self.apply_fetch(&ticket, result);

        match failure {
            Some(e) => Err(e),
            None => Ok(outcome),
        }
    }

    /// Hand the proposed window to the submitter if the verdict is `Clear`.
    ///
    /// # Errors
    /// `ClientError::Blocked` when the gate is closed (the submitter is not called),
    /// `ClientError::SubmitConflict` when the backend rejects the booking as overlapping.
    pub async fn submit(
        &self,
        submitter: &dyn BookingSubmitter,
        metadata: &BookingMetadata,
    ) -> Result<BookingConfirmation> {
        if let Some(reason) = self.verdict.block_reason() {
            info!(reason = %reason, "Booking blocked");
            return Err(ClientError::Blocked(reason));
        }

        let (Some(selection), Some(window)) = (&self.selection, self.window()) else {
            return Err(ClientError::Blocked(BlockReason::NoWindow));
        };

        let result = submitter
            .submit_booking(&selection.resource, &window, metadata)
            .await;
        if let Err(ClientError::SubmitConflict { message }) = &result {
            warn!(resource = %selection.resource, message = %message, "Booking lost a race with another booking");
        }
        result
    }
}
