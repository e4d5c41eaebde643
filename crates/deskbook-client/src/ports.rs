//! Seams between the booking planner and the backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use deskbook_engine::{ProposedWindow, ReservationWindow, ResourceId};

use crate::error::Result;
use crate::types::{BookingConfirmation, BookingMetadata};

/// Source of the existing reservations for one resource on one date.
#[async_trait]
pub trait AvailabilityFetcher: Send + Sync {
    async fn fetch_reservations(
        &self,
        resource: &ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<ReservationWindow>>;
}

/// Sink for confirmed bookings.
///
/// The backend is authoritative: implementations report a server-side rejection of
/// an overlapping booking as `ClientError::SubmitConflict`.
#[async_trait]
pub trait BookingSubmitter: Send + Sync {
    async fn submit_booking(
        &self,
        resource: &ResourceId,
        window: &ProposedWindow,
        metadata: &BookingMetadata,
    ) -> Result<BookingConfirmation>;
}
