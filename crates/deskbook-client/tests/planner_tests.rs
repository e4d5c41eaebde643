//! Planner gate behaviour with in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use deskbook_client::{
    AvailabilityFetcher, BlockReason, BookingConfirmation, BookingMetadata, BookingPlanner,
    BookingSubmitter, ClientError, FetchOutcome, Result, Verdict,
};
use deskbook_engine::{ProposedWindow, ReservationWindow, ResourceId, Window};

struct FixedFetcher {
    reservations: Vec<ReservationWindow>,
}

#[async_trait]
impl AvailabilityFetcher for FixedFetcher {
    async fn fetch_reservations(&self, _: &ResourceId, _: NaiveDate) -> Result<Vec<ReservationWindow>> {
        Ok(self.reservations.clone())
    }
}

struct FailingFetcher;

#[async_trait]
impl AvailabilityFetcher for FailingFetcher {
    async fn fetch_reservations(&self, _: &ResourceId, _: NaiveDate) -> Result<Vec<ReservationWindow>> {
        Err(ClientError::Timeout {
            url: "http://backend/employee/check_workspace_availability".into(),
        })
    }
}

#[derive(Default)]
struct RecordingSubmitter {
    calls: AtomicUsize,
    last: Mutex<Option<(String, ProposedWindow)>>,
    reject_as_conflict: bool,
}

#[async_trait]
impl BookingSubmitter for RecordingSubmitter {
    async fn submit_booking(
        &self,
        resource: &ResourceId,
        window: &ProposedWindow,
        _: &BookingMetadata,
    ) -> Result<BookingConfirmation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((resource.to_string(), *window));
        if self.reject_as_conflict {
            return Err(ClientError::SubmitConflict {
                message: "already booked".into(),
            });
        }
        Ok(BookingConfirmation {
            message: Some("Booked".into()),
            booking_id: Some("B1".into()),
        })
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn reserved(start: &str, end: &str) -> ReservationWindow {
    ReservationWindow::parse("ENG001", start, end).unwrap()
}

fn planner_with(start: &str, end: &str) -> BookingPlanner {
    let mut planner = BookingPlanner::new();
    planner.select(ResourceId::parse("DR1").unwrap(), date());
    planner.set_window(start, end).unwrap();
    planner
}

#[tokio::test]
async fn conflicting_window_never_reaches_the_submitter() {
    let mut planner = planner_with("9:00", "10:30");
    let fetcher = FixedFetcher {
        reservations: vec![reserved("8:00", "9:00"), reserved("10:00", "11:00")],
    };
    assert_eq!(planner.refresh(&fetcher).await.unwrap(), FetchOutcome::Applied);

    let submitter = RecordingSubmitter::default();
    let err = planner
        .submit(&submitter, &BookingMetadata::default())
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::Blocked(BlockReason::Conflict { count: 1 }));
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn touching_window_is_submitted() {
    let mut planner = planner_with("9:00", "10:00");
    let fetcher = FixedFetcher {
        reservations: vec![reserved("10:00", "11:00")],
    };
    planner.refresh(&fetcher).await.unwrap();

    let submitter = RecordingSubmitter::default();
    let confirmation = planner
        .submit(&submitter, &BookingMetadata::default())
        .await
        .unwrap();

    assert_eq!(confirmation.booking_id.as_deref(), Some("B1"));
    let (resource, window) = submitter.last.lock().unwrap().clone().unwrap();
    assert_eq!(resource, "DR1");
    assert_eq!(window.start().to_string(), "09:00");
    assert_eq!(window.end().to_string(), "10:00");
}

#[tokio::test]
async fn unknown_availability_blocks_submission() {
    let mut planner = planner_with("9:00", "10:00");
    let submitter = RecordingSubmitter::default();

    // Before any fetch lands
    let err = planner
        .submit(&submitter, &BookingMetadata::default())
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Blocked(BlockReason::AwaitingAvailability));

    // After a failed fetch
    assert!(planner.refresh(&FailingFetcher).await.is_err());
    let err = planner
        .submit(&submitter, &BookingMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Blocked(BlockReason::AvailabilityFailed(_))));
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_side_conflict_is_distinct_from_the_client_gate() {
    let mut planner = planner_with("9:00", "10:00");
    planner
        .refresh(&FixedFetcher { reservations: vec![] })
        .await
        .unwrap();
    assert_eq!(planner.verdict(), &Verdict::Clear);

    let submitter = RecordingSubmitter {
        reject_as_conflict: true,
        ..Default::default()
    };
    let err = planner
        .submit(&submitter, &BookingMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SubmitConflict { .. }));
    assert!(!planner.has_conflict());
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_without_selection_is_blocked() {
    let mut planner = BookingPlanner::new();
    let err = planner
        .refresh(&FixedFetcher { reservations: vec![] })
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Blocked(BlockReason::NoResource));
}

#[tokio::test]
async fn refresh_supersedes_outstanding_tickets() {
    let mut planner = BookingPlanner::new();
    let outstanding = planner.select(ResourceId::parse("DR1").unwrap(), date());
    planner.set_window("9:00", "10:00").unwrap();

    let fetcher = FixedFetcher { reservations: vec![] };
    assert_eq!(planner.refresh(&fetcher).await.unwrap(), FetchOutcome::Applied);
    assert_eq!(planner.verdict(), &Verdict::Clear);

    // The manually issued ticket lost to the refresh and cannot overwrite it
    let outcome = planner.apply_fetch(&outstanding, Ok(vec![reserved("9:00", "10:00")]));
    assert_eq!(outcome, FetchOutcome::Stale);
    assert_eq!(planner.verdict(), &Verdict::Clear);
}
