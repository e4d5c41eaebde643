//! Request and response bodies exchanged with the booking backend.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use deskbook_engine::{EngineError, ReservationWindow, ResourceId, ResourceKind, TimeMinutes};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

// ── Availability ────────────────────────────────────────────────────────────

/// `GET /employee/check_workspace_availability`
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub bookings: Vec<BookingRow>,
}

impl AvailabilityResponse {
    /// Convert the rows into validated reservation windows.
    ///
    /// A single malformed row fails the whole conversion: a partial set could hide
    /// a real conflict.
    pub fn into_reservations(self) -> Result<Vec<ReservationWindow>, ClientError> {
        self.bookings
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                ReservationWindow::parse(
                    row.required_id.unwrap_or_default(),
                    &row.start_time,
                    &row.end_time,
                )
                .map_err(|e| ClientError::Decode {
                    message: format!("booking #{}: {}", i + 1, e),
                })
            })
            .collect()
    }
}

/// One existing booking as the backend reports it. Times are kept raw and
/// validated when converted into reservation windows.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRow {
    #[serde(default)]
    pub required_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

/// `GET /employee/get_workstation?type=...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceOccupancy {
    pub workspace_id: String,
    pub status: String,
    #[serde(default)]
    pub occupant: Option<String>,
    #[serde(default)]
    pub time_slot: Option<(String, String)>,
}

// ── Booking ─────────────────────────────────────────────────────────────────

/// Days a recurring booking repeats on, sent as `"mo,we,fr"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule(Vec<Weekday>);

impl WeeklySchedule {
    pub fn new(mut days: Vec<Weekday>) -> Self {
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        WeeklySchedule(days)
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mo",
        Weekday::Tue => "tu",
        Weekday::Wed => "we",
        Weekday::Thu => "th",
        Weekday::Fri => "fr",
        Weekday::Sat => "sa",
        Weekday::Sun => "su",
    }
}

impl fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.0.iter().map(|d| weekday_code(*d)).collect();
        f.write_str(&codes.join(","))
    }
}

impl FromStr for WeeklySchedule {
    type Err = EngineError;

    /// Accepts two-letter codes (`mo`) or anything chrono understands (`mon`, `Monday`).
    fn from_str(s: &str) -> Result<Self, EngineError> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let lower = part.to_ascii_lowercase();
                [
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                    Weekday::Sat,
                    Weekday::Sun,
                ]
                .into_iter()
                .find(|d| weekday_code(*d) == lower)
                .or_else(|| lower.parse::<Weekday>().ok())
                .ok_or_else(|| EngineError::Validation {
                    field: "schedule",
                    message: format!("unknown weekday '{}'", part),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WeeklySchedule::new(days))
    }
}

/// Caller-supplied details that accompany a booking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingMetadata {
    pub purpose: String,
    pub date: Option<NaiveDate>,
    pub schedule: Option<WeeklySchedule>,
}

/// `POST /employee/book_workspace`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    #[serde(rename = "workspace_ID")]
    pub workspace_id: ResourceId,
    pub start_time: TimeMinutes,
    pub end_time: TimeMinutes,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
}

/// `GET /employee/my_bookings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyBooking {
    pub booking_id: String,
    #[serde(default, rename = "workspace_ID")]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CancelBookingRequest<'a> {
    pub booking_id: &'a str,
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub device_info: DeviceInfo,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeviceInfo {
    pub device_type: &'static str,
    pub browser: String,
    pub os: &'static str,
    pub ip_address: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

// ── Other operations ────────────────────────────────────────────────────────

/// `POST /mark_wfh_tomorrow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfhResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    ImmediateSeat,
    ImmediateDiscussionRoom,
}

impl ConflictType {
    pub fn for_kind(kind: ResourceKind) -> Self {
        if kind.is_room() {
            ConflictType::ImmediateDiscussionRoom
        } else {
            ConflictType::ImmediateSeat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnBehalfOf {
    #[serde(rename = "self")]
    Myself,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// `POST /employee/raise_conflict`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaiseConflictRequest {
    pub conflict_type: ConflictType,
    pub on_behalf_of: OnBehalfOf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub severity: Severity,
    pub description: String,
    /// `"HH:MM - HH:MM"`
    pub required_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictTicket {
    pub conflict_id: String,
    pub status: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub assigned_resource: Option<String>,
}

/// Multipart fields for `POST /employee/get_visitor_pass`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorPassRequest {
    pub visitor_name: String,
    pub visitor_phone: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorPassResponse {
    pub visitor_pass_link: String,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
