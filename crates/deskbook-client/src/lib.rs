//! # deskbook-client
//!
//! Async client for the workspace-booking backend and the planner that gates
//! bookings on the conflict check from `deskbook-engine`.
//!
//! - [`client`] — `DeskbookClient`: REST endpoints, token refresh, retries
//! - [`planner`] — `BookingPlanner`: selection state and the submit gate
//! - [`ports`] — `AvailabilityFetcher` / `BookingSubmitter` seams
//! - [`session`] — Bearer token and signed-in user
//! - [`config`] — `ClientConfig` and its environment overrides
//! - [`types`] — Wire types
//! - [`error`] — Error types

pub mod client;
pub mod config;
pub mod error;
pub mod planner;
pub mod ports;
pub mod session;
pub mod types;

pub use client::DeskbookClient;
pub use config::ClientConfig;
pub use error::{BlockReason, ClientError, Result};
pub use planner::{Availability, BookingPlanner, FetchOutcome, FetchTicket, Verdict, CONFLICT_WARNING};
pub use ports::{AvailabilityFetcher, BookingSubmitter};
pub use session::{is_token_expired, Session, User};
pub use types::{BookingConfirmation, BookingMetadata, BookingRequest, WeeklySchedule};
