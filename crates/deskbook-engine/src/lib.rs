//! # deskbook-engine
//!
//! Same-day reservation windows and half-open conflict detection for workspace booking.
//!
//! Everything here is pure and synchronous: the booking client fetches a resource's
//! reservations for a date, and this crate decides whether a proposed window collides
//! with any of them, where the free gaps are, and whether the window obeys the booking
//! rules for the resource kind.
//!
//! ## Modules
//!
//! - [`time`] — `H:MM` parsing into minutes since midnight
//! - [`window`] — Proposed and reserved windows (`start < end` enforced)
//! - [`conflict`] — Overlap detection between a proposal and existing reservations
//! - [`freebusy`] — Free gaps of a resource's day
//! - [`resource`] — Resource codes and kinds
//! - [`policy`] — Booking rules per resource kind
//! - [`validation`] — Form field checks
//! - [`error`] — Error types

pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod policy;
pub mod resource;
pub mod time;
pub mod validation;
pub mod window;

pub use conflict::{check_conflict, find_conflicts, has_conflict, overlaps, Conflict};
pub use error::EngineError;
pub use freebusy::{find_first_free_slot, find_free_slots, FreeSlot};
pub use policy::BookingPolicy;
pub use resource::{ResourceId, ResourceKind};
pub use time::{parse_time, TimeMinutes};
pub use window::{ProposedWindow, ReservationWindow, Window};
