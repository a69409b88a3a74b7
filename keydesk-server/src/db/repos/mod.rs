//! Repository implementations for database access

pub mod attendees;

pub use attendees::{Attendee, AttendeeRepo, AttendeeUpdate, DbError};
