//! SQLite storage layer
//!
//! One table, ad-hoc SQL per request. Schema setup and first-run seeding
//! happen on startup; everything else goes through the attendee repository.

pub mod migrations;
pub mod pool;
pub mod repos;
