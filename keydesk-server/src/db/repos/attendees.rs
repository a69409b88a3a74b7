//! Attendee repository
//!
//! Lifecycle state is encoded entirely in the per-row booleans and
//! timestamp; "ready" and "missed" are query predicates evaluated at read
//! time. The one write-side rule, coupling `ready_timestamp` to writes of
//! `key_ready`, is enforced here in `update` and nowhere else.

use chrono::{DateTime, Duration, Utc};
use sqlx::error::ErrorKind;
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use crate::models::AttendeeName;

/// Minutes a ready key may sit uncollected before the attendee counts as
/// having missed the call.
const MISSED_WINDOW_MINUTES: i64 = 5;

/// Attendee record from database
#[derive(Debug, Clone, FromRow)]
pub struct Attendee {
    pub id: i64,
    pub name: String,
    pub queue_number: i64,
    pub key_ready: bool,
    pub key_collected: bool,
    pub ready_timestamp: Option<DateTime<Utc>>,
}

/// Partial field set for an update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AttendeeUpdate {
    pub name: Option<String>,
    pub queue_number: Option<i64>,
    pub key_ready: Option<bool>,
    pub key_collected: Option<bool>,
}

impl AttendeeUpdate {
    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.queue_number.is_none()
            && self.key_ready.is_none()
            && self.key_collected.is_none()
    }
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("queue number {queue_number} is already taken")]
    Conflict { queue_number: i64 },
}

impl DbError {
    fn attendee_not_found(queue_number: i64) -> Self {
        Self::NotFound {
            resource: "attendee",
            id: queue_number.to_string(),
        }
    }

    /// Map a unique-constraint violation onto `Conflict`.
    fn from_write(err: sqlx::Error, queue_number: i64) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation => {
                Self::Conflict { queue_number }
            }
            _ => Self::Sqlx(err),
        }
    }
}

/// Attendee repository
pub struct AttendeeRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AttendeeRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every attendee in storage order.
    pub async fn list(&self) -> Result<Vec<Attendee>, DbError> {
        let attendees = sqlx::query_as(
            r#"
            SELECT id, name, queue_number, key_ready, key_collected, ready_timestamp
            FROM attendees
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(attendees)
    }

    /// Get a single attendee by queue number.
    pub async fn get(&self, queue_number: i64) -> Result<Attendee, DbError> {
        sqlx::query_as(
            r#"
            SELECT id, name, queue_number, key_ready, key_collected, ready_timestamp
            FROM attendees
            WHERE queue_number = ?
            "#,
        )
        .bind(queue_number)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::attendee_not_found(queue_number))
    }

    /// Register a new attendee.
    ///
    /// Fails with `Conflict` when the queue number is already taken.
    pub async fn create(
        &self,
        name: &AttendeeName,
        queue_number: i64,
    ) -> Result<Attendee, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO attendees (name, queue_number)
            VALUES (?, ?)
            RETURNING id, name, queue_number, key_ready, key_collected, ready_timestamp
            "#,
        )
        .bind(name.as_str())
        .bind(queue_number)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_write(e, queue_number))
    }

    /// Apply a partial update to the attendee with the given queue number.
    ///
    /// Writing `key_ready` always rewrites `ready_timestamp`: to `now` when
    /// set true (even true over true), to NULL when set false. Callers must
    /// supply at least one field.
    ///
    /// Fails with `NotFound` when no row matches, `Conflict` when a new
    /// queue number collides with another attendee.
    pub async fn update(
        &self,
        queue_number: i64,
        fields: &AttendeeUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let mut qb = QueryBuilder::new("UPDATE attendees SET ");
        let mut set = qb.separated(", ");

        if let Some(name) = &fields.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(number) = fields.queue_number {
            set.push("queue_number = ").push_bind_unseparated(number);
        }
        if let Some(ready) = fields.key_ready {
            set.push("key_ready = ").push_bind_unseparated(ready);
            if ready {
                set.push("ready_timestamp = ").push_bind_unseparated(now);
            } else {
                set.push("ready_timestamp = NULL");
            }
        }
        if let Some(collected) = fields.key_collected {
            set.push("key_collected = ").push_bind_unseparated(collected);
        }

        qb.push(" WHERE queue_number = ").push_bind(queue_number);

        let result = qb
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_write(e, fields.queue_number.unwrap_or(queue_number)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::attendee_not_found(queue_number));
        }
        Ok(())
    }

    /// Queue number of the earliest-registered attendee whose key is ready
    /// and uncollected, i.e. the FIFO head of the pickup queue. `None` when
    /// nobody is waiting.
    pub async fn next_ready(&self) -> Result<Option<i64>, DbError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT queue_number
            FROM attendees
            WHERE key_ready = 1 AND key_collected = 0
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(n,)| n))
    }

    /// Queue numbers whose keys have been ready and uncollected since
    /// strictly before the missed window, as of `now`. Computed fresh per
    /// call.
    pub async fn missed(&self, now: DateTime<Utc>) -> Result<Vec<i64>, DbError> {
        let cutoff = now - Duration::minutes(MISSED_WINDOW_MINUTES);

        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT queue_number
            FROM attendees
            WHERE key_ready = 1 AND key_collected = 0
              AND ready_timestamp IS NOT NULL
              AND ready_timestamp < ?
            "#,
        )
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(n,)| n).collect())
    }
}
