//! Storage abstraction for the message log.
//!
//! A [`QueueStore`] owns the durable table and the clock that decides visibility.
//! It exposes exactly two data operations, an atomic batch insert and a read-only
//! range select, plus access to its clock.
//!
//! - [`postgres::PostgresStore`] keeps the log in PostgreSQL and uses the server clock.
//! - [`memory::MemoryStore`] keeps the log in process with an injectable [`Clock`](crate::clock::Clock).

use crate::error::{Error, Result};
use crate::types::{Cursor, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Durable, ordered storage of message records with store-side clock authority.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// The store's own notion of "now".
    async fn now(&self) -> Result<DateTime<Utc>>;

    /// Insert every payload with `visible_at = now() + delay` as one atomic unit.
    ///
    /// The clock is read once per row, in input order. Either all rows are
    /// committed and returned (ordered by id, which follows the input order) or
    /// none are.
    async fn insert(&self, payloads: &[Vec<u8>], delay: Duration) -> Result<Vec<Record>>;

    /// Return up to `limit` rows with `after < visible_at <= now() - settle`,
    /// ordered by `visible_at` then `id`.
    ///
    /// Two rows only share a `visible_at` when their clock reads coincide. Such
    /// a group is never split at the limit: the rows tied with the last one are
    /// included too. Otherwise a cursor advanced to that deadline would skip them.
    ///
    /// Read-only: rows are neither locked nor marked, so the same row is returned
    /// again whenever the same lower bound is reused.
    async fn select_range(
        &self,
        after: Cursor,
        settle: Duration,
        limit: usize,
    ) -> Result<Vec<Record>>;
}

pub(crate) fn to_chrono(duration: Duration, field: &str) -> Result<chrono::Duration> {
    chrono::Duration::from_std(duration).map_err(|e| Error::ValidationFailed {
        reason: format!("{} {:?} is out of range: {}", field, duration, e),
    })
}

pub(crate) fn to_micros(duration: Duration, field: &str) -> Result<i64> {
    i64::try_from(duration.as_micros()).map_err(|_| Error::ValidationFailed {
        reason: format!("{} {:?} is out of range", field, duration),
    })
}

pub(crate) fn to_limit(limit: usize) -> Result<i64> {
    i64::try_from(limit).map_err(|_| Error::ValidationFailed {
        reason: format!("limit {} is out of range", limit),
    })
}
