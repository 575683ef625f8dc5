//! Core types for dbqueue: message records.
//!
//! [`Record`] is one committed row of the message log. The delivery watermark
//! lives in [`cursor`](crate::cursor).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::cursor::Cursor;

/// A committed message in the log.
///
/// Records are created by produce and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    /// Unique id, strictly increasing in insertion order
    pub id: i64,
    /// Store clock at insertion
    pub enqueued_at: DateTime<Utc>,
    /// Visibility deadline: `enqueued_at + delay`
    pub visible_at: DateTime<Utc>,
    /// Opaque payload, byte-identical to what the producer supplied
    pub message: Vec<u8>,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record {{ id: {}, enqueued_at: {}, visible_at: {}, message: {} bytes }}",
            self.id,
            self.enqueued_at,
            self.visible_at,
            self.message.len()
        )
    }
}
