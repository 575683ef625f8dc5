//! Produce/consume interface over a [`QueueStore`].
//!
//! This module defines the [`Broker`], which inserts messages with a visibility
//! deadline and polls for messages whose deadline has passed.
//!
//! ## What
//!
//! - [`Broker::produce`] inserts a batch atomically with `visible_at = store now + delay`.
//! - [`Broker::consume`] returns messages with `cursor < visible_at <= store now`,
//!   ordered by `visible_at` then `id`, and advances the cursor to the largest
//!   `visible_at` it returned.
//! - Delivery is at-least-once: nothing is deleted or marked, so resetting the
//!   cursor to an older value re-delivers.
//!
//! ## How
//!
//! Produce takes `&self` and can run from many tasks at once. Consume takes
//! `&mut self`: one broker owns one cursor, and only one polling loop should
//! consume against it.
//!
//! ### Example
//!
//! ```rust
//! use dbqueue::{Broker, MemoryStore};
//! use std::time::Duration;
//!
//! # async fn example() -> dbqueue::Result<()> {
//! let mut broker = Broker::new(MemoryStore::default());
//! broker.produce(vec![br#"{"a":1}"#.to_vec()], Duration::ZERO).await?;
//! let records = broker.consume(10).await?;
//! assert_eq!(records.len(), 1);
//! # Ok(())
//! # }
//! ```
use crate::error::{Error, Result};
use crate::store::QueueStore;
use crate::types::{Cursor, Record};
use std::time::Duration;

pub struct Broker<S> {
    store: S,
    cursor: Cursor,
    settle: Duration,
}

impl<S: QueueStore> Broker<S> {
    /// Create a broker starting from [`Cursor::EARLIEST`].
    pub fn new(store: S) -> Self {
        Self::with_cursor(store, Cursor::EARLIEST)
    }

    /// Create a broker resuming from a checkpointed cursor.
    pub fn with_cursor(store: S, cursor: Cursor) -> Self {
        Self {
            store,
            cursor,
            settle: Duration::ZERO,
        }
    }

    /// Hold back messages whose deadline passed less than `settle` ago.
    ///
    /// A producer transaction that computed its deadline before a poll but
    /// committed after it would otherwise land below the advanced cursor.
    pub fn with_settle_window(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current delivery watermark.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Replace the watermark verbatim.
    ///
    /// Moving it backwards is allowed and re-delivers everything above the new value.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        if cursor < self.cursor {
            tracing::info!("Cursor rewound from {} to {}", self.cursor, cursor);
        }
        self.cursor = cursor;
    }

    /// Insert `messages` so they become visible `delay` after the store's now.
    ///
    /// The batch is committed as a unit. On failure nothing is visible and the
    /// error is returned without retry.
    pub async fn produce(&self, messages: Vec<Vec<u8>>, delay: Duration) -> Result<Vec<Record>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        match self.store.insert(&messages, delay).await {
            Ok(records) => {
                tracing::debug!(
                    "Produced {} messages visible after {:?} (ids {}..={})",
                    records.len(),
                    delay,
                    records.first().map_or(0, |r| r.id),
                    records.last().map_or(0, |r| r.id)
                );
                Ok(records)
            }
            Err(e) => {
                tracing::warn!("Produce of {} messages rolled back: {}", messages.len(), e);
                Err(e)
            }
        }
    }

    /// Return up to `limit` messages that became visible after the cursor.
    ///
    /// The cursor moves to the largest `visible_at` returned, and only forward.
    /// Messages whose deadlines coincide exactly with the last one returned come
    /// along with it, so the cursor never passes a message it has not offered.
    /// If the call fails the cursor is left untouched.
    pub async fn consume(&mut self, limit: usize) -> Result<Vec<Record>> {
        if limit == 0 {
            return Err(Error::ValidationFailed {
                reason: "consume limit must be a positive integer".to_string(),
            });
        }

        let records = self
            .store
            .select_range(self.cursor, self.settle, limit)
            .await?;

        if let Some(newest) = records.iter().map(|r| r.visible_at).max() {
            let next = Cursor::new(newest);
            if next > self.cursor {
                tracing::debug!("Cursor advanced from {} to {}", self.cursor, next);
                self.cursor = next;
            }
        }

        Ok(records)
    }
}
