//! In-process implementation of the [`QueueStore`] trait.
//!
//! Rows live in a `BTreeMap` keyed by `(visible_at, id)`, which is exactly the
//! delivery order, so a range select is a map range scan. Time comes from an
//! injected [`Clock`]; pair it with [`ManualClock`](crate::clock::ManualClock) to
//! drive visibility deterministically.
//!
//! Every read of the store clock returns a distinct instant, as `clock_timestamp()`
//! does on a server. When the injected clock has not moved since the previous
//! read, the store steps one microsecond past it.

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::store::{to_chrono, QueueStore};
use crate::types::{Cursor, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Operations that can be made to fail once, for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// The next insert fails before anything is written.
    Insert,
    /// The next select fails as an unreachable store.
    Select,
    /// The next select fails while decoding a row.
    Scan,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<(DateTime<Utc>, i64), Record>,
    next_id: i64,
    last_read: Option<DateTime<Utc>>,
    fail_next: Option<FailPoint>,
}

impl MemoryState {
    fn read_clock(&mut self, clock: &dyn Clock) -> Result<DateTime<Utc>> {
        let now = clock.now();
        let at = match self.last_read {
            Some(last) if now <= last => last
                .checked_add_signed(chrono::Duration::microseconds(1))
                .ok_or_else(|| out_of_range(format!("store clock past {}", last)))?,
            _ => now,
        };
        self.last_read = Some(at);
        Ok(at)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl MemoryStore {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                next_id: 1,
                ..Default::default()
            })),
            clock: Arc::new(clock),
        }
    }

    /// Make the next matching operation fail.
    pub async fn fail_next(&self, point: FailPoint) {
        self.state.lock().await.fail_next = Some(point);
    }

    /// Number of committed rows.
    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn injected(message: &str) -> crate::error::BoxError {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, message.to_string()))
}

fn out_of_range(what: String) -> Error {
    Error::ValidationFailed {
        reason: format!("{} is out of the representable time range", what),
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn now(&self) -> Result<DateTime<Utc>> {
        self.state.lock().await.read_clock(self.clock.as_ref())
    }

    async fn insert(&self, payloads: &[Vec<u8>], delay: Duration) -> Result<Vec<Record>> {
        let delay_chrono = to_chrono(delay, "delay")?;
        let mut state = self.state.lock().await;

        if state.fail_next == Some(FailPoint::Insert) {
            state.fail_next = None;
            return Err(Error::TransactionFailed {
                source: injected("injected insert failure"),
                context: format!("Failed to insert batch of {} messages", payloads.len()),
            });
        }

        // Build the whole batch before touching the map so a failure leaves no rows.
        let first_id = state.next_id;
        let mut records = Vec::with_capacity(payloads.len());
        for (message, id) in payloads.iter().zip(first_id..) {
            let enqueued_at = state.read_clock(self.clock.as_ref())?;
            let visible_at = enqueued_at
                .checked_add_signed(delay_chrono)
                .ok_or_else(|| out_of_range(format!("{} + delay {:?}", enqueued_at, delay)))?;
            records.push(Record {
                id,
                enqueued_at,
                visible_at,
                message: message.clone(),
            });
        }

        state.next_id += records.len() as i64;
        for record in &records {
            state
                .rows
                .insert((record.visible_at, record.id), record.clone());
        }
        Ok(records)
    }

    async fn select_range(
        &self,
        after: Cursor,
        settle: Duration,
        limit: usize,
    ) -> Result<Vec<Record>> {
        let settle_chrono = to_chrono(settle, "settle window")?;
        let mut state = self.state.lock().await;

        match state.fail_next {
            Some(FailPoint::Select) => {
                state.fail_next = None;
                return Err(Error::ConnectionFailed {
                    source: injected("injected select failure"),
                    context: format!("Failed to select messages after {}", after),
                });
            }
            Some(FailPoint::Scan) => {
                state.fail_next = None;
                return Err(Error::ScanFailed {
                    source: injected("injected decode failure"),
                    context: format!("Failed to select messages after {}", after),
                });
            }
            _ => {}
        }

        let now = state.read_clock(self.clock.as_ref())?;
        let upper = now
            .checked_sub_signed(settle_chrono)
            .ok_or_else(|| out_of_range(format!("{} - settle window {:?}", now, settle)))?;
        let lower = Bound::Excluded((after.timestamp(), i64::MAX));

        // Rows tied with the last one kept come along, or the cursor would skip them.
        let mut boundary = None;
        Ok(state
            .rows
            .range((lower, Bound::Unbounded))
            .map(|(_, record)| record)
            .take_while(|record| record.visible_at <= upper)
            .enumerate()
            .take_while(|(i, record)| {
                if *i + 1 == limit {
                    boundary = Some(record.visible_at);
                }
                *i < limit || Some(record.visible_at) == boundary
            })
            .map(|(_, record)| record.clone())
            .collect())
    }
}
