//! Grouping helpers for producers.
//!
//! [`chunk_by`] splits a finished slice. [`Batcher`] groups a live stream: it
//! emits a batch when `size` items are buffered or when `timeout` passes with
//! anything buffered, whichever comes first.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

/// Split `items` into consecutive chunks of at most `size` items.
///
/// A `size` of zero is treated as one.
pub fn chunk_by<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.max(1))
}

/// Size-or-timeout batching over an mpsc receiver.
///
/// The timeout restarts after every flush, so a batch that filled up early
/// does not shorten the wait for the next one.
pub struct Batcher<T> {
    rx: mpsc::Receiver<T>,
    size: usize,
    timeout: Duration,
    buffer: Vec<T>,
}

impl<T> Batcher<T> {
    pub fn new(rx: mpsc::Receiver<T>, size: usize, timeout: Duration) -> Self {
        let size = size.max(1);
        Self {
            rx,
            size,
            timeout,
            buffer: Vec::with_capacity(size),
        }
    }

    /// Wait for the next batch.
    ///
    /// Returns `None` once the sender side is closed and the remainder has been
    /// flushed. Never returns an empty batch; a window that passes with nothing
    /// buffered just starts the next one.
    pub async fn next_batch(&mut self) -> Option<Vec<T>> {
        let mut deadline = Instant::now() + self.timeout;

        loop {
            match timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(item)) => {
                    self.buffer.push(item);
                    if self.buffer.len() >= self.size {
                        return Some(self.flush());
                    }
                }
                Ok(None) if self.buffer.is_empty() => return None,
                Ok(None) => return Some(self.flush()),
                Err(_) if self.buffer.is_empty() => deadline = Instant::now() + self.timeout,
                Err(_) => return Some(self.flush()),
            }
        }
    }

    fn flush(&mut self) -> Vec<T> {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.size))
    }
}
