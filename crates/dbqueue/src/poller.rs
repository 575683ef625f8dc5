//! Polling driver around a [`Broker`].
//!
//! ## What
//!
//! [`Poller::run`] consumes in a loop and hands every non-empty batch to an async
//! handler. After a poll that returned nothing it sleeps for the poll interval.
//! The loop ends when the shutdown channel flips to `true` (or its sender goes
//! away), or on the first error from consume, the handler or the checkpoint.
//!
//! ## How
//!
//! Errors are returned, never retried here. Because the cursor is only advanced
//! by consume and persisted after the handler accepted the batch, restarting from
//! the last checkpoint re-delivers at most the batch that was in flight.
//!
//! ```no_run
//! # use dbqueue::{Broker, MemoryStore, Poller};
//! # use std::time::Duration;
//! # async fn example() -> dbqueue::Result<()> {
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let mut poller = Poller::new(Broker::new(MemoryStore::default()), 10, Duration::from_secs(5));
//!
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     shutdown_tx.send(true).ok();
//! });
//!
//! poller
//!     .run(
//!         |records| async move {
//!             println!("got {} records", records.len());
//!             Ok(())
//!         },
//!         shutdown_rx,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
use crate::broker::Broker;
use crate::checkpoint::FileCheckpoint;
use crate::config::Config;
use crate::error::Result;
use crate::store::QueueStore;
use crate::types::{Cursor, Record};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

pub struct Poller<S> {
    broker: Broker<S>,
    batch_size: usize,
    poll_interval: Duration,
    checkpoint: Option<FileCheckpoint>,
}

impl<S: QueueStore> Poller<S> {
    pub fn new(broker: Broker<S>, batch_size: usize, poll_interval: Duration) -> Self {
        Self {
            broker,
            batch_size,
            poll_interval,
            checkpoint: None,
        }
    }

    /// A poller using the batch size and poll interval from `config`.
    pub fn from_config(broker: Broker<S>, config: &Config) -> Self {
        Self::new(broker, config.batch_size, config.poll_interval())
    }

    /// Persist the cursor after every handled batch.
    pub fn with_checkpoint(mut self, checkpoint: FileCheckpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn broker(&self) -> &Broker<S> {
        &self.broker
    }

    pub fn cursor(&self) -> Cursor {
        self.broker.cursor()
    }

    /// Poll until shutdown is signalled or something fails.
    pub async fn run<F, Fut>(
        &mut self,
        mut handler: F,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()>
    where
        F: FnMut(Vec<Record>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        tracing::info!(
            "Polling from cursor {} (batch size {}, poll interval {:?})",
            self.broker.cursor(),
            self.batch_size,
            self.poll_interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let records = self.broker.consume(self.batch_size).await?;

            if records.is_empty() {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            // Sender dropped: nobody can ask us to keep going.
                            break;
                        }
                    }
                }
                continue;
            }

            let count = records.len();
            handler(records).await?;

            let cursor = self.broker.cursor();
            tracing::info!("Handled {} records, current cursor {}", count, cursor);

            if let Some(checkpoint) = &self.checkpoint {
                checkpoint.store(cursor).await?;
            }
        }

        tracing::info!("Polling stopped at cursor {}", self.broker.cursor());
        Ok(())
    }
}
