//! # dbqueue
//!
//! **dbqueue** delivers messages through an append-only PostgreSQL table. Each message
//! carries a visibility deadline; consumers poll for messages whose deadline has passed
//! and track their progress with a timestamp cursor.
//!
//! ## Features
//!
//! - **Delayed delivery**: a message becomes visible `delay` after it was produced,
//!   measured on the database server's clock.
//! - **Atomic batches**: a produce call commits all of its messages or none.
//! - **At-least-once**: nothing is deleted or locked; rewinding the cursor re-delivers.
//! - **Opaque payloads**: bytes go in and come back out unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dbqueue::{Broker, Config, PostgresStore};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_dsn("postgresql://localhost/mydb");
//! let store = PostgresStore::connect(&config).await?;
//! store.install().await?;
//!
//! let mut broker = Broker::new(store);
//! broker
//!     .produce(vec![br#"{"task":"send_email"}"#.to_vec()], Duration::from_secs(1))
//!     .await?;
//!
//! tokio::time::sleep(Duration::from_secs(1)).await;
//! for record in broker.consume(10).await? {
//!     println!("{}", record);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For a long-running consumer, wrap the broker in a [`Poller`] and persist the
//! cursor with a [`FileCheckpoint`].

pub mod batch;
pub mod broker;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod error;
pub mod poller;
pub mod store;
pub mod types;

pub use crate::batch::{chunk_by, Batcher};
pub use crate::broker::Broker;
pub use crate::checkpoint::FileCheckpoint;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::Config;
pub use crate::cursor::{parse_cursor, Cursor};
pub use crate::error::{Error, Result};
pub use crate::poller::Poller;
pub use crate::store::{MemoryStore, PostgresStore, QueueStore};
pub use crate::types::Record;
