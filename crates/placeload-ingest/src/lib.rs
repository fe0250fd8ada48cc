//! Placeload Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Resumable bulk loading of a place catalog from a delimited text file into
//! a document collection.
//!
//! # Pipeline
//!
//! - [`source`]: streams raw rows in file order
//! - [`resume`]: skips rows a previous run already committed
//! - [`mapper`]: turns a row into a [`PlaceDocument`](placeload_common::types::PlaceDocument)
//! - [`batch`]: groups documents into fixed-size batches
//! - [`committer`]: bulk-inserts a batch, then advances the [`checkpoint`]
//! - [`cancel`]: turns SIGINT/SIGTERM into a cooperative stop
//!
//! # Example
//!
//! ```no_run
//! use placeload_ingest::config::{IngestArgs, IngestConfig};
//! use placeload_ingest::{cancel, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_args(IngestArgs {
//!         csv_file: Some("data/places.csv".into()),
//!         store_uri: Some("postgres://localhost:5432".to_string()),
//!         db_name: Some("geo".to_string()),
//!         collection_name: Some("locations".to_string()),
//!         batch_size: 1000,
//!         delimiter: ',',
//!         max_connections: 2,
//!         connect_timeout_secs: 10,
//!         ..Default::default()
//!     })?;
//!
//!     let summary = pipeline::ingest(&config, cancel::spawn_monitor()).await?;
//!     println!("{} documents committed", summary.committed);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cancel;
pub mod checkpoint;
pub mod committer;
pub mod config;
pub mod mapper;
pub mod pipeline;
pub mod progress;
pub mod resume;
pub mod sink;
pub mod source;

pub use pipeline::{ingest, IngestPipeline, RunOutcome, RunSummary};
