//! Shared helpers for placeload-ingest integration tests
//!
//! - [`RecordingSink`]: in-memory sink that records every batch and can be
//!   told to fail or to cancel a token after a number of commits
//! - CSV fixtures written into a temp directory
//! - [`LineReader`]: hands the CSV parser one line per read and cancels a
//!   token on a chosen read, to interrupt a run in the middle of a batch
//! - [`init_test_tracing`] for log output captured by the test harness

#![allow(dead_code)]

use async_trait::async_trait;
use placeload_common::types::PlaceDocument;
use placeload_common::{PlaceloadError, Result};
use placeload_ingest::config::PipelineSettings;
use placeload_ingest::sink::DocumentSink;
use placeload_ingest::source::RecordSource;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const HEADER: &str =
    "place_id,name,address,district,country,division,postal_code,types,verified,latitude,longitude";

// ============================================================================
// Recording sink
// ============================================================================

#[derive(Default)]
struct Recorded {
    batches: Vec<Vec<PlaceDocument>>,
    attempts: usize,
}

/// Sink double; clones share the same recording
#[derive(Clone, Default)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
    /// 1-based insert attempt that fails
    fail_on: Option<usize>,
    /// Cancel this token once the given number of batches has been stored
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `attempt`-th call to `insert_many` (1-based)
    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Self::default()
        }
    }

    /// Cancel `token` right after `batches` batches were stored
    pub fn cancelling_after(batches: usize, token: CancellationToken) -> Self {
        Self {
            cancel_after: Some((batches, token)),
            ..Self::default()
        }
    }

    /// Stored batches as lists of place ids
    pub fn batch_keys(&self) -> Vec<Vec<String>> {
        let recorded = self.recorded.lock().unwrap_or_else(|e| e.into_inner());
        recorded
            .batches
            .iter()
            .map(|batch| batch.iter().map(|doc| doc.place_id.clone()).collect())
            .collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_keys().iter().map(Vec::len).collect()
    }

    pub fn documents(&self) -> Vec<PlaceDocument> {
        let recorded = self.recorded.lock().unwrap_or_else(|e| e.into_inner());
        recorded.batches.concat()
    }

    pub fn attempts(&self) -> usize {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner()).attempts
    }
}

#[async_trait]
impl DocumentSink for RecordingSink {
    fn collection(&self) -> &str {
        "places_test"
    }

    async fn insert_many(&self, documents: &[PlaceDocument]) -> Result<u64> {
        let mut recorded = self.recorded.lock().unwrap_or_else(|e| e.into_inner());
        recorded.attempts += 1;

        if self.fail_on == Some(recorded.attempts) {
            return Err(PlaceloadError::Store("simulated bulk insert failure".to_string()));
        }

        recorded.batches.push(documents.to_vec());

        if let Some((after, ref token)) = self.cancel_after {
            if recorded.batches.len() >= after {
                token.cancel();
            }
        }

        Ok(documents.len() as u64)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// One 11-column row for `id` located in `country`
pub fn place_row(id: &str, country: &str) -> String {
    format!(
        "{id},Place {id},\"1 Road, {id}\",Dhaka,{country},Dhaka Division,1205,\"['restaurant', 'food']\",true,23.75,90.39"
    )
}

/// Rows `p1..=pN` in Bangladesh
pub fn numbered_rows(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| place_row(&format!("p{}", i), "Bangladesh"))
        .collect()
}

/// Write `HEADER` plus `rows` to `dir/name`
pub fn write_csv(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = String::from(HEADER);
    contents.push('\n');
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(&path, contents).expect("Failed to write test CSV");
    path
}

pub fn open_source(path: &Path) -> RecordSource<File> {
    RecordSource::open(path, b',').expect("Failed to open test CSV")
}

/// Quiet pipeline settings for `input` with the given batch size
pub fn settings(input: &Path, batch_size: usize) -> PipelineSettings {
    PipelineSettings {
        batch_size,
        ..PipelineSettings::for_input(input)
    }
}

pub fn read_checkpoint(settings: &PipelineSettings) -> Option<String> {
    std::fs::read_to_string(&settings.checkpoint_path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Interrupting reader
// ============================================================================

/// Serves `HEADER` plus rows one line per `read` call
pub struct LineReader {
    lines: VecDeque<Vec<u8>>,
    reads: usize,
    cancel_on: Option<(usize, CancellationToken)>,
}

impl LineReader {
    pub fn new(rows: &[String]) -> Self {
        let lines = std::iter::once(HEADER.to_string())
            .chain(rows.iter().cloned())
            .map(|line| format!("{}\n", line).into_bytes())
            .collect();
        Self {
            lines,
            reads: 0,
            cancel_on: None,
        }
    }

    /// Cancel `token` during the `read`-th call (1-based; read 1 is the header)
    pub fn cancelling_on(mut self, read: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((read, token));
        self
    }
}

impl Read for LineReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if let Some((read, ref token)) = self.cancel_on {
            if self.reads == read {
                token.cancel();
            }
        }

        let Some(mut line) = self.lines.pop_front() else {
            return Ok(0);
        };
        let n = line.len().min(buf.len());
        buf[..n].copy_from_slice(&line[..n]);
        if n < line.len() {
            self.lines.push_front(line.split_off(n));
        }
        Ok(n)
    }
}

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,placeload_ingest=debug,sqlx=warn,testcontainers=info")
        }))
        .with_test_writer()
        .try_init();
}
