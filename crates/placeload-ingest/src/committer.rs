//! Batch committer
//!
//! Sends a batch to the sink and, only after the sink reports success, moves
//! the checkpoint to the batch's last key. A failed insert leaves the
//! checkpoint where it was so the whole batch is retried on the next run.

use placeload_common::{PlaceloadError, Result};
use tracing::{debug, info};

use crate::batch::Batch;
use crate::checkpoint::CheckpointStore;
use crate::sink::DocumentSink;

/// Outcome of one successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// 1-based batch number within this run
    pub batch: u64,
    pub size: usize,
    /// Documents the sink actually stored
    pub inserted: u64,
    pub last_key: String,
    /// Whether the checkpoint file was updated
    pub checkpoint_persisted: bool,
}

pub struct SinkCommitter<S> {
    sink: S,
    checkpoint: CheckpointStore,
    batches_committed: u64,
}

impl<S: DocumentSink> SinkCommitter<S> {
    pub fn new(sink: S, checkpoint: CheckpointStore) -> Self {
        Self {
            sink,
            checkpoint,
            batches_committed: 0,
        }
    }

    /// Commit a batch. Returns `Ok(None)` for an empty batch, which never
    /// reaches the sink.
    pub async fn commit(&mut self, batch: Batch) -> Result<Option<CommitReceipt>> {
        let Some(last) = batch.last() else {
            return Ok(None);
        };
        let last_key = last.place_id.clone();
        let number = self.batches_committed + 1;

        debug!(
            batch = number,
            size = batch.len(),
            collection = self.sink.collection(),
            "Inserting batch"
        );

        let inserted = self.sink.insert_many(&batch).await.map_err(|e| match e {
            PlaceloadError::Store(msg) => PlaceloadError::Store(format!(
                "batch {} ({} documents ending at {:?}): {}",
                number,
                batch.len(),
                last_key,
                msg
            )),
            other => other,
        })?;

        self.batches_committed = number;
        let checkpoint_persisted = self.checkpoint.advance(&last_key);

        info!(
            batch = number,
            size = batch.len(),
            inserted,
            last_key = %last_key,
            "Batch committed"
        );

        Ok(Some(CommitReceipt {
            batch: number,
            size: batch.len(),
            inserted,
            last_key,
            checkpoint_persisted,
        }))
    }

    pub fn batches_committed(&self) -> u64 {
        self.batches_committed
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
