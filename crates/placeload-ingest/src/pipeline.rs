//! Ingestion pipeline
//!
//! Drives one run end to end on a single task:
//!
//! ```text
//! RecordSource -> ResumeFilter -> PlaceMapper -> Batcher -> SinkCommitter
//!                                                                |
//!                                                         CheckpointStore
//! ```
//!
//! Records are processed strictly in file order. The checkpoint only ever
//! names the last key of a batch the sink accepted, so a restart after any
//! failure resumes at a batch boundary.

use placeload_common::error::EXIT_INTERRUPTED;
use placeload_common::types::PlaceDocument;
use placeload_common::{PlaceloadError, Result};
use std::io::Read;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::batch::{Batch, Batcher};
use crate::checkpoint::CheckpointStore;
use crate::committer::SinkCommitter;
use crate::config::{IngestConfig, PipelineSettings, StaleCheckpointPolicy};
use crate::mapper::{Mapped, PlaceMapper};
use crate::progress::ProgressReporter;
use crate::resume::ResumeFilter;
use crate::sink::{DocumentSink, PgDocumentSink};
use crate::source::{RawRecord, RecordSource};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOutcome {
    /// The whole input was consumed
    #[default]
    Completed,
    /// Stopped early by the cancellation token after flushing buffered rows
    Interrupted,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Interrupted => EXIT_INTERRUPTED,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows read after the resume point
    pub read: u64,
    /// Rows skipped because a previous run already committed them
    pub skipped_resume: u64,
    /// Rows excluded by the region filter
    pub filtered: u64,
    /// Documents sent in successful batches
    pub committed: u64,
    /// Documents the sink reported as stored (lower than `committed` when
    /// conflicts are skipped)
    pub inserted: u64,
    pub batches: u64,
    /// Checkpoint position at the end of the run
    pub last_key: Option<String>,
    /// The checkpoint key was never found in the input
    pub stale_checkpoint: bool,
    pub outcome: RunOutcome,
}

pub struct IngestPipeline<S> {
    settings: PipelineSettings,
    mapper: PlaceMapper,
    committer: SinkCommitter<S>,
    resume_from: Option<String>,
    cancel: CancellationToken,
    input_name: String,
}

impl<S: DocumentSink> IngestPipeline<S> {
    /// Build a pipeline and load its checkpoint.
    ///
    /// The persisted key is read even with `ignore_checkpoint` so an
    /// unreadable checkpoint file still fails fast.
    pub fn new(settings: PipelineSettings, sink: S, cancel: CancellationToken) -> Result<Self> {
        let mut checkpoint = CheckpointStore::new(&settings.checkpoint_path);

        let resume_from = if settings.ignore_checkpoint {
            if let Some(key) = checkpoint.read()? {
                info!(
                    checkpoint = %checkpoint.path().display(),
                    key = %key,
                    "Ignoring existing checkpoint, starting from the first row"
                );
            }
            None
        } else {
            checkpoint.load()?
        };

        if let Some(ref key) = resume_from {
            info!(
                checkpoint = %checkpoint.path().display(),
                key = %key,
                "Resuming after checkpoint"
            );
        }

        Ok(Self {
            mapper: PlaceMapper::new(settings.region.clone()),
            committer: SinkCommitter::new(sink, checkpoint),
            resume_from,
            cancel,
            input_name: "input".to_string(),
            settings,
        })
    }

    /// Name used for the input in log lines and errors
    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = name.into();
        self
    }

    pub fn resume_from(&self) -> Option<&str> {
        self.resume_from.as_deref()
    }

    /// Consume `source` and commit every admitted document.
    ///
    /// Returns `Interrupted` when the cancellation token fires; buffered
    /// documents are committed before returning. Input and store errors end
    /// the run without flushing, leaving the checkpoint at the last batch
    /// that was accepted.
    pub async fn run<R: Read>(mut self, source: RecordSource<R>) -> Result<RunSummary> {
        let mut records = ResumeFilter::new(self.resume_from.clone()).apply(source);
        let mut batcher = Batcher::new(self.settings.batch_size);
        let mut progress = ProgressReporter::new(self.settings.show_progress);
        let mut summary = RunSummary::default();

        let result = self
            .drive(&mut records, &mut batcher, &mut progress, &mut summary)
            .await;
        progress.finish(!matches!(result, Ok(RunOutcome::Completed)));

        summary.skipped_resume = records.resume_state().suppressed();
        summary.batches = self.committer.batches_committed();
        summary.last_key = self.committer.checkpoint().current().map(str::to_string);
        summary.outcome = result?;

        if summary.outcome == RunOutcome::Completed && records.resume_state().is_stale() {
            summary.stale_checkpoint = true;
            let key = records.resume_state().last_key().unwrap_or_default().to_string();

            match self.settings.stale_checkpoint {
                StaleCheckpointPolicy::Warn => warn!(
                    key = %key,
                    checkpoint = %self.settings.checkpoint_path.display(),
                    skipped = summary.skipped_resume,
                    "Checkpoint key not found in input; nothing was committed. \
                     Remove the checkpoint file or pass --ignore-checkpoint to start over"
                ),
                StaleCheckpointPolicy::Fail => {
                    return Err(PlaceloadError::StaleCheckpoint {
                        key,
                        input: self.input_name.clone(),
                    })
                },
            }
        }

        Ok(summary)
    }

    async fn drive<I>(
        &mut self,
        records: &mut I,
        batcher: &mut Batcher<PlaceDocument>,
        progress: &mut ProgressReporter,
        summary: &mut RunSummary,
    ) -> Result<RunOutcome>
    where
        I: Iterator<Item = Result<RawRecord>>,
    {
        loop {
            if self.cancel.is_cancelled() {
                info!(buffered = batcher.len(), "Cancellation requested, flushing buffered documents");
                if let Some(batch) = batcher.finish() {
                    self.commit(batch, progress, summary).await?;
                }
                return Ok(RunOutcome::Interrupted);
            }

            let Some(record) = records.next() else {
                break;
            };
            let record = record?;
            summary.read += 1;
            progress.record_read();

            match self.mapper.map(&record)? {
                Mapped::Document(doc) => {
                    if let Some(batch) = batcher.push(doc) {
                        self.commit(batch, progress, summary).await?;
                    }
                },
                Mapped::Filtered => {
                    trace!(line = record.line(), key = record.key(), "Row outside region");
                    summary.filtered += 1;
                    progress.record_filtered();
                },
            }
        }

        if let Some(batch) = batcher.finish() {
            debug!(size = batch.len(), "Committing final partial batch");
            self.commit(batch, progress, summary).await?;
        }

        Ok(RunOutcome::Completed)
    }

    async fn commit(
        &mut self,
        batch: Batch,
        progress: &mut ProgressReporter,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if let Some(receipt) = self.committer.commit(batch).await? {
            summary.committed += receipt.size as u64;
            summary.inserted += receipt.inserted;
            progress.batch_committed(receipt.size);
        }
        Ok(())
    }
}

/// Run one ingestion against the Postgres store described by `config`
pub async fn ingest(config: &IngestConfig, cancel: CancellationToken) -> Result<RunSummary> {
    info!(
        input = %config.input.display(),
        collection = %config.store.collection,
        batch_size = config.pipeline.batch_size,
        region = config.pipeline.region.as_deref().unwrap_or("*"),
        "Starting ingestion"
    );

    let source = RecordSource::open(&config.input, config.delimiter)?;
    let sink = PgDocumentSink::connect(&config.store).await?;
    let pool = sink.pool().clone();

    let pipeline = IngestPipeline::new(config.pipeline.clone(), sink, cancel)?
        .with_input_name(config.input.display().to_string());
    let result = pipeline.run(source).await;
    pool.close().await;

    let summary = result?;
    info!(
        read = summary.read,
        skipped_resume = summary.skipped_resume,
        filtered = summary.filtered,
        committed = summary.committed,
        inserted = summary.inserted,
        batches = summary.batches,
        last_key = summary.last_key.as_deref().unwrap_or(""),
        outcome = ?summary.outcome,
        "Ingestion finished"
    );

    Ok(summary)
}
