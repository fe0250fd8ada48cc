//! Document sink interface
//!
//! A sink receives whole batches. `insert_many` must be all-or-nothing from the
//! caller's point of view: on `Err` the checkpoint is not advanced and the
//! batch is re-sent on the next run.

mod postgres;

pub use postgres::PgDocumentSink;

use async_trait::async_trait;
use placeload_common::types::PlaceDocument;
use placeload_common::Result;

/// Bulk-insert target for place documents
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Name of the collection documents are written to
    fn collection(&self) -> &str;

    /// Insert `documents` in order.
    ///
    /// Returns the number of documents actually stored, which may be lower
    /// than `documents.len()` when the sink skips conflicting keys.
    async fn insert_many(&self, documents: &[PlaceDocument]) -> Result<u64>;
}
