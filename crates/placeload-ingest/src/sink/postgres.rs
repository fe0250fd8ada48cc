// Postgres document sink
//
// Each collection is one table keyed by place_id with the full document in a
// JSONB column. A batch is written inside a single transaction, split into
// multi-row INSERT statements to stay under the bind parameter limit (65,535).

use anyhow::Context;
use async_trait::async_trait;
use placeload_common::types::PlaceDocument;
use placeload_common::{PlaceloadError, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use tracing::{debug, info};

use super::DocumentSink;
use crate::config::{is_plain_identifier, ConflictPolicy, StoreConfig};

/// Rows per INSERT statement (two bind parameters per row)
const INSERT_CHUNK_SIZE: usize = 1000;

/// Writes place documents into a Postgres table
pub struct PgDocumentSink {
    pool: PgPool,
    table: String,
    on_conflict: ConflictPolicy,
}

impl PgDocumentSink {
    /// Connect to the store and make sure the collection table exists
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = PgConnectOptions::from_str(&config.uri)
            .map_err(|e| PlaceloadError::Config(format!("invalid STORE_URI: {}", e)))?
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                PlaceloadError::Store(format!(
                    "failed to connect to database {:?}: {}",
                    config.database, e
                ))
            })?;

        info!(
            database = %config.database,
            collection = %config.collection,
            max_connections = config.max_connections,
            "Connected to document store"
        );

        let sink = Self::from_pool(pool, &config.collection, config.on_conflict)?;
        sink.ensure_collection().await?;
        Ok(sink)
    }

    /// Wrap an existing pool. The collection name must be a plain identifier.
    pub fn from_pool(pool: PgPool, collection: &str, on_conflict: ConflictPolicy) -> Result<Self> {
        if !is_plain_identifier(collection) {
            return Err(PlaceloadError::Config(format!(
                "collection name {:?} is not a plain identifier",
                collection
            )));
        }

        Ok(Self {
            pool,
            table: collection.to_string(),
            on_conflict,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn quoted_table(&self) -> String {
        format!("\"{}\"", self.table)
    }

    /// Create the collection table if missing
    pub async fn ensure_collection(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                place_id TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                ingested_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            self.quoted_table()
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                PlaceloadError::Store(format!("failed to create collection {}: {}", self.table, e))
            })?;

        debug!(collection = %self.table, "Collection ready");
        Ok(())
    }

    /// Number of documents currently stored in the collection
    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.quoted_table());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PlaceloadError::Store(format!("failed to count {}: {}", self.table, e)))
    }

    async fn insert_batch(&self, documents: &[PlaceDocument]) -> anyhow::Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let mut inserted = 0u64;
        for chunk in documents.chunks(INSERT_CHUNK_SIZE) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (place_id, document) ",
                self.quoted_table()
            ));

            query_builder.push_values(chunk.iter(), |mut b, doc| {
                b.push_bind(&doc.place_id).push_bind(Json(doc));
            });

            if self.on_conflict == ConflictPolicy::Skip {
                query_builder.push(" ON CONFLICT (place_id) DO NOTHING");
            }

            let result = query_builder
                .build()
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert {} documents", chunk.len()))?;
            inserted += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }
}

#[async_trait]
impl DocumentSink for PgDocumentSink {
    fn collection(&self) -> &str {
        &self.table
    }

    async fn insert_many(&self, documents: &[PlaceDocument]) -> Result<u64> {
        if documents.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .insert_batch(documents)
            .await
            .map_err(|e| PlaceloadError::Store(format!("{:#}", e)))?;

        let skipped = (documents.len() as u64).saturating_sub(inserted);
        if skipped > 0 {
            debug!(
                collection = %self.table,
                skipped,
                "Skipped documents that were already stored"
            );
        }

        Ok(inserted)
    }
}
