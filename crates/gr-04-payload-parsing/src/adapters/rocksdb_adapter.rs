//! # RocksDB Repository
//!
//! Durable `ParsedVaaRepository`: JSON records keyed by MessageID. RocksDB
//! calls block, so they run on tokio's blocking pool.

use crate::domain::entities::ParsedVaaRecord;
use crate::domain::errors::RepositoryError;
use crate::ports::outbound::ParsedVaaRepository;
use rocksdb::{Options, DB};
use shared_types::MessageId;
use std::path::Path;
use std::sync::Arc;

pub struct RocksDbRepository {
    db: Arc<DB>,
}

impl RocksDbRepository {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, path)
            .map_err(|e| RepositoryError::Storage(format!("Failed to open RocksDB: {e}")))?;
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait::async_trait]
impl ParsedVaaRepository for RocksDbRepository {
    async fn upsert_parsed_vaa(&self, record: &ParsedVaaRecord) -> Result<(), RepositoryError> {
        let value =
            serde_json::to_vec(record).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let key = record.id.as_str().as_bytes().to_vec();
        let db = Arc::clone(&self.db);

        tokio::task::spawn_blocking(move || db.put(key, value))
            .await
            .map_err(|e| RepositoryError::Storage(format!("write task failed: {e}")))?
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    async fn get(&self, id: &MessageId) -> Result<Option<ParsedVaaRecord>, RepositoryError> {
        let key = id.as_str().as_bytes().to_vec();
        let db = Arc::clone(&self.db);

        let bytes = tokio::task::spawn_blocking(move || db.get(key))
            .await
            .map_err(|e| RepositoryError::Storage(format!("read task failed: {e}")))?
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        bytes
            .map(|b| {
                serde_json::from_slice(&b).map_err(|e| RepositoryError::Serialization(e.to_string()))
            })
            .transpose()
    }
}
