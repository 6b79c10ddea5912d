//! In-process repository for local mode and tests.

use crate::domain::entities::ParsedVaaRecord;
use crate::domain::errors::RepositoryError;
use crate::ports::outbound::ParsedVaaRepository;
use dashmap::DashMap;
use shared_types::MessageId;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: DashMap<MessageId, ParsedVaaRecord>,
    writes: AtomicU64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Upserts performed, including overwrites.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl ParsedVaaRepository for InMemoryRepository {
    async fn upsert_parsed_vaa(&self, record: &ParsedVaaRecord) -> Result<(), RepositoryError> {
        self.records.insert(record.id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Option<ParsedVaaRecord>, RepositoryError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }
}
