//! Vec-backed record store for tests and ephemeral deployments.

use async_trait::async_trait;
use tokio::sync::RwLock;

use atende_core::store::{RecordStore, StoreError};

pub struct MemoryStore<R> {
    records: RwLock<Vec<R>>,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self { records: RwLock::new(Vec::new()) }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> RecordStore<R> for MemoryStore<R>
where
    R: Clone + Send + Sync,
{
    async fn load_all(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    async fn append(&self, record: R) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
