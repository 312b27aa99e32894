//! File-backed record store: one JSON array per collection. An append is a
//! load-all / push / write-all cycle, serialized by an internal lock so
//! concurrent commits to the same collection never interleave.

use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

use atende_core::store::{RecordStore, StoreError};

pub struct JsonStore<R> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> JsonStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()), _marker: PhantomData }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl<R> JsonStore<R>
where
    R: DeserializeOwned + Send + Sync,
{
    async fn read_records(&self) -> Vec<R> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&raw) {
            Ok(records) => records,
            Err(error) => {
                warn!(
                    event_name = "store.json.corrupt_file",
                    path = %self.path.display(),
                    error = %error,
                    "record store unreadable, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<R> RecordStore<R> for JsonStore<R>
where
    R: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load_all(&self) -> Vec<R> {
        self.read_records().await
    }

    async fn append(&self, record: R) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await;
        records.push(record);

        let payload = serde_json::to_vec_pretty(&records)
            .map_err(|error| StoreError::Serialize(error.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|error| StoreError::Write(error.to_string()))?;
            }
        }
        tokio::fs::write(&self.path, payload)
            .await
            .map_err(|error| StoreError::Write(error.to_string()))
    }
}
