use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Booking, Lead, Ticket};

/// Failures a persistence collaborator may report. Read-side problems are
/// never surfaced here: a missing or unreadable store degrades to an empty
/// collection at the implementation level.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("could not serialize record: {0}")]
    Serialize(String),
    #[error("could not write record store: {0}")]
    Write(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// A finished record on its way to durable storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommittedRecord {
    Lead(Lead),
    Ticket(Ticket),
    Booking(Booking),
}

/// Append-only persistence for one record collection.
#[async_trait]
pub trait RecordStore<R>: Send + Sync {
    /// All records currently stored. Missing or corrupt stores read as empty.
    async fn load_all(&self) -> Vec<R>;

    async fn append(&self, record: R) -> Result<(), StoreError>;

    /// Connectivity probe for health reporting.
    async fn probe(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The persistence collaborator a flow sees: booked slots feed the schedule
/// option generator, and completed records are committed through here.
#[async_trait]
pub trait FlowPersistence: Send + Sync {
    async fn booked_slots(&self) -> Vec<String>;

    async fn commit(&self, record: CommittedRecord) -> Result<(), StoreError>;
}
