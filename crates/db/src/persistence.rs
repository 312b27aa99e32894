//! Wires the three per-domain record collections into the single
//! [`FlowPersistence`] collaborator the flow engine talks to.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use atende_core::config::{StorageBackend, StorageConfig};
use atende_core::domain::{Booking, Lead, Ticket};
use atende_core::store::{CommittedRecord, FlowPersistence, RecordStore, StoreError};

use crate::connection::connect_with_settings;
use crate::migrations;
use crate::stores::{
    JsonStore, MemoryStore, SqlBookingStore, SqlLeadStore, SqlTicketStore,
};

#[derive(Clone)]
pub struct DomainStores {
    leads: Arc<dyn RecordStore<Lead>>,
    tickets: Arc<dyn RecordStore<Ticket>>,
    bookings: Arc<dyn RecordStore<Booking>>,
}

#[derive(Debug, Error)]
pub enum StoreSetupError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl DomainStores {
    pub fn new(
        leads: Arc<dyn RecordStore<Lead>>,
        tickets: Arc<dyn RecordStore<Ticket>>,
        bookings: Arc<dyn RecordStore<Booking>>,
    ) -> Self {
        Self { leads, tickets, bookings }
    }

    /// JSON-file collections under `data_dir` (created on first append).
    pub fn json(data_dir: &Path) -> Self {
        Self::new(
            Arc::new(JsonStore::new(data_dir.join("leads.json"))),
            Arc::new(JsonStore::new(data_dir.join("tickets.json"))),
            Arc::new(JsonStore::new(data_dir.join("bookings.json"))),
        )
    }

    pub fn sqlite(pool: crate::DbPool) -> Self {
        Self::new(
            Arc::new(SqlLeadStore::new(pool.clone())),
            Arc::new(SqlTicketStore::new(pool.clone())),
            Arc::new(SqlBookingStore::new(pool)),
        )
    }

    /// Ephemeral collections for tests and diagnostics.
    pub fn memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.leads.load_all().await
    }

    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tickets.load_all().await
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.bookings.load_all().await
    }

    pub async fn append_lead(&self, lead: Lead) -> Result<(), StoreError> {
        self.leads.append(lead).await
    }

    pub async fn append_ticket(&self, ticket: Ticket) -> Result<(), StoreError> {
        self.tickets.append(ticket).await
    }

    pub async fn append_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.append(booking).await
    }

    /// Probes the lead collection; all three share one backend.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.leads.probe().await
    }
}

#[async_trait]
impl FlowPersistence for DomainStores {
    async fn booked_slots(&self) -> Vec<String> {
        self.bookings.load_all().await.into_iter().map(|booking| booking.slot).collect()
    }

    async fn commit(&self, record: CommittedRecord) -> Result<(), StoreError> {
        match record {
            CommittedRecord::Lead(lead) => self.leads.append(lead).await,
            CommittedRecord::Ticket(ticket) => self.tickets.append(ticket).await,
            CommittedRecord::Booking(booking) => self.bookings.append(booking).await,
        }
    }
}

/// Builds the stores the configuration asks for; the sqlite backend connects
/// and applies pending migrations up front.
pub async fn open_stores(storage: &StorageConfig) -> Result<DomainStores, StoreSetupError> {
    match storage.backend {
        StorageBackend::Json => Ok(DomainStores::json(Path::new(&storage.data_dir))),
        StorageBackend::Sqlite => {
            let pool = connect_with_settings(
                &storage.database_url,
                storage.max_connections,
                storage.timeout_secs,
            )
            .await
            .map_err(StoreSetupError::Connect)?;
            migrations::run_pending(&pool).await.map_err(StoreSetupError::Migration)?;
            Ok(DomainStores::sqlite(pool))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use atende_core::config::{StorageBackend, StorageConfig};
    use atende_core::domain::Booking;
    use atende_core::store::{CommittedRecord, FlowPersistence};

    use super::{open_stores, DomainStores};

    fn booking(slot: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            slot: slot.to_string(),
            interest: "demo".to_string(),
            contact: "a@b.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn commit_routes_records_to_the_matching_collection() {
        let stores = DomainStores::memory();

        stores
            .commit(CommittedRecord::Booking(booking("10/08/2026 09:00 BRT")))
            .await
            .expect("commit booking");

        assert_eq!(stores.bookings().await.len(), 1);
        assert!(stores.leads().await.is_empty());
        assert!(stores.tickets().await.is_empty());
        assert_eq!(stores.booked_slots().await, vec!["10/08/2026 09:00 BRT".to_string()]);
    }

    #[tokio::test]
    async fn open_stores_builds_the_sqlite_backend_with_migrations() {
        let storage = StorageConfig {
            backend: StorageBackend::Sqlite,
            data_dir: "unused".to_string(),
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        };

        let stores = open_stores(&storage).await.expect("sqlite stores");
        stores
            .commit(CommittedRecord::Booking(booking("11/08/2026 14:00 BRT")))
            .await
            .expect("commit through sqlite");
        assert_eq!(stores.bookings().await.len(), 1);
        stores.probe().await.expect("probe should succeed");
    }
}
