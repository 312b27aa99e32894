//! Sqlite-backed record stores. Reads degrade to empty collections on
//! failure; writes surface errors so a failed commit is never reported as a
//! success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use atende_core::domain::{Booking, Lead, Severity, Ticket};
use atende_core::store::{RecordStore, StoreError};

use crate::DbPool;

pub struct SqlLeadStore {
    pool: DbPool,
}

impl SqlLeadStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: String,
    name: String,
    email: String,
    company: String,
    team_size: String,
    interest: String,
    budget: Option<String>,
    created_at: DateTime<Utc>,
}

impl LeadRow {
    fn into_lead(self) -> Option<Lead> {
        Some(Lead {
            id: Uuid::parse_str(&self.id).ok()?,
            name: self.name,
            email: self.email,
            company: self.company,
            team_size: self.team_size,
            interest: self.interest,
            budget: self.budget,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl RecordStore<Lead> for SqlLeadStore {
    async fn load_all(&self) -> Vec<Lead> {
        let rows = sqlx::query_as::<_, LeadRow>(
            "SELECT id, name, email, company, team_size, interest, budget, created_at
             FROM leads ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().filter_map(LeadRow::into_lead).collect(),
            Err(error) => {
                warn!(
                    event_name = "store.sqlite.read_failed",
                    collection = "leads",
                    error = %error,
                    "record load failed, treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn append(&self, lead: Lead) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO leads (id, name, email, company, team_size, interest, budget, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(lead.id.to_string())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.company)
        .bind(&lead.team_size)
        .bind(&lead.interest)
        .bind(&lead.budget)
        .bind(lead.created_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|error| StoreError::Backend(error.to_string()))
    }

    async fn probe(&self) -> Result<(), StoreError> {
        probe_pool(&self.pool).await
    }
}

pub struct SqlTicketStore {
    pool: DbPool,
}

impl SqlTicketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    severity: String,
    description: String,
    contact: String,
    created_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Option<Ticket> {
        Some(Ticket {
            id: Uuid::parse_str(&self.id).ok()?,
            severity: Severity::from_token(&self.severity)?,
            description: self.description,
            contact: self.contact,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl RecordStore<Ticket> for SqlTicketStore {
    async fn load_all(&self) -> Vec<Ticket> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT id, severity, description, contact, created_at
             FROM tickets ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().filter_map(TicketRow::into_ticket).collect(),
            Err(error) => {
                warn!(
                    event_name = "store.sqlite.read_failed",
                    collection = "tickets",
                    error = %error,
                    "record load failed, treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn append(&self, ticket: Ticket) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tickets (id, severity, description, contact, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(ticket.id.to_string())
        .bind(ticket.severity.as_token())
        .bind(&ticket.description)
        .bind(&ticket.contact)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|error| StoreError::Backend(error.to_string()))
    }

    async fn probe(&self) -> Result<(), StoreError> {
        probe_pool(&self.pool).await
    }
}

pub struct SqlBookingStore {
    pool: DbPool,
}

impl SqlBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    slot: String,
    interest: String,
    contact: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Option<Booking> {
        Some(Booking {
            id: Uuid::parse_str(&self.id).ok()?,
            slot: self.slot,
            interest: self.interest,
            contact: self.contact,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl RecordStore<Booking> for SqlBookingStore {
    async fn load_all(&self) -> Vec<Booking> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, slot, interest, contact, created_at
             FROM bookings ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().filter_map(BookingRow::into_booking).collect(),
            Err(error) => {
                warn!(
                    event_name = "store.sqlite.read_failed",
                    collection = "bookings",
                    error = %error,
                    "record load failed, treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn append(&self, booking: Booking) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bookings (id, slot, interest, contact, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(booking.id.to_string())
        .bind(&booking.slot)
        .bind(&booking.interest)
        .bind(&booking.contact)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|error| StoreError::Backend(error.to_string()))
    }

    async fn probe(&self) -> Result<(), StoreError> {
        probe_pool(&self.pool).await
    }
}

async fn probe_pool(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(|error| StoreError::Backend(error.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use atende_core::domain::{Booking, Lead, Severity, Ticket};
    use atende_core::store::RecordStore;

    use crate::connect_with_settings;
    use crate::migrations::run_pending;

    use super::{SqlBookingStore, SqlLeadStore, SqlTicketStore};

    async fn pool() -> crate::DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn lead_round_trip() {
        let store = SqlLeadStore::new(pool().await);
        let lead = Lead {
            id: Uuid::new_v4(),
            name: "João Silva".to_string(),
            email: "joao@empresa.com".to_string(),
            company: "XPTO".to_string(),
            team_size: "12".to_string(),
            interest: "app mobile".to_string(),
            budget: Some("50000".to_string()),
            created_at: Utc::now(),
        };

        store.append(lead.clone()).await.expect("append lead");
        let stored = store.load_all().await;

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, lead.name);
        assert_eq!(stored[0].email, lead.email);
        assert_eq!(stored[0].budget, lead.budget);
    }

    #[tokio::test]
    async fn ticket_round_trip_preserves_severity_token() {
        let store = SqlTicketStore::new(pool().await);
        let ticket = Ticket {
            id: Uuid::new_v4(),
            severity: Severity::Medium,
            description: "lentidão no portal".to_string(),
            contact: "+55 11 98888-7777".to_string(),
            created_at: Utc::now(),
        };

        store.append(ticket.clone()).await.expect("append ticket");
        let stored = store.load_all().await;

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn booking_round_trip_and_missing_table_reads_empty() {
        let store = SqlBookingStore::new(pool().await);
        let booking = Booking {
            id: Uuid::new_v4(),
            slot: "10/08/2026 09:00 BRT".to_string(),
            interest: "demo".to_string(),
            contact: "a@b.com".to_string(),
            created_at: Utc::now(),
        };
        store.append(booking).await.expect("append booking");
        assert_eq!(store.load_all().await.len(), 1);

        // A pool without migrations has no tables; reads degrade to empty.
        let bare =
            connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect bare pool");
        let empty_store = SqlBookingStore::new(bare);
        assert!(empty_store.load_all().await.is_empty());
    }
}
