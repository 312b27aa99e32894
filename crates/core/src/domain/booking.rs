use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed meeting reservation for one of the offered time slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub slot: String,
    pub interest: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}
