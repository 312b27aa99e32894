use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity buckets offered to the visitor. Serialized with the pt-BR tokens
/// the dialogue itself uses, so stored tickets read the same way the
/// conversation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "baixa")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Severity {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "baixa" => Some(Self::Low),
            "media" => Some(Self::Medium),
            "alta" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Low => "baixa",
            Self::Medium => "media",
            Self::High => "alta",
        }
    }
}

/// A support ticket opened through the conversational intake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub severity: Severity,
    pub description: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}
