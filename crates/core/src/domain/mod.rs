use serde::{Deserialize, Serialize};

pub mod booking;
pub mod lead;
pub mod message;
pub mod ticket;

pub use booking::Booking;
pub use lead::Lead;
pub use message::{ChatMessage, Role};
pub use ticket::{Severity, Ticket};

/// The three slot-filling conversations the assistant can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Lead,
    Support,
    Schedule,
}

impl Domain {
    /// Priority order used when an ambiguous message has to be routed back
    /// to an unfinished conversation.
    pub const ALL: [Domain; 3] = [Domain::Lead, Domain::Support, Domain::Schedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Support => "support",
            Self::Schedule => "schedule",
        }
    }
}
