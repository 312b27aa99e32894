use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, Domain};

/// Labels the classifier can assign to an inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Faq,
    Lead,
    Support,
    Schedule,
    Handoff,
    Other,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Lead => "lead",
            Self::Support => "support",
            Self::Schedule => "schedule",
            Self::Handoff => "handoff",
            Self::Other => "other",
        }
    }

    /// The slot-filling domain behind this intent, when there is one.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Lead => Some(Domain::Lead),
            Self::Support => Some(Domain::Support),
            Self::Schedule => Some(Domain::Schedule),
            _ => None,
        }
    }
}

impl From<Domain> for Intent {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Lead => Self::Lead,
            Domain::Support => Self::Support,
            Domain::Schedule => Self::Schedule,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionHint {
    Ask,
    Answer,
    Confirm,
    Handoff,
}

/// The classifier contract: a label plus whatever fields the backend managed
/// to pull out of the message ahead of time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub action: Option<ActionHint>,
    #[serde(default)]
    pub entities: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Classification {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self { intent, confidence, action: None, entities: BTreeMap::new(), notes: None }
    }

    pub fn with_action(mut self, action: ActionHint) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(key.into(), value.into());
        self
    }
}

fn default_confidence() -> f32 {
    0.5
}

/// Everything the classifier may look at for one turn.
pub struct NluContext<'a> {
    pub session_key: &'a str,
    pub message: &'a str,
    pub history: &'a [ChatMessage],
    pub summary: &'a str,
}

#[cfg(test)]
mod tests {
    use super::{Classification, Intent};
    use crate::domain::Domain;

    #[test]
    fn intent_round_trips_through_domain() {
        for domain in Domain::ALL {
            let intent = Intent::from(domain);
            assert_eq!(intent.domain(), Some(domain));
        }
        assert_eq!(Intent::Faq.domain(), None);
    }

    #[test]
    fn classification_deserializes_with_missing_optional_fields() {
        let parsed: Classification =
            serde_json::from_str(r#"{"intent":"lead"}"#).expect("minimal payload should parse");
        assert_eq!(parsed.intent, Intent::Lead);
        assert!(parsed.entities.is_empty());
        assert!((parsed.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_intent_label_is_rejected() {
        let parsed = serde_json::from_str::<Classification>(r#"{"intent":"gossip"}"#);
        assert!(parsed.is_err());
    }
}
