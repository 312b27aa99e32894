use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Booking, Domain, Lead, Severity, Ticket};
use crate::flows::domains::{FieldSpec, FlowSpec};
use crate::flows::slots::generate_slots;
use crate::sanitize::sanitize_input;
use crate::store::{CommittedRecord, FlowPersistence, StoreError};

/// The accumulating state of one slot-filling conversation. A key absent
/// from `values` means "not provided yet" — an empty extraction never shows
/// up as a present-but-blank value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub values: BTreeMap<String, String>,
    pub confirmation_requested: bool,
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FlowRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// A reply produced by the flow, with an explicit marker for replies whose
/// text already embeds data-usage language, so the router knows whether to
/// append the global privacy notice without sniffing the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowReply {
    pub text: String,
    pub has_privacy_language: bool,
}

impl FlowReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), has_privacy_language: false }
    }

    pub fn with_privacy_language(text: impl Into<String>) -> Self {
        Self { text: text.into(), has_privacy_language: true }
    }
}

/// Outcome of one turn: the reply to send, the advanced record, and whether
/// the flow is finished for this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowTurn {
    pub reply: FlowReply,
    pub record: FlowRecord,
    pub done: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("record is missing required field `{0}` at commit time")]
    MissingField(&'static str),
    #[error("record field `{field}` holds an unexpected value `{value}`")]
    InvalidFieldValue { field: &'static str, value: String },
    #[error("failed to persist completed record: {0}")]
    Commit(#[from] StoreError),
}

/// Advances one slot-filling conversation by one user message.
///
/// The record accumulates monotonically: extraction only fills unset fields,
/// except during the confirmation step, where anchored extractors may revise
/// a field the user is correcting. Missing fields are ordinary control flow,
/// never errors; the only fallible step is committing the finished record.
pub async fn advance(
    spec: &FlowSpec,
    current: Option<FlowRecord>,
    message: &str,
    entities: &BTreeMap<String, String>,
    persistence: &dyn FlowPersistence,
    now: DateTime<Utc>,
) -> Result<FlowTurn, FlowError> {
    let mut record = current.unwrap_or_default();

    if spec.uses_slot_options() && record.options.is_empty() && !record.confirmed {
        let booked: HashSet<String> = persistence.booked_slots().await.into_iter().collect();
        record.options = generate_slots(now, &booked);
    }

    for field in spec.fields {
        if record.is_set(field.key) {
            continue;
        }
        if let Some(value) = entities.get(field.key) {
            let value = sanitize_input(value);
            if !value.is_empty() {
                record.set(field.key, value);
            }
        }
    }

    let mut updated = false;
    for field in spec.fields {
        if !record.is_set(field.key) {
            if let Some(value) = field.extractor.run(message, &record) {
                record.set(field.key, value);
                updated = true;
            }
        } else if record.confirmation_requested && field.extractor.is_anchored() {
            if let Some(value) = field.extractor.run(message, &record) {
                if record.get(field.key) != Some(value.as_str()) {
                    record.set(field.key, value);
                    updated = true;
                }
            }
        }
    }

    if record.confirmed {
        return Ok(FlowTurn {
            reply: FlowReply::plain(spec.already_submitted),
            record,
            done: true,
        });
    }

    let missing: Vec<&FieldSpec> =
        spec.fields.iter().filter(|field| field.required && !record.is_set(field.key)).collect();

    if missing.is_empty() && record.confirmation_requested {
        if affirms(message, spec.affirmations) {
            record.confirmed = true;
            record.confirmation_requested = false;
            let committed = build_committed(spec.domain, &record, now)?;
            persistence.commit(committed).await?;
            return Ok(FlowTurn { reply: FlowReply::plain(spec.success), record, done: true });
        }
        if !updated {
            return Ok(FlowTurn {
                reply: FlowReply::plain(spec.confirmation_reprompt),
                record,
                done: false,
            });
        }
        // The user corrected a field instead of confirming: drop the pending
        // confirmation and re-summarize below.
        record.confirmation_requested = false;
    }

    match missing.first() {
        None => {
            record.confirmation_requested = true;
            let reply = (spec.summary)(&record);
            Ok(FlowTurn { reply, record, done: false })
        }
        Some(field) => {
            let reply = (field.prompt)(&record);
            Ok(FlowTurn { reply, record, done: false })
        }
    }
}

fn affirms(message: &str, patterns: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    patterns.iter().any(|pattern| lowered.contains(pattern))
}

fn build_committed(
    domain: Domain,
    record: &FlowRecord,
    now: DateTime<Utc>,
) -> Result<CommittedRecord, FlowError> {
    let field = |key: &'static str| -> Result<String, FlowError> {
        record.get(key).map(str::to_string).ok_or(FlowError::MissingField(key))
    };

    match domain {
        Domain::Lead => Ok(CommittedRecord::Lead(Lead {
            id: Uuid::new_v4(),
            name: field("name")?,
            email: field("email")?,
            company: field("company")?,
            team_size: field("team_size")?,
            interest: field("interest")?,
            budget: record.get("budget").map(str::to_string),
            created_at: now,
        })),
        Domain::Support => {
            let token = field("severity")?;
            let severity = Severity::from_token(&token).ok_or(FlowError::InvalidFieldValue {
                field: "severity",
                value: token,
            })?;
            Ok(CommittedRecord::Ticket(Ticket {
                id: Uuid::new_v4(),
                severity,
                description: field("description")?,
                contact: field("contact")?,
                created_at: now,
            }))
        }
        Domain::Schedule => Ok(CommittedRecord::Booking(Booking {
            id: Uuid::new_v4(),
            slot: field("slot")?,
            interest: field("interest")?,
            contact: field("contact")?,
            created_at: now,
        })),
    }
}
