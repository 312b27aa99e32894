//! Top-level turn orchestrator: resolves the intent for each inbound
//! message, delegates to the matching slot-filling flow, the FAQ lookup, or
//! the hand-off reply, and keeps per-session state consistent.
//!
//! A whole turn runs under the session's lock — classification, flow
//! advance, and persistence included — so a second message for the same
//! session waits instead of racing the record. Distinct sessions proceed
//! concurrently.

use std::sync::Arc;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;

use atende_core::domain::ChatMessage;
use atende_core::faq::{KnowledgeBase, FAQ_FALLBACK};
use atende_core::flows::{advance, flow_for, FlowError};
use atende_core::intent::{Intent, NluContext};
use atende_core::sanitize::sanitize_input;
use atende_core::session::SessionStore;
use atende_core::store::FlowPersistence;

use crate::classifier::Classifier;

pub const PRIVACY_NOTICE: &str =
    "Usamos os dados compartilhados apenas para contato e atendimento, conforme solicitado.";

pub const CLOSING_CTA: &str = "Posso ajudar com algo mais?";

const HANDOFF_MESSAGE: &str = "Entendi, vou acionar um atendente humano para continuar a conversa. \
Nosso time retorna pelo canal que você preferir.";

const RETRY_MESSAGE: &str =
    "Não tenho certeza se entendi. Poderia reformular ou detalhar um pouco mais?";

/// Consecutive unclassifiable turns tolerated before handing off.
const MAX_FALLBACK_ATTEMPTS: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReply {
    pub reply: String,
    pub intent: Intent,
    pub privacy_notice: &'static str,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("session key and message must be non-empty")]
    InvalidRequest,
    #[error(transparent)]
    Flow(#[from] FlowError),
}

pub struct DialogueRouter {
    classifier: Arc<dyn Classifier>,
    persistence: Arc<dyn FlowPersistence>,
    knowledge: KnowledgeBase,
    sessions: SessionStore,
}

impl DialogueRouter {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        persistence: Arc<dyn FlowPersistence>,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self { classifier, persistence, knowledge, sessions: SessionStore::new() }
    }

    /// Handles one inbound message and produces the assistant reply plus
    /// routing metadata. Rejects blank input before touching any session.
    pub async fn submit(&self, session_key: &str, message: &str) -> Result<TurnReply, RouterError> {
        if session_key.trim().is_empty() || message.trim().is_empty() {
            return Err(RouterError::InvalidRequest);
        }

        let sanitized = sanitize_input(message);
        let mut session = self.sessions.acquire(session_key).await;
        session.append_message(ChatMessage::user(sanitized.clone(), Utc::now()));

        let classification = self
            .classifier
            .classify(&NluContext {
                session_key,
                message: &sanitized,
                history: &session.messages,
                summary: &session.summary,
            })
            .await;

        let mut intent = classification.intent;
        if intent == Intent::Other {
            if let Some(overridden) = keyword_override(&sanitized) {
                intent = overridden;
            }
        }
        if intent == Intent::Other {
            if let Some(domain) = session.unfinished_domain() {
                intent = domain.into();
            }
        }

        let reply = match intent {
            Intent::Faq => {
                session.fallback_attempts = 0;
                self.knowledge
                    .find_answer(&sanitized)
                    .unwrap_or_else(|| FAQ_FALLBACK.to_string())
            }
            Intent::Lead | Intent::Support | Intent::Schedule => {
                let domain = match intent.domain() {
                    Some(domain) => domain,
                    None => unreachable!("flow intents always map to a domain"),
                };
                let turn = advance(
                    flow_for(domain),
                    session.record(domain).cloned(),
                    &sanitized,
                    &classification.entities,
                    self.persistence.as_ref(),
                    Utc::now(),
                )
                .await?;

                if turn.done {
                    session.clear_record(domain);
                } else {
                    session.set_record(domain, turn.record);
                }
                session.fallback_attempts = 0;

                if turn.reply.has_privacy_language {
                    turn.reply.text
                } else {
                    format!("{}\n{PRIVACY_NOTICE}", turn.reply.text)
                }
            }
            Intent::Handoff => {
                session.fallback_attempts = 0;
                HANDOFF_MESSAGE.to_string()
            }
            Intent::Other => {
                session.fallback_attempts += 1;
                if session.fallback_attempts >= MAX_FALLBACK_ATTEMPTS {
                    session.fallback_attempts = 0;
                    format!("{HANDOFF_MESSAGE}\nSe preferir posso registrar seu contato.")
                } else {
                    RETRY_MESSAGE.to_string()
                }
            }
        };

        let reply = close_reply(reply);
        session.append_message(ChatMessage::assistant(reply.clone(), Utc::now()));

        tracing::info!(
            event_name = "dialogue.turn_completed",
            session_key = %session_key,
            intent = intent.as_str(),
            classifier = self.classifier.name(),
            "dialogue turn completed"
        );

        Ok(TurnReply { reply, intent, privacy_notice: PRIVACY_NOTICE })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Appends the closing call-to-action unless the reply already ends with it.
fn close_reply(reply: String) -> String {
    if reply.ends_with(CLOSING_CTA) {
        reply
    } else {
        format!("{reply}\n{CLOSING_CTA}")
    }
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("override pattern"))
}

fn lead_override_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"or[çc]amento|proposta|pre[çc]o")
}

fn support_override_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"erro|bug|falha|problema|incidente")
}

fn schedule_override_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"agend|reuni[ãa]o|demo|calend[áa]rio")
}

fn faq_override_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"servi[çc]o|produto|faq|pergunta")
}

/// Second chance when the classifier lands on the catch-all label: a strong
/// domain keyword in the raw text forces the matching intent.
fn keyword_override(message: &str) -> Option<Intent> {
    let lowered = message.to_lowercase();
    if lead_override_pattern().is_match(&lowered) {
        return Some(Intent::Lead);
    }
    if support_override_pattern().is_match(&lowered) {
        return Some(Intent::Support);
    }
    if schedule_override_pattern().is_match(&lowered) {
        return Some(Intent::Schedule);
    }
    if faq_override_pattern().is_match(&lowered) {
        return Some(Intent::Faq);
    }
    None
}
