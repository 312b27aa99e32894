//! Per-session conversational state: rolling history, compacted summary, and
//! the in-flight record of each active flow. Sessions are created lazily and
//! live for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{ChatMessage, Domain, Role};
use crate::flows::FlowRecord;

/// History kept verbatim; older turns are folded into the summary.
pub const MAX_MESSAGES_BEFORE_SUMMARY: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub messages: Vec<ChatMessage>,
    pub summary: String,
    pub fallback_attempts: u32,
    records: HashMap<Domain, FlowRecord>,
}

impl Session {
    /// Appends one message and applies the trimming policy: beyond
    /// [`MAX_MESSAGES_BEFORE_SUMMARY`] messages the summary is replaced —
    /// previous summary plus the latest user and assistant messages — and
    /// only the most recent messages stay verbatim.
    pub fn append_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.trim_messages();
    }

    fn trim_messages(&mut self) {
        if self.messages.len() <= MAX_MESSAGES_BEFORE_SUMMARY {
            return;
        }

        let latest_user = self.messages.iter().rev().find(|message| message.role == Role::User);
        let latest_assistant =
            self.messages.iter().rev().find(|message| message.role == Role::Assistant);

        let mut parts = Vec::new();
        if !self.summary.is_empty() {
            parts.push(self.summary.clone());
        }
        if let Some(message) = latest_user {
            parts.push(format!("Última mensagem do usuário: {}", message.content));
        }
        if let Some(message) = latest_assistant {
            parts.push(format!("Última resposta do assistente: {}", message.content));
        }
        self.summary = parts.join(" | ");

        let excess = self.messages.len() - MAX_MESSAGES_BEFORE_SUMMARY;
        self.messages.drain(..excess);
    }

    pub fn record(&self, domain: Domain) -> Option<&FlowRecord> {
        self.records.get(&domain)
    }

    pub fn set_record(&mut self, domain: Domain, record: FlowRecord) {
        self.records.insert(domain, record);
    }

    /// Detaches a finished record so a fresh flow can start cleanly, and
    /// resets the fallback counter.
    pub fn clear_record(&mut self, domain: Domain) {
        self.records.remove(&domain);
        self.fallback_attempts = 0;
    }

    /// The first domain, in priority order, holding an unfinished record.
    pub fn unfinished_domain(&self) -> Option<Domain> {
        Domain::ALL
            .into_iter()
            .find(|domain| self.records.get(domain).is_some_and(|record| !record.confirmed))
    }
}

/// Shared, keyed session state. Each session sits behind its own lock so a
/// whole turn — classification, flow advance, persistence — runs mutually
/// exclusive per key while distinct keys proceed concurrently.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily creates the session for `key` and returns its turn lock.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<Session> {
        let existing = {
            let sessions = self.sessions.read().await;
            sessions.get(key).cloned()
        };

        let entry = match existing {
            Some(entry) => entry,
            None => {
                let mut sessions = self.sessions.write().await;
                sessions
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
                    .clone()
            }
        };

        entry.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Session, SessionStore, MAX_MESSAGES_BEFORE_SUMMARY};
    use crate::domain::{ChatMessage, Domain};
    use crate::flows::FlowRecord;

    #[test]
    fn trims_to_ten_messages_and_folds_the_rest_into_the_summary() {
        let mut session = Session::default();
        for index in 0..5 {
            session.append_message(ChatMessage::user(format!("pergunta {index}"), Utc::now()));
            session.append_message(ChatMessage::assistant(format!("resposta {index}"), Utc::now()));
        }
        assert_eq!(session.messages.len(), MAX_MESSAGES_BEFORE_SUMMARY);
        assert!(session.summary.is_empty());

        session.append_message(ChatMessage::user("pergunta 5", Utc::now()));

        assert_eq!(session.messages.len(), MAX_MESSAGES_BEFORE_SUMMARY);
        assert!(session.summary.contains("Última mensagem do usuário: pergunta 5"));
        assert!(session.summary.contains("Última resposta do assistente: resposta 4"));
        assert_eq!(session.messages[0].content, "resposta 0");
    }

    #[test]
    fn repeated_trimming_replaces_the_summary_instead_of_appending_forever() {
        let mut session = Session::default();
        for index in 0..30 {
            session.append_message(ChatMessage::user(format!("m{index}"), Utc::now()));
        }
        assert_eq!(session.messages.len(), MAX_MESSAGES_BEFORE_SUMMARY);
        // Carries the previous summary forward exactly once per trim.
        assert!(session.summary.contains("m29"));
    }

    #[test]
    fn unfinished_domain_follows_priority_order() {
        let mut session = Session::default();
        assert_eq!(session.unfinished_domain(), None);

        session.set_record(Domain::Schedule, FlowRecord::default());
        assert_eq!(session.unfinished_domain(), Some(Domain::Schedule));

        session.set_record(Domain::Support, FlowRecord::default());
        assert_eq!(session.unfinished_domain(), Some(Domain::Support));

        session.set_record(Domain::Lead, FlowRecord::default());
        assert_eq!(session.unfinished_domain(), Some(Domain::Lead));

        let mut confirmed = FlowRecord::default();
        confirmed.confirmed = true;
        session.set_record(Domain::Lead, confirmed);
        assert_eq!(session.unfinished_domain(), Some(Domain::Support));
    }

    #[test]
    fn clearing_a_record_resets_the_fallback_counter() {
        let mut session = Session::default();
        session.fallback_attempts = 1;
        session.set_record(Domain::Lead, FlowRecord::default());

        session.clear_record(Domain::Lead);

        assert!(session.record(Domain::Lead).is_none());
        assert_eq!(session.fallback_attempts, 0);
    }

    #[tokio::test]
    async fn acquire_creates_sessions_lazily_and_isolates_keys() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        {
            let mut first = store.acquire("a").await;
            first.append_message(ChatMessage::user("oi", Utc::now()));
        }
        {
            let second = store.acquire("b").await;
            assert!(second.messages.is_empty());
        }

        assert_eq!(store.len().await, 2);
        let first_again = store.acquire("a").await;
        assert_eq!(first_again.messages.len(), 1);
    }

    #[tokio::test]
    async fn same_key_turns_serialize() {
        let store = SessionStore::new();
        let guard = store.acquire("a").await;

        let store_clone = store.clone();
        let waiter = tokio::spawn(async move {
            let mut session = store_clone.acquire("a").await;
            session.fallback_attempts += 1;
        });

        // The spawned turn cannot proceed until the guard drops.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.expect("waiter should finish");
        let session = store.acquire("a").await;
        assert_eq!(session.fallback_attempts, 1);
    }
}
