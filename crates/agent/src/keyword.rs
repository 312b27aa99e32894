//! Deterministic keyword classifier: pt-BR keyword buckets checked in a
//! fixed order. Used standalone when no remote backend is configured, and as
//! the unconditional fallback when the remote call fails in any way.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use atende_core::intent::{ActionHint, Classification, Intent, NluContext};

#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("keyword pattern"))
}

fn faq_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"servi[çc]o|oferecem|produtos")
}

fn lead_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"or[çc]amento|proposta|pre[çc]o|cota[çc][ãa]o")
}

fn support_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"erro|bug|falha|problema|parou")
}

fn schedule_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"agend|marcar|reuni[ãa]o|demo")
}

fn handoff_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"humano|atendente|pessoa")
}

impl KeywordClassifier {
    /// Pure classification of one message, usable without an async context.
    pub fn classify_text(message: &str) -> Classification {
        let text = message.to_lowercase();

        if faq_pattern().is_match(&text) {
            return Classification::new(Intent::Faq, 0.7).with_action(ActionHint::Answer);
        }
        if lead_pattern().is_match(&text) {
            return Classification::new(Intent::Lead, 0.75)
                .with_action(ActionHint::Ask)
                .with_entity("interest", message);
        }
        if support_pattern().is_match(&text) {
            return Classification::new(Intent::Support, 0.7)
                .with_action(ActionHint::Ask)
                .with_entity("description", message);
        }
        if schedule_pattern().is_match(&text) {
            return Classification::new(Intent::Schedule, 0.72)
                .with_action(ActionHint::Ask)
                .with_entity("interest", message);
        }
        if handoff_pattern().is_match(&text) {
            return Classification::new(Intent::Handoff, 0.8).with_action(ActionHint::Handoff);
        }

        Classification::new(Intent::Other, 0.4).with_action(ActionHint::Ask)
    }
}

#[async_trait]
impl crate::classifier::Classifier for KeywordClassifier {
    async fn classify(&self, context: &NluContext<'_>) -> Classification {
        Self::classify_text(context.message)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
