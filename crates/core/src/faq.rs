//! Static knowledge base backing the FAQ intent: company facts, the service
//! catalog, and canned question/answer pairs, loaded from `data/faq.json`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::sanitize::sanitize_input;

/// Reply used when no entry matches the question.
pub const FAQ_FALLBACK: &str =
    "Ainda não tenho essa informação aqui. Posso encaminhar para alguém da nossa equipe ajudar melhor?";

const EMBEDDED_FAQ: &str = include_str!("../../../data/faq.json");

#[derive(Clone, Debug, Deserialize)]
pub struct KnowledgeBase {
    pub company: CompanyInfo,
    pub services: Vec<String>,
    pub faqs: Vec<FaqEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub mission: String,
    pub contacts: ContactInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub hours: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("could not read knowledge base file `{path}`: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("could not parse knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
}

fn services_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"servi[çc]os?").expect("services pattern"))
}

fn contact_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"contat|telefone|email|e-mail").expect("contact pattern"))
}

fn mission_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"miss[aã]o|sobre").expect("mission pattern"))
}

impl KnowledgeBase {
    pub fn from_json(raw: &str) -> Result<Self, KnowledgeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads from an explicit file when configured, otherwise from the copy
    /// embedded at build time.
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    KnowledgeError::ReadFile { path: path.display().to_string(), source }
                })?;
                Self::from_json(&raw)
            }
            None => Self::from_json(EMBEDDED_FAQ),
        }
    }

    /// Best-effort lookup: direct question match first, then the broader
    /// services / contact / mission buckets. `None` means the caller should
    /// answer with [`FAQ_FALLBACK`].
    pub fn find_answer(&self, question: &str) -> Option<String> {
        let normalized = sanitize_input(question).to_lowercase();

        let direct = self.faqs.iter().find(|entry| {
            let key = entry.question.to_lowercase();
            let key = key.split('?').next().unwrap_or_default();
            !key.is_empty() && normalized.contains(key)
        });
        if let Some(entry) = direct {
            return Some(entry.answer.clone());
        }

        if services_pattern().is_match(&normalized) {
            return Some(format!("Atualmente oferecemos: {}.", self.services.join(", ")));
        }

        if contact_pattern().is_match(&normalized) {
            let contacts = &self.company.contacts;
            return Some(format!(
                "Você pode falar conosco pelo e-mail {} ou pelo telefone {} ({}).",
                contacts.email, contacts.phone, contacts.hours
            ));
        }

        if mission_pattern().is_match(&normalized) {
            return Some(format!("Nossa missão: {}", self.company.mission));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::KnowledgeBase;

    fn knowledge() -> KnowledgeBase {
        KnowledgeBase::load(None).expect("embedded knowledge base should parse")
    }

    #[test]
    fn direct_question_match_wins() {
        let answer = knowledge()
            .find_answer("Quais serviços vocês oferecem?")
            .expect("should find an answer");
        assert!(answer.contains("Oferecemos"));
    }

    #[test]
    fn services_bucket_answers_generic_service_questions() {
        let answer = knowledge().find_answer("me fala dos serviços").expect("services answer");
        assert!(answer.starts_with("Atualmente oferecemos:"));
    }

    #[test]
    fn contact_bucket_returns_the_contact_card() {
        let answer = knowledge().find_answer("qual o telefone de vocês?").expect("contact answer");
        assert!(answer.contains("telefone"));
    }

    #[test]
    fn mission_bucket_and_fallback() {
        let knowledge = knowledge();
        assert!(knowledge.find_answer("qual a missão da empresa?").is_some());
        assert!(knowledge.find_answer("me conte uma fofoca").is_none());
    }
}
