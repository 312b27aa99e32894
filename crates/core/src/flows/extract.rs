//! Per-field extractors: pure pattern matching over one sanitized message.
//! A miss is never an error, it just means the field was not provided yet.

use std::sync::OnceLock;

use regex::Regex;

use crate::flows::engine::FlowRecord;

/// How a field pulls its candidate value out of a raw message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extractor {
    Email,
    Contact,
    TeamSize,
    Budget,
    PersonName,
    CompanyName,
    Severity,
    SlotChoice,
    FreeText,
}

impl Extractor {
    pub fn run(&self, text: &str, record: &FlowRecord) -> Option<String> {
        match self {
            Self::Email => extract_email(text),
            Self::Contact => extract_contact(text),
            Self::TeamSize => extract_team_size(text),
            Self::Budget => extract_budget(text),
            Self::PersonName => extract_person_name(text),
            Self::CompanyName => extract_company_name(text),
            Self::Severity => extract_severity(text),
            Self::SlotChoice => extract_slot_choice(text, &record.options),
            Self::FreeText => extract_free_text(text),
        }
    }

    /// Anchored extractors match a distinctive shape and are allowed to
    /// revise an already-filled field while the flow waits for confirmation.
    /// Catch-all extractors would capture the confirmation message itself.
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::Email | Self::Contact | Self::Severity | Self::SlotChoice)
    }
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("field pattern"))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"[\w.\-]+@([\w\-]+\.)+[\w\-]{2,}")
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\+?\d[\d\s\-]{7,}")
}

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\d+[\d.,]*")
}

fn digits_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\d+")
}

fn name_intro_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)^.*nome\s*(?:é|e)\s+")
}

fn company_intro_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)^.*empresa\s*")
}

fn severity_high_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"alta|cr[ií]tico|parado|urgente")
}

fn severity_medium_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"m[eé]dia|intermedi[aá]ria")
}

fn severity_low_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"baixa|leve|informativo")
}

fn ordinal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\b([1-6])\b")
}

fn extract_email(text: &str) -> Option<String> {
    email_pattern().find(text).map(|found| found.as_str().to_string())
}

/// Either an e-mail address or a phone-like digit run (at least 8 characters
/// of digits, spaces, and dashes).
fn extract_contact(text: &str) -> Option<String> {
    extract_email(text)
        .or_else(|| phone_pattern().find(text).map(|found| found.as_str().trim().to_string()))
}

/// A literal digit sequence wins over qualitative buckets; with neither
/// present the field stays unset.
fn extract_team_size(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if let Some(found) = digits_pattern().find(&lowered) {
        return Some(found.as_str().to_string());
    }
    if lowered.contains("pequena") || lowered.contains("startup") {
        return Some("Pequena".to_string());
    }
    if lowered.contains("média") || lowered.contains("media") {
        return Some("Média".to_string());
    }
    if lowered.contains("grande") || lowered.contains("enterprise") || lowered.contains("corp") {
        return Some("Grande".to_string());
    }
    None
}

const BUDGET_CONTEXT: [&str; 6] =
    ["orçamento", "orcamento", "verba", "investimento", "estimado", "reais"];

/// A number only counts as a budget inside a monetary context; a bare figure
/// is more likely a team size or a slot ordinal.
fn extract_budget(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let monetary =
        BUDGET_CONTEXT.iter().any(|word| lowered.contains(word)) || lowered.contains("r$");
    if !monetary {
        return None;
    }
    number_pattern().find(text).map(|found| found.as_str().to_string())
}

fn extract_person_name(text: &str) -> Option<String> {
    if text.to_lowercase().contains("nome") {
        let stripped = name_intro_pattern().replace(text, "");
        let stripped = stripped.trim();
        if !stripped.is_empty() && stripped != text {
            return Some(stripped.to_string());
        }
        return None;
    }
    looks_like_person_name(text).then(|| text.trim().to_string())
}

/// Two to five words, each starting uppercase, no digits and no address-like
/// tokens: good enough for a bare "João Silva" answer to the name prompt.
fn looks_like_person_name(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.contains('@') || trimmed.chars().any(|character| character.is_ascii_digit()) {
        return false;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 || words.len() > 5 {
        return false;
    }
    words
        .iter()
        .all(|word| word.chars().next().map(char::is_uppercase).unwrap_or(false))
}

fn extract_company_name(text: &str) -> Option<String> {
    if !text.to_lowercase().contains("empresa") {
        return None;
    }
    let stripped = company_intro_pattern().replace(text, "");
    let stripped = stripped.trim();
    (!stripped.is_empty()).then(|| stripped.to_string())
}

fn extract_severity(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if severity_high_pattern().is_match(&lowered) {
        return Some("alta".to_string());
    }
    if severity_medium_pattern().is_match(&lowered) {
        return Some("media".to_string());
    }
    if severity_low_pattern().is_match(&lowered) {
        return Some("baixa".to_string());
    }
    None
}

/// A 1-based ordinal or a date/time fragment of exactly one offered option.
/// Ambiguous references stay unset so the flow re-prompts with the list.
fn extract_slot_choice(text: &str, options: &[String]) -> Option<String> {
    if let Some(captures) = ordinal_pattern().captures(text) {
        let index = captures.get(1)?.as_str().parse::<usize>().ok()?;
        return options.get(index - 1).cloned();
    }

    let normalized = text.to_lowercase();
    let matches: Vec<&String> = options
        .iter()
        .filter(|slot| {
            let date_part = slot.get(0..10).unwrap_or_default();
            let time_part = slot.get(11..16).unwrap_or_default();
            (!date_part.is_empty() && normalized.contains(date_part))
                || (!time_part.is_empty() && normalized.contains(time_part))
        })
        .collect();

    match matches.as_slice() {
        [only] => Some((*only).clone()),
        _ => None,
    }
}

fn extract_free_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(extractor: Extractor, text: &str) -> Option<String> {
        extractor.run(text, &FlowRecord::default())
    }

    #[test]
    fn email_is_extracted_from_surrounding_text() {
        assert_eq!(
            run(Extractor::Email, "pode falar comigo em joao@empresa.com.br, obrigado"),
            Some("joao@empresa.com.br".to_string())
        );
        assert_eq!(run(Extractor::Email, "não tenho e-mail corporativo"), None);
    }

    #[test]
    fn contact_accepts_email_or_long_digit_run() {
        assert_eq!(
            run(Extractor::Contact, "Contato suporte@empresa.com"),
            Some("suporte@empresa.com".to_string())
        );
        assert_eq!(
            run(Extractor::Contact, "me liga no +55 11 98888-7777"),
            Some("+55 11 98888-7777".to_string())
        );
        assert_eq!(run(Extractor::Contact, "liga no ramal 42"), None);
    }

    #[test]
    fn team_size_prefers_digits_over_buckets() {
        assert_eq!(run(Extractor::TeamSize, "Equipe de 12 pessoas"), Some("12".to_string()));
        assert_eq!(run(Extractor::TeamSize, "somos uma startup pequena"), Some("Pequena".to_string()));
        assert_eq!(run(Extractor::TeamSize, "uma equipe média"), Some("Média".to_string()));
        assert_eq!(run(Extractor::TeamSize, "não sei dizer"), None);
    }

    #[test]
    fn budget_requires_monetary_context() {
        assert_eq!(
            run(Extractor::Budget, "Orçamento estimado 50000"),
            Some("50000".to_string())
        );
        assert_eq!(run(Extractor::Budget, "verba de 30.000 reais"), Some("30.000".to_string()));
        assert_eq!(run(Extractor::Budget, "Equipe de 12 pessoas"), None);
    }

    #[test]
    fn person_name_strips_introduction_or_accepts_bare_name() {
        assert_eq!(
            run(Extractor::PersonName, "Meu nome é João Silva"),
            Some("João Silva".to_string())
        );
        assert_eq!(run(Extractor::PersonName, "João Silva"), Some("João Silva".to_string()));
        assert_eq!(run(Extractor::PersonName, "quero um orçamento"), None);
        assert_eq!(run(Extractor::PersonName, "meu nome tanto faz"), None);
    }

    #[test]
    fn company_name_strips_introduction() {
        assert_eq!(run(Extractor::CompanyName, "Empresa XPTO"), Some("XPTO".to_string()));
        assert_eq!(
            run(Extractor::CompanyName, "trabalho na empresa Acme Ltda"),
            Some("Acme Ltda".to_string())
        );
        assert_eq!(run(Extractor::CompanyName, "XPTO"), None);
    }

    #[test]
    fn severity_maps_keywords_into_buckets() {
        assert_eq!(run(Extractor::Severity, "Alta"), Some("alta".to_string()));
        assert_eq!(run(Extractor::Severity, "o sistema está parado"), Some("alta".to_string()));
        assert_eq!(run(Extractor::Severity, "urgência intermediária"), Some("media".to_string()));
        assert_eq!(run(Extractor::Severity, "algo leve, informativo"), Some("baixa".to_string()));
        assert_eq!(run(Extractor::Severity, "erro 500 na integração"), None);
    }

    #[test]
    fn slot_choice_accepts_ordinal_and_unique_fragment() {
        let mut record = FlowRecord::default();
        record.options = vec![
            "10/08/2026 09:00 BRT".to_string(),
            "10/08/2026 11:00 BRT".to_string(),
            "11/08/2026 09:00 BRT".to_string(),
        ];

        assert_eq!(
            Extractor::SlotChoice.run("pode ser a 2", &record),
            Some("10/08/2026 11:00 BRT".to_string())
        );
        assert_eq!(
            Extractor::SlotChoice.run("prefiro 11:00", &record),
            Some("10/08/2026 11:00 BRT".to_string())
        );
        // "10/08/2026" matches two options and "09:00" matches two as well.
        assert_eq!(Extractor::SlotChoice.run("pode ser dia 10/08/2026", &record), None);
        assert_eq!(Extractor::SlotChoice.run("às 09:00", &record), None);
        assert_eq!(Extractor::SlotChoice.run("o 9", &record), None);
    }

    #[test]
    fn ordinal_out_of_range_is_ignored() {
        let mut record = FlowRecord::default();
        record.options = vec!["10/08/2026 09:00 BRT".to_string()];
        assert_eq!(Extractor::SlotChoice.run("opção 3", &record), None);
    }
}
