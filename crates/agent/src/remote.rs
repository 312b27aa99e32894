//! Remote classifier over an OpenAI-compatible chat-completions endpoint.
//! The model is asked for a strict JSON verdict; anything that goes wrong —
//! transport, status, timeout, malformed payload — degrades to the keyword
//! classifier without surfacing an error.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use atende_core::config::NluConfig;
use atende_core::domain::Role;
use atende_core::intent::{Classification, NluContext};

use crate::keyword::KeywordClassifier;

const SYSTEM_PROMPT: &str = "Você é o assistente virtual de atendimento da empresa. Sempre em pt-BR. \
Seja objetivo, cordial e útil. Se a pergunta for fora do escopo ou sensível, diga que não pode ajudar \
e ofereça contato humano. Extraia e confirme dados quando for lead, suporte ou agendamento. Nunca \
invente fatos. Responda apenas com JSON no formato {\"intent\": \"faq|lead|support|schedule|handoff|other\", \
\"confidence\": 0-1, \"action\": \"ask|answer|confirm|handoff\", \"entities\": {...}, \"notes\": \"\"}.";

/// How many history messages ride along with each classification request.
const HISTORY_WINDOW: usize = 6;

const FEW_SHOTS: [(&str, &str); 5] = [
    (
        "Quero entender os serviços de vocês.",
        r#"{"intent":"faq","confidence":0.8,"action":"answer","entities":{},"notes":"pediu lista de serviços"}"#,
    ),
    (
        "Preciso de um orçamento para um app mobile personalizado.",
        r#"{"intent":"lead","confidence":0.9,"action":"ask","entities":{"interest":"app mobile"},"notes":"iniciar coleta de lead"}"#,
    ),
    (
        "Estou enfrentando erro 500 na integração com ERP.",
        r#"{"intent":"support","confidence":0.85,"action":"ask","entities":{"description":"erro 500 na integração com ERP"},"notes":"coletar severidade e contato"}"#,
    ),
    (
        "Quero agendar uma demonstração na próxima semana.",
        r#"{"intent":"schedule","confidence":0.8,"action":"ask","entities":{"interest":"demonstração"},"notes":"oferecer horários"}"#,
    ),
    (
        "Me conte uma fofoca qualquer.",
        r#"{"intent":"other","confidence":0.9,"action":"handoff","entities":{},"notes":"fora do escopo"}"#,
    ),
];

pub struct RemoteClassifier {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_retries: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl RemoteClassifier {
    pub fn from_config(config: &NluConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("remote classifier requires nlu.api_key"))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building http client for the remote classifier")?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    fn request_body(&self, context: &NluContext<'_>) -> Value {
        let mut messages = Vec::new();
        messages.push(json!({"role": "system", "content": SYSTEM_PROMPT}));
        for (user, assistant) in FEW_SHOTS {
            messages.push(json!({"role": "user", "content": user}));
            messages.push(json!({"role": "assistant", "content": assistant}));
        }

        if !context.summary.is_empty() {
            messages.push(json!({
                "role": "user",
                "content": format!("Resumo até aqui: {}", context.summary),
            }));
        }

        let window_start = context.history.len().saturating_sub(HISTORY_WINDOW);
        for message in &context.history[window_start..] {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({"role": role, "content": message.content}));
        }

        messages.push(json!({"role": "user", "content": context.message}));

        json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": messages,
        })
    }

    async fn try_classify(&self, context: &NluContext<'_>) -> Result<Classification> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(context))
            .send()
            .await
            .context("sending classification request")?
            .error_for_status()
            .context("classification backend returned an error status")?;

        let payload: ChatCompletionResponse =
            response.json().await.context("decoding classification response")?;
        let content = payload
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| anyhow!("classification response had no content"))?;

        parse_verdict(content)
    }
}

/// The model sometimes wraps its JSON in prose or code fences; take the
/// outermost braces before parsing.
fn parse_verdict(content: &str) -> Result<Classification> {
    let trimmed = content.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(candidate).context("classification verdict was not valid JSON")
}

#[async_trait]
impl crate::classifier::Classifier for RemoteClassifier {
    async fn classify(&self, context: &NluContext<'_>) -> Classification {
        for attempt in 0..=self.max_retries {
            match self.try_classify(context).await {
                Ok(classification) => return classification,
                Err(error) => {
                    warn!(
                        event_name = "nlu.remote.attempt_failed",
                        session_key = %context.session_key,
                        attempt = attempt + 1,
                        error = %error,
                        "remote classification failed"
                    );
                }
            }
        }

        warn!(
            event_name = "nlu.remote.fallback",
            session_key = %context.session_key,
            "falling back to the keyword classifier"
        );
        KeywordClassifier::classify_text(context.message)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
