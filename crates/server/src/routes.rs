//! JSON API routes.
//!
//! - `POST /api/chat`    — one dialogue turn for a session
//! - `POST /api/leads`   — webhook-style lead ingestion (minimal validation)
//! - `POST /api/tickets` — webhook-style ticket ingestion
//! - `POST /api/slots`   — currently available meeting slots
//! - `POST /api/book`    — direct booking of a slot

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use atende_agent::{DialogueRouter, RouterError};
use atende_core::domain::{Booking, Lead, Severity, Ticket};
use atende_core::errors::{ApplicationError, InterfaceError};
use atende_core::flows::generate_slots;
use atende_core::store::FlowPersistence;
use atende_db::DomainStores;

#[derive(Clone)]
pub struct ApiState {
    pub dialogue: Arc<DialogueRouter>,
    pub stores: Arc<DomainStores>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub reply: String,
    pub intent: String,
    pub privacy: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct LeadWebhookRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TicketWebhookRequest {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SlotsResponse {
    pub slots: Vec<String>,
}

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ApiError>)>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/leads", post(ingest_lead))
        .route("/api/tickets", post(ingest_ticket))
        .route("/api/slots", post(list_slots))
        .route("/api/book", post(book_slot))
        .with_state(state)
}

fn bad_request(message: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message.to_string() }))
}

/// Maps an application failure onto its interface shape: status code plus
/// the user-safe message, with a fresh correlation id for the logs.
fn service_error(error: ApplicationError) -> (StatusCode, Json<ApiError>) {
    let interface = error.into_interface(Uuid::new_v4().to_string());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::BAD_GATEWAY,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiError { error: interface.user_message().to_string() }))
}

pub async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    match state.dialogue.submit(&request.session_id, &request.message).await {
        Ok(turn) => Ok((
            StatusCode::OK,
            Json(ChatResponse {
                reply: turn.reply,
                intent: turn.intent.as_str().to_string(),
                privacy: turn.privacy_notice.to_string(),
            }),
        )),
        Err(RouterError::InvalidRequest) => {
            Err(bad_request("message e sessionId são obrigatórios."))
        }
        Err(RouterError::Flow(flow_error)) => {
            error!(
                event_name = "api.chat.commit_failed",
                session_id = %request.session_id,
                error = %flow_error,
                "dialogue turn failed"
            );
            Err(service_error(flow_error.into()))
        }
    }
}

pub async fn ingest_lead(
    State(state): State<ApiState>,
    Json(request): Json<LeadWebhookRequest>,
) -> ApiResult<StatusResponse> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(bad_request("Campos mínimos não informados."));
    }

    let lead = Lead {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        company: request.company.unwrap_or_default(),
        team_size: request.team_size.unwrap_or_default(),
        interest: request.interest.unwrap_or_default(),
        budget: request.budget,
        created_at: Utc::now(),
    };

    match state.stores.append_lead(lead).await {
        Ok(()) => {
            info!(event_name = "api.leads.ingested", "lead stored via webhook");
            Ok((StatusCode::OK, Json(StatusResponse { status: "ok" })))
        }
        Err(error) => {
            error!(event_name = "api.leads.failed", error = %error, "lead ingestion failed");
            Err(service_error(error.into()))
        }
    }
}

pub async fn ingest_ticket(
    State(state): State<ApiState>,
    Json(request): Json<TicketWebhookRequest>,
) -> ApiResult<StatusResponse> {
    if request.description.trim().is_empty() || request.contact.trim().is_empty() {
        return Err(bad_request("Campos mínimos não informados."));
    }

    let severity = request
        .severity
        .as_deref()
        .and_then(|token| Severity::from_token(&token.to_lowercase()))
        .unwrap_or(Severity::Low);

    let ticket = Ticket {
        id: Uuid::new_v4(),
        severity,
        description: request.description,
        contact: request.contact,
        created_at: Utc::now(),
    };

    match state.stores.append_ticket(ticket).await {
        Ok(()) => {
            info!(event_name = "api.tickets.ingested", "ticket stored via webhook");
            Ok((StatusCode::OK, Json(StatusResponse { status: "ok" })))
        }
        Err(error) => {
            error!(event_name = "api.tickets.failed", error = %error, "ticket ingestion failed");
            Err(service_error(error.into()))
        }
    }
}

pub async fn list_slots(State(state): State<ApiState>) -> ApiResult<SlotsResponse> {
    let booked = state.stores.booked_slots().await.into_iter().collect();
    let slots = generate_slots(Utc::now(), &booked);
    Ok((StatusCode::OK, Json(SlotsResponse { slots })))
}

pub async fn book_slot(
    State(state): State<ApiState>,
    Json(request): Json<BookRequest>,
) -> ApiResult<StatusResponse> {
    if request.slot.trim().is_empty()
        || request.interest.trim().is_empty()
        || request.contact.trim().is_empty()
    {
        return Err(bad_request("slot, interest e contact são obrigatórios."));
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        slot: request.slot,
        interest: request.interest,
        contact: request.contact,
        created_at: Utc::now(),
    };

    match state.stores.append_booking(booking).await {
        Ok(()) => Ok((StatusCode::OK, Json(StatusResponse { status: "ok" }))),
        Err(error) => {
            error!(event_name = "api.book.failed", error = %error, "booking ingestion failed");
            Err(service_error(error.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;

    use atende_agent::{DialogueRouter, KeywordClassifier};
    use atende_core::faq::KnowledgeBase;
    use atende_db::DomainStores;

    use super::{
        book_slot, chat, ingest_lead, ingest_ticket, list_slots, ApiState, BookRequest,
        ChatRequest, LeadWebhookRequest, TicketWebhookRequest,
    };

    fn state() -> ApiState {
        let stores = Arc::new(DomainStores::memory());
        let dialogue = Arc::new(DialogueRouter::new(
            Arc::new(KeywordClassifier),
            stores.clone(),
            KnowledgeBase::load(None).expect("embedded knowledge base"),
        ));
        ApiState { dialogue, stores }
    }

    fn chat_request(session_id: &str, message: &str) -> ChatRequest {
        ChatRequest { session_id: session_id.to_string(), message: message.to_string() }
    }

    #[tokio::test]
    async fn chat_rejects_missing_fields_with_bad_request() {
        let state = state();

        let error = chat(State(state.clone()), Json(chat_request("", "oi")))
            .await
            .expect_err("blank session id should be rejected");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);

        let error = chat(State(state), Json(chat_request("s1", "")))
            .await
            .expect_err("blank message should be rejected");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_runs_a_lead_turn_end_to_end() {
        let state = state();

        let (status, Json(payload)) = chat(
            State(state),
            Json(chat_request("api-lead", "Quero um orçamento para app mobile")),
        )
        .await
        .expect("chat turn should succeed");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.intent, "lead");
        assert!(payload.reply.contains("nome completo"));
        assert!(!payload.privacy.is_empty());
    }

    #[tokio::test]
    async fn lead_webhook_validates_minimal_fields_and_stores() {
        let state = state();

        let error = ingest_lead(
            State(state.clone()),
            Json(LeadWebhookRequest {
                name: String::new(),
                email: "a@b.com".to_string(),
                company: None,
                team_size: None,
                interest: None,
                budget: None,
            }),
        )
        .await
        .expect_err("missing name should be rejected");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);

        let (status, _) = ingest_lead(
            State(state.clone()),
            Json(LeadWebhookRequest {
                name: "João".to_string(),
                email: "a@b.com".to_string(),
                company: Some("XPTO".to_string()),
                team_size: None,
                interest: None,
                budget: None,
            }),
        )
        .await
        .expect("valid lead should be accepted");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.stores.leads().await.len(), 1);
    }

    #[tokio::test]
    async fn ticket_webhook_validates_minimal_fields() {
        let state = state();

        let error = ingest_ticket(
            State(state.clone()),
            Json(TicketWebhookRequest {
                severity: Some("alta".to_string()),
                description: String::new(),
                contact: "a@b.com".to_string(),
            }),
        )
        .await
        .expect_err("missing description should be rejected");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);

        let (status, _) = ingest_ticket(
            State(state.clone()),
            Json(TicketWebhookRequest {
                severity: Some("alta".to_string()),
                description: "erro 500".to_string(),
                contact: "a@b.com".to_string(),
            }),
        )
        .await
        .expect("valid ticket should be accepted");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.stores.tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn slots_endpoint_returns_six_options_and_booking_excludes_them() {
        let state = state();

        let (_, Json(payload)) =
            list_slots(State(state.clone())).await.expect("slots should be generated");
        assert_eq!(payload.slots.len(), 6);
        let taken = payload.slots[0].clone();

        let (status, _) = book_slot(
            State(state.clone()),
            Json(BookRequest {
                slot: taken.clone(),
                interest: "demo".to_string(),
                contact: "a@b.com".to_string(),
            }),
        )
        .await
        .expect("booking should be accepted");
        assert_eq!(status, StatusCode::OK);

        let (_, Json(after)) =
            list_slots(State(state)).await.expect("slots should be regenerated");
        assert!(!after.slots.contains(&taken));
    }

    #[tokio::test]
    async fn router_wires_the_chat_route() {
        use tower::util::ServiceExt;

        let app = super::router(state());
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                r#"{"sessionId":"oneshot","message":"Quero agendar uma demo"}"#,
            ))
            .expect("request should build");

        let response = app.oneshot(request).await.expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_scenario_covers_support_ticket_commit() {
        let state = state();
        let session = "api-support";

        let send = |message: &str| {
            let state = state.clone();
            let request = chat_request(session, message);
            async move { chat(State(state), Json(request)).await.expect("chat turn") }
        };

        send("Estou com erro 500 na integração").await;
        send("Alta").await;
        send("Contato suporte@empresa.com").await;
        let (_, Json(confirm)) = send("Sim, pode enviar").await;

        assert!(confirm.reply.contains("Posso ajudar com algo mais?"));
        assert_eq!(state.stores.tickets().await.len(), 1);
    }
}
