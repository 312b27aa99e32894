use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use atende_db::DomainStores;

#[derive(Clone)]
pub struct HealthState {
    stores: Arc<DomainStores>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub storage: HealthCheck,
    pub checked_at: String,
}

pub fn router(stores: Arc<DomainStores>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { stores })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = storage_check(&state.stores).await;
    let ready = storage.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "atende-server runtime initialized".to_string(),
        },
        storage,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn storage_check(stores: &DomainStores) -> HealthCheck {
    match stores.probe().await {
        Ok(()) => HealthCheck { status: "ready", detail: "record store reachable".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("record store failed: {error}") }
        }
    }
}
