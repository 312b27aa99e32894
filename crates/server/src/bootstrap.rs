use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use atende_agent::{build_classifier, Classifier, DialogueRouter};
use atende_core::config::{AppConfig, ConfigError, LoadOptions};
use atende_core::faq::{KnowledgeBase, KnowledgeError};
use atende_db::{open_stores, DomainStores, StoreSetupError};

use crate::routes::{self, ApiState};
use crate::web::{self, WebState};
use crate::health;

pub struct Application {
    pub config: AppConfig,
    pub stores: Arc<DomainStores>,
    pub dialogue: Arc<DialogueRouter>,
    pub knowledge: KnowledgeBase,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stores(#[from] StoreSetupError),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("classifier initialization failed: {0}")]
    Classifier(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let stores = Arc::new(open_stores(&config.storage).await?);
    info!(
        event_name = "system.bootstrap.stores_ready",
        backend = ?config.storage.backend,
        "record stores initialized"
    );

    let knowledge = KnowledgeBase::load(config.knowledge.faq_path.as_deref())?;
    info!(
        event_name = "system.bootstrap.knowledge_loaded",
        entries = knowledge.faqs.len(),
        "knowledge base loaded"
    );

    let classifier = build_classifier(&config.nlu).map_err(BootstrapError::Classifier)?;
    info!(
        event_name = "system.bootstrap.classifier_ready",
        classifier = classifier.name(),
        "classifier initialized"
    );

    let dialogue = Arc::new(DialogueRouter::new(
        classifier,
        stores.clone(),
        knowledge.clone(),
    ));

    Ok(Application { config, stores, dialogue, knowledge })
}

impl Application {
    /// Full HTTP surface: chat API, webhook mocks, health, and the web page.
    pub fn into_router(self) -> Router {
        let api = routes::router(ApiState {
            dialogue: self.dialogue.clone(),
            stores: self.stores.clone(),
        });
        let health = health::router(self.stores.clone());
        let web = web::router(WebState::new(self.knowledge.clone()));
        api.merge(health).merge(web)
    }
}
