//! The visitor-facing chat page: a tera-rendered index at `/` plus static
//! assets under `/web`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use tera::{Context, Tera};
use tower_http::services::ServeDir;
use tracing::warn;

use atende_core::faq::KnowledgeBase;

#[derive(Clone)]
pub struct WebState {
    templates: Arc<Tera>,
    knowledge: KnowledgeBase,
}

impl WebState {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self { templates: init_templates(), knowledge }
    }
}

/// Filesystem templates when present, with the embedded copy as fallback so
/// the binary is self-contained.
fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/web/**/*") {
        Ok(templates) => templates,
        Err(error) => {
            warn!(
                event_name = "web.templates.filesystem_missing",
                error = %error,
                "no filesystem templates, using the embedded page"
            );
            Tera::default()
        }
    };

    if !tera.get_template_names().any(|name| name == "index.html") {
        if let Err(error) =
            tera.add_raw_template("index.html", include_str!("../../../templates/web/index.html"))
        {
            warn!(
                event_name = "web.templates.embed_failed",
                error = %error,
                "embedded chat page failed to register"
            );
        }
    }

    Arc::new(tera)
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest_service("/web", ServeDir::new("web"))
        .with_state(state)
}

pub async fn index(State(state): State<WebState>) -> Result<Html<String>, StatusCode> {
    let mut context = Context::new();
    context.insert("company_name", &state.knowledge.company.name);
    context.insert("services", &state.knowledge.services);

    state
        .templates
        .render("index.html", &context)
        .map(Html)
        .map_err(|error| {
            warn!(
                event_name = "web.templates.render_failed",
                error = %error,
                "chat page render failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use axum::extract::State;

    use atende_core::faq::KnowledgeBase;

    use super::{index, WebState};

    #[tokio::test]
    async fn index_renders_the_embedded_chat_page() {
        let state = WebState::new(KnowledgeBase::load(None).expect("embedded knowledge base"));

        let page = index(State(state)).await.expect("page should render");
        assert!(page.0.contains("chat"));
        assert!(page.0.contains("Tech Solutions"));
    }
}
