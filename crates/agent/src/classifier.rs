use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use atende_core::config::{NluConfig, NluProvider};
use atende_core::intent::{Classification, NluContext};

use crate::keyword::KeywordClassifier;
use crate::remote::RemoteClassifier;

/// Classification capability. Implementations recover from their own
/// failures — a classify call always produces a usable label.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, context: &NluContext<'_>) -> Classification;

    /// Short label for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Picks the classifier once at startup: the remote backend when configured,
/// otherwise the deterministic keyword classifier.
pub fn build_classifier(config: &NluConfig) -> Result<Arc<dyn Classifier>> {
    match config.provider {
        NluProvider::Keyword => Ok(Arc::new(KeywordClassifier)),
        NluProvider::OpenAi => Ok(Arc::new(RemoteClassifier::from_config(config)?)),
    }
}
