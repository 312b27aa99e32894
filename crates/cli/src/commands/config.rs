use atende_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let api_key = match &config.nlu.api_key {
        Some(_) => "***redacted***",
        None => "(unset)",
    };
    let faq_path = config
        .knowledge
        .faq_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(embedded)".to_string());

    let lines = vec![
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        format!("  server.bind_address      = {}", config.server.bind_address),
        format!("  server.port              = {}", config.server.port),
        format!("  nlu.provider             = {:?}", config.nlu.provider),
        format!("  nlu.api_key              = {api_key}"),
        format!("  nlu.base_url             = {}", config.nlu.base_url),
        format!("  nlu.model                = {}", config.nlu.model),
        format!("  nlu.timeout_secs         = {}", config.nlu.timeout_secs),
        format!("  nlu.max_retries          = {}", config.nlu.max_retries),
        format!("  storage.backend          = {:?}", config.storage.backend),
        format!("  storage.data_dir         = {}", config.storage.data_dir),
        format!("  storage.database_url     = {}", config.storage.database_url),
        format!("  storage.max_connections  = {}", config.storage.max_connections),
        format!("  storage.timeout_secs     = {}", config.storage.timeout_secs),
        format!("  knowledge.faq_path       = {faq_path}"),
        format!("  logging.level            = {}", config.logging.level),
        format!("  logging.format           = {:?}", config.logging.format),
    ];

    lines.join("\n")
}
