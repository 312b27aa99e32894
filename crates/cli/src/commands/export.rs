use atende_core::config::{AppConfig, LoadOptions};
use atende_db::open_stores;

use crate::commands::CommandResult;
use crate::ExportCollection;

pub fn run(collection: ExportCollection) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "export",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "export",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let rendered = runtime.block_on(async {
        let stores = open_stores(&config.storage)
            .await
            .map_err(|error| ("storage", error.to_string(), 4u8))?;

        let payload = match collection {
            ExportCollection::Leads => serde_json::to_string_pretty(&stores.leads().await),
            ExportCollection::Tickets => serde_json::to_string_pretty(&stores.tickets().await),
            ExportCollection::Bookings => serde_json::to_string_pretty(&stores.bookings().await),
        };
        payload.map_err(|error| ("serialization", error.to_string(), 5u8))
    });

    match rendered {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("export", error_class, message, exit_code)
        }
    }
}
