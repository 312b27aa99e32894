use chrono::Utc;
use serde::Serialize;

use atende_core::config::{AppConfig, LoadOptions};
use atende_core::flows::generate_slots;
use atende_core::store::FlowPersistence;
use atende_db::open_stores;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct SlotsOutput {
    slots: Vec<String>,
    booked: usize,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "slots",
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
                "slots",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let stores = open_stores(&config.storage)
            .await
            .map_err(|error| ("storage", error.to_string(), 4u8))?;
        let booked: std::collections::HashSet<String> =
            stores.booked_slots().await.into_iter().collect();
        let slots = generate_slots(Utc::now(), &booked);
        Ok::<SlotsOutput, (&'static str, String, u8)>(SlotsOutput {
            slots,
            booked: booked.len(),
        })
    });

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(rendered) => CommandResult { exit_code: 0, output: rendered },
            Err(error) => {
                CommandResult::failure("slots", "serialization", error.to_string(), 5)
            }
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("slots", error_class, message, exit_code)
        }
    }
}
