/// One-shot runner: classify every configured location and print the
/// report as JSON on stdout.
///
/// Environment (also read from `.env`):
///   RADAR_CUACA_CONFIG     TOML configuration path (default `radar_cuaca.toml`)
///   RADAR_CUACA_STORE      previous-temperature store path override
///   RADAR_CUACA_LOG        log file path override
///   RADAR_CUACA_LOG_LEVEL  debug | info | warn | error (default `info`)

use std::env;
use std::process::ExitCode;

use radar_cuaca::config::load_config;
use radar_cuaca::logging::{self, Component, LogLevel};
use radar_cuaca::run::{load_inputs, run};
use radar_cuaca::store::PreviousTemperatureStore;
use radar_cuaca::timeline::build_slots;

const DEFAULT_CONFIG_PATH: &str = "radar_cuaca.toml";

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config_path = env::var("RADAR_CUACA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Ok(path) = env::var("RADAR_CUACA_STORE") {
        config.store_path = path;
    }
    if let Ok(path) = env::var("RADAR_CUACA_LOG") {
        config.log_file = Some(path);
    }

    let level = env::var("RADAR_CUACA_LOG_LEVEL")
        .ok()
        .and_then(|v| LogLevel::parse(&v))
        .unwrap_or(LogLevel::Info);
    logging::init_logger(level, config.log_file.as_deref(), config.log_file.is_some());

    if config.locations.is_empty() {
        logging::error(Component::Config, None, &format!("No [[locations]] in {}", config_path));
        return ExitCode::FAILURE;
    }

    let slots = build_slots(config.utc_offset_hours, config.slot_count);
    let inputs = load_inputs(&config.locations);

    let mut store = PreviousTemperatureStore::load(&config.store_path);
    let report = run(&inputs, &slots, &config.thresholds, &mut store);
    store.save(&config.store_path);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::error(Component::Run, None, &format!("Report serialization failed: {}", e));
            ExitCode::FAILURE
        }
    }
}
