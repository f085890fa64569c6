//! Feed Courier - binary entrypoint.
//!
//! Boots the digest service, the scheduled trigger and the HTTP API from
//! `config.toml`. Missing required configuration is fatal: neither the
//! scheduler nor the API starts until it is resolved.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use feed_courier::digest::{BucketResolver, DigestFormatter, DigestService};
use feed_courier::webhook::WebhookDispatcher;
use feed_courier::{start_scheduler, Config, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration with environment overrides.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = feed_courier::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feed_courier::logging::init_console_only(&config.logging.level);
    }

    // Required configuration must be present before anything starts
    if let Err(e) = config.validate() {
        tracing::error!("Cannot run: {e}");
        return ExitCode::FAILURE;
    }

    let store = match feed_courier::open_store(&config.storage).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open entry store: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Validation guarantees the resolver config parses
    let resolver = match BucketResolver::from_config(&config.digest) {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!("Cannot run: {e}");
            return ExitCode::FAILURE;
        }
    };

    let service = Arc::new(DigestService::new(
        store,
        resolver,
        DigestFormatter::from_config(&config.digest),
        WebhookDispatcher::from_config(&config.webhook),
    ));

    info!("Feed Courier starting");
    start_scheduler(service.clone());

    let server = WebServer::new(&config.server, service, &config.auth.api_key);
    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
