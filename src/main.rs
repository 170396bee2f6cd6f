use crate::state::WebhookState;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod config;
mod image_reference;
mod patch;
mod planner;
mod registry;
mod state;
mod webhook;
mod webserver;

#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting ecr-pull-through-webhook {}", env!("CARGO_PKG_VERSION"));

    let config_path =
        env::var("CONFIG_PATH").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_config(&config_path)?;

    let state = WebhookState::from_config(&config);
    match state.target.hostname() {
        Some(hostname) => info!(
            "Rewriting images from registries {} to pull-through cache {}",
            state.catalog, hostname
        ),
        None => tracing::warn!(
            "awsAccountId or awsRegion is not configured, images will not be rewritten"
        ),
    }

    let app = webserver::create_app(state);
    webserver::serve(app, config.webserver.port, &config.tls).await?;

    Ok(())
}

/// `RUST_LOG` filters (default `info`), `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
