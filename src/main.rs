#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
// #![doc = include_str!("../README.md")]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::config::Settings;
use crate::service::ShortLinkService;
use crate::storage::Storage;

mod api;
mod clock;
mod config;
mod graceful_shutdown;
mod purge;
mod root;
mod service;
mod short_links;
mod shortcode;
mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "shortcodes=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let settings = Settings::from_env()?;

    let storage = storage::setup().await?;
    let service = ShortLinkService::new(storage, &settings);

    let shutdown = CancellationToken::new();

    let purge = settings.purge_interval.map(|every| {
        purge::spawn(
            service.clone(),
            every,
            settings.purge_grace_minutes,
            shutdown.clone(),
        )
    });

    let app = create_router(service.clone());

    let listener = TcpListener::bind(settings.address).await?;
    tracing::info!("Listening on {}", settings.address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(graceful_shutdown::handler(shutdown.clone()))
        .await?;

    shutdown.cancel();

    if let Some(purge) = purge {
        if let Err(err) = purge.await {
            tracing::error!("Purge task failed: {err}");
        }
    }

    service.storage().close().await;

    tracing::info!("Shutdown complete");

    Ok(())
}

/// Create the router for the service
///
/// Everything not matched by the API is handled as a shortcode
fn create_router<S: Storage>(service: ShortLinkService<S>) -> Router {
    Router::new()
        .merge(api::router::<S>())
        .fallback(root::root::<S>)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(service))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
