mod config;
mod error;
mod hours_store;
mod models;
mod routes;
mod schedule;

use std::sync::Arc;

use crate::{
    config::Config,
    hours_store::{FileHoursStore, HoursStore},
    models::AppState,
    schedule::hours::BusinessHoursConfig,
    schedule::service::ScheduleService,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;

    let hours_store: Arc<dyn HoursStore> =
        Arc::new(FileHoursStore::new(&cfg.business_hours_file));
    let hours = match hours_store.load().await {
        Some(stored) => match stored.validate() {
            Ok(()) => stored,
            Err(e) => {
                tracing::warn!("stored business hours rejected ({e}); using defaults");
                BusinessHoursConfig::default()
            }
        },
        None => BusinessHoursConfig::default(),
    };

    let state = AppState {
        schedule: Arc::new(ScheduleService::new(hours)?),
        hours_store,
    };

    // DEV ONLY: allow browser/WebView clients (static frontend) to call the
    // API. Fixes OPTIONS preflight (CORS) that otherwise blocks POST.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
