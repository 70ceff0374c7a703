// src/routes/hours_routes.rs

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::warn;

use crate::{
    error::ApiError,
    models::{ApiOk, AppState},
    schedule::hours::BusinessHoursConfig,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/business-hours", get(get_business_hours))
        .route("/business-hours", put(update_business_hours))
}

pub async fn get_business_hours(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<BusinessHoursConfig>>, ApiError> {
    Ok(Json(ApiOk {
        data: state.schedule.hours(),
    }))
}

pub async fn update_business_hours(
    State(state): State<AppState>,
    Json(req): Json<BusinessHoursConfig>,
) -> Result<Json<ApiOk<BusinessHoursConfig>>, ApiError> {
    // Validates and swaps atomically; a rejected config leaves the previous
    // one in effect.
    state.schedule.set_hours(req)?;

    // The active in-memory value is authoritative; the blob is a mirror
    // owned by the external store.
    if let Err(e) = state.hours_store.save(&req).await {
        warn!("failed to persist business hours: {e}");
    }

    Ok(Json(ApiOk {
        data: state.schedule.hours(),
    }))
}
