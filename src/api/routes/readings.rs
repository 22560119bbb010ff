//! Readings Routes
//!
//! - GET /readings?source=<locator>&window=<n> - Dashboard snapshot for a device source

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ReadingsParams;
use crate::api::error::ApiResult;
use crate::api::extract::QueryParams;
use crate::api::state::AppState;
use crate::readings::ReadingsSnapshot;

/// GET /readings
pub async fn get_readings(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ReadingsParams>,
) -> ApiResult<Json<ReadingsSnapshot>> {
    let snapshot = state.readings.snapshot(&params.source, params.window).await?;

    tracing::debug!(
        source = %snapshot.source,
        samples = snapshot.sample_count,
        "Served readings snapshot"
    );

    Ok(Json(snapshot))
}
