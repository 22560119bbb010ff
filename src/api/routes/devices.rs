//! Device Routes
//!
//! CRUD endpoints for device records.
//!
//! - GET /devices/:userId - List an owner's devices
//! - POST /devices - Create a device
//! - PUT /devices/:id - Update a device
//! - DELETE /devices/:id - Delete a device

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::MessageResponse;
use crate::api::error::ApiResult;
use crate::api::extract::JsonBody;
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::store::{Device, DevicePatch, NewDevice};

/// GET /devices/:userId
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Device>>> {
    let devices = state.devices.clone();
    let list = blocking(move || devices.list_for_owner(&user_id)).await?;
    Ok(Json(list))
}

/// POST /devices
///
/// Requires name, scriptUrl and userId; type and metrics fall back to defaults.
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewDevice>,
) -> ApiResult<(StatusCode, Json<Device>)> {
    let devices = state.devices.clone();
    let device = blocking(move || devices.create(req)).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// PUT /devices/:id
///
/// Responds with `null` when no device has the id.
pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<DevicePatch>,
) -> ApiResult<Json<Option<Device>>> {
    let devices = state.devices.clone();
    let updated = blocking(move || devices.update(&id, patch)).await?;
    Ok(Json(updated))
}

/// DELETE /devices/:id
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let devices = state.devices.clone();
    blocking(move || devices.delete(&id)).await?;
    Ok(Json(MessageResponse::new("Device deleted successfully")))
}
