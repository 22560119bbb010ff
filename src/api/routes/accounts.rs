//! Account Routes
//!
//! - POST /users - Register an account
//! - POST /login - Check credentials
//! - GET /user/:id - Fetch an account

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{LoginRequest, LoginSuccess, MessageResponse, NO_RECORD, PASSWORD_INCORRECT};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::JsonBody;
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::store::{LoginOutcome, NewAccount, PublicAccount};

/// POST /users
///
/// Store failures are reported as `{message}` with status 200, which is what
/// existing clients check for.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewAccount>,
) -> Response {
    let accounts = state.accounts.clone();

    match blocking(move || accounts.create(req)).await {
        Ok(account) => Json(account.to_public()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Account creation failed");
            (StatusCode::OK, Json(MessageResponse::new(e.to_string()))).into_response()
        }
    }
}

/// POST /login
///
/// Every outcome is a 200: `{status, user}` on success, otherwise a bare JSON string.
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Response> {
    let accounts = state.accounts.clone();
    let outcome = blocking(move || accounts.authenticate(&req.email, &req.password)).await?;

    Ok(match outcome {
        LoginOutcome::Success(user) => Json(LoginSuccess::new(user)).into_response(),
        LoginOutcome::PasswordIncorrect => Json(PASSWORD_INCORRECT).into_response(),
        LoginOutcome::NoRecord => Json(NO_RECORD).into_response(),
    })
}

/// GET /user/:id
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicAccount>> {
    let accounts = state.accounts.clone();
    let account = blocking(move || accounts.get(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(account.to_public()))
}
