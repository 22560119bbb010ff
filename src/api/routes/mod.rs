//! API Routes
//!
//! Route handlers organized by functionality.

pub mod accounts;
pub mod devices;
pub mod health;
pub mod readings;

use crate::api::error::{ApiError, ApiResult};
use crate::store::StoreResult;

/// Run a store operation on the blocking pool.
///
/// Store calls hold the SQLite mutex and account calls run argon2, so they
/// stay off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
        .map_err(ApiError::from)
}
