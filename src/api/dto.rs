//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not store
//! records themselves. Records (`PublicAccount`, `Device`) are serialized
//! directly.

use serde::{Deserialize, Serialize};

use crate::store::PublicAccount;

// ============================================
// ACCOUNT DTOs
// ============================================

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginSuccess {
    /// Always "Success"
    pub status: String,
    pub user: PublicAccount,
}

impl LoginSuccess {
    pub fn new(user: PublicAccount) -> Self {
        Self {
            status: "Success".to_string(),
            user,
        }
    }
}

/// Body returned for login mismatches (a bare JSON string)
pub const PASSWORD_INCORRECT: &str = "Password Is Incorrect";

/// Body returned when no account has the email (a bare JSON string)
pub const NO_RECORD: &str = "No Record Existed";

// ============================================
// GENERIC DTOs
// ============================================

/// `{message}` body used for errors and acknowledgements
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// READINGS DTOs
// ============================================

/// Query string for GET /readings
#[derive(Debug, Deserialize)]
pub struct ReadingsParams {
    /// Device locator (Apps Script id or URL)
    #[serde(default)]
    pub source: String,
    /// Chart window size
    #[serde(default)]
    pub window: Option<usize>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Record store status
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
