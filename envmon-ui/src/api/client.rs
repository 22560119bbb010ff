//! HTTP API Client
//!
//! Functions for communicating with the Envmon REST API. Failures come back
//! as display strings; nothing is retried.

use gloo_net::http::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::state::global::{Device, NewDevice, User};
use crate::state::storage;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:3001";

/// Local storage key for an API base override
const API_BASE_KEY: &str = "envmon_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = storage::read(API_BASE_KEY).unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

// ============ Request/Response Types ============

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// POST /users answers 200 with either the new account or `{message}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignupOutcome {
    Created(User),
    Failed { message: String },
}

/// POST /login answers `{status, user}` or a bare string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginOutcome {
    Success { status: String, user: User },
    Rejected(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub tvoc: i64,
    pub eco2: i64,
    pub air_quality: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestStatus {
    pub air_quality: String,
    pub tvoc: String,
    pub eco2: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChartPoint {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsSnapshot {
    pub source: String,
    pub fetched_at: String,
    pub sample_count: usize,
    #[serde(default)]
    pub latest: Option<Reading>,
    #[serde(default)]
    pub status: Option<LatestStatus>,
    #[serde(default)]
    pub chart: Vec<ChartPoint>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

// ============ API Functions ============

async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiMessage>().await {
        Ok(body) => body.message,
        Err(_) => format!("Request failed ({})", status),
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}

/// Register an account
pub async fn signup(req: &SignupRequest) -> Result<SignupOutcome, String> {
    let response = Request::post(&format!("{}/users", get_api_base()))
        .json(req)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

/// Check credentials
pub async fn login(email: &str, password: &str) -> Result<LoginOutcome, String> {
    #[derive(Serialize)]
    struct LoginRequest<'a> {
        email: &'a str,
        password: &'a str,
    }

    let response = Request::post(&format!("{}/login", get_api_base()))
        .json(&LoginRequest { email, password })
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

/// Fetch an account profile
pub async fn fetch_user(id: &str) -> Result<User, String> {
    let response = Request::get(&format!("{}/user/{}", get_api_base(), id))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

/// List the devices owned by a user
pub async fn list_devices(user_id: &str) -> Result<Vec<Device>, String> {
    let response = Request::get(&format!("{}/devices/{}", get_api_base(), user_id))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

pub async fn create_device(device: &NewDevice) -> Result<Device, String> {
    let response = Request::post(&format!("{}/devices", get_api_base()))
        .json(device)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

/// Rename a device. `None` means the server no longer has it.
pub async fn rename_device(id: &str, name: &str) -> Result<Option<Device>, String> {
    #[derive(Serialize)]
    struct RenameRequest<'a> {
        name: &'a str,
    }

    let response = Request::put(&format!("{}/devices/{}", get_api_base(), id))
        .json(&RenameRequest { name })
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

pub async fn delete_device(id: &str) -> Result<(), String> {
    let response = Request::delete(&format!("{}/devices/{}", get_api_base(), id))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }
    Ok(())
}

/// Fetch the dashboard snapshot for a device locator
pub async fn fetch_readings(locator: &str, window: usize) -> Result<ReadingsSnapshot, String> {
    let window = window.to_string();

    let response = Request::get(&format!("{}/readings", get_api_base()))
        .query([("source", locator), ("window", window.as_str())])
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    parse(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_outcomes_decode() {
        let ok: LoginOutcome = serde_json::from_str(
            r#"{"status":"Success","user":{"_id":"u1","name":"N","email":"n@x","phone":""}}"#,
        )
        .unwrap();
        assert!(matches!(ok, LoginOutcome::Success { ref status, .. } if status == "Success"));

        let rejected: LoginOutcome = serde_json::from_str(r#""Password Is Incorrect""#).unwrap();
        assert!(matches!(rejected, LoginOutcome::Rejected(ref m) if m == "Password Is Incorrect"));
    }

    #[test]
    fn test_signup_outcomes_decode() {
        let created: SignupOutcome =
            serde_json::from_str(r#"{"_id":"u1","name":"N","email":"n@x","phone":"1"}"#).unwrap();
        assert!(matches!(created, SignupOutcome::Created(_)));

        let failed: SignupOutcome = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        assert!(matches!(failed, SignupOutcome::Failed { .. }));
    }

    #[test]
    fn test_snapshot_decodes() {
        let snapshot: ReadingsSnapshot = serde_json::from_str(
            r#"{"source":"abc","fetchedAt":"2024-05-01T08:00:00Z","sampleCount":0,
                "latest":null,"status":null,"chart":[]}"#,
        )
        .unwrap();
        assert!(snapshot.latest.is_none());
        assert!(snapshot.chart.is_empty());
    }
}
