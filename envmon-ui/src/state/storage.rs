//! Local Storage
//!
//! Browser persistence for the device cache, the signed-in profile and the
//! last selected device. Decoding is kept in plain functions so it can be
//! tested off the browser.

use crate::state::global::{Device, User};

pub const DEVICES_KEY: &str = "devices";
pub const USER_KEY: &str = "user";
pub const LAST_SELECTED_KEY: &str = "lastSelectedDevice";
/// Optional readings poll period override in milliseconds
pub const POLL_INTERVAL_KEY: &str = "envmon_poll_ms";

/// Apps Script deployment behind the example device
pub const SEED_SCRIPT_ID: &str =
    "AKfycbwX-AaJBnjm8mMlB_g6acwaycDp-hb3zPpKTvEgVBl3BpX1mFCg6sLW0coMZvoTufgf";

/// The single example device shown before anything has been saved
pub fn seed_devices() -> Vec<Device> {
    vec![Device {
        id: "gsheet-1".to_string(),
        name: "Environmental Sensor".to_string(),
        kind: "Google Sheets".to_string(),
        script_url: SEED_SCRIPT_ID.to_string(),
        metrics: ["temperature", "humidity", "tvoc", "eco2"]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        user_id: None,
        last_updated: "2023-11-15T10:30:00Z".to_string(),
    }]
}

/// Decode the `devices` entry. A missing or unreadable entry yields the seed.
pub fn load_devices(raw: Option<String>) -> Vec<Device> {
    match raw {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|_| seed_devices()),
        None => seed_devices(),
    }
}

pub fn encode_devices(devices: &[Device]) -> String {
    serde_json::to_string(devices).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the `user` entry
pub fn load_user(raw: Option<String>) -> Option<User> {
    raw.and_then(|raw| serde_json::from_str(&raw).ok())
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub fn write(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        if storage.set_item(key, value).is_err() {
            web_sys::console::warn_1(&format!("Failed to persist {}", key).into());
        }
    }
}

pub fn remove(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}
