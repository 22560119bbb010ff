//! Core record types for the account and device stores.
//!
//! Wire format follows the document-store conventions clients already speak:
//! record ids serialize as `_id` (and are accepted as `id`), other fields are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::error::{StoreError, StoreResult};

/// Device type assigned when a create request omits one
pub const DEFAULT_DEVICE_TYPE: &str = "Google Sheets";

/// Metrics tracked by a device when a create request omits them
pub fn default_metrics() -> Vec<String> {
    vec!["temperature".to_string(), "humidity".to_string()]
}

/// Generate a new record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================
// ACCOUNTS
// ============================================

/// A registered user as persisted in the store.
///
/// `password_hash` is an argon2 PHC string and never leaves the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The account as returned to clients (password stripped)
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account view without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Signup payload. Every field is optional on the wire and stored as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
}

// ============================================
// DEVICES
// ============================================

/// A named pointer to an external metrics source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Source locator: an Apps Script id or a full URL
    pub script_url: String,
    pub metrics: Vec<String>,
    pub user_id: String,
    pub last_updated: DateTime<Utc>,
}

/// Device create payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub script_url: Option<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl NewDevice {
    /// Check required fields and apply defaults, producing the record to insert.
    ///
    /// Every missing field is reported in a single message.
    pub fn into_device(self, now: DateTime<Utc>) -> StoreResult<Device> {
        let name = non_empty(self.name);
        let script_url = non_empty(self.script_url);
        let user_id = non_empty(self.user_id);

        let missing: Vec<&str> = [
            ("name", name.is_none()),
            ("scriptUrl", script_url.is_none()),
            ("userId", user_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        match (name, script_url, user_id) {
            (Some(name), Some(script_url), Some(user_id)) => Ok(Device {
                id: new_id(),
                name,
                kind: non_empty(self.kind).unwrap_or_else(|| DEFAULT_DEVICE_TYPE.to_string()),
                script_url,
                metrics: self.metrics.unwrap_or_else(default_metrics),
                user_id,
                last_updated: now,
            }),
            _ => Err(StoreError::Validation(required_message(&missing))),
        }
    }
}

/// Partial device update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub script_url: Option<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DevicePatch {
    /// Patch that only renames a device
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Apply the patch to a stored device.
    ///
    /// Required fields may be replaced but not blanked. `lastUpdated` is bumped to `now`
    /// unless the patch carries its own value.
    pub fn apply(self, device: &mut Device, now: DateTime<Utc>) -> StoreResult<()> {
        let blanked: Vec<&str> = [
            ("name", self.name.as_deref()),
            ("scriptUrl", self.script_url.as_deref()),
            ("userId", self.user_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.filter(|v| v.trim().is_empty()).map(|_| field))
        .collect();

        if !blanked.is_empty() {
            return Err(StoreError::Validation(required_message(&blanked)));
        }

        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(kind) = self.kind {
            device.kind = kind;
        }
        if let Some(script_url) = self.script_url {
            device.script_url = script_url;
        }
        if let Some(metrics) = self.metrics {
            device.metrics = metrics;
        }
        if let Some(user_id) = self.user_id {
            device.user_id = user_id;
        }
        device.last_updated = self.last_updated.unwrap_or(now);

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_message(fields: &[&str]) -> String {
    let details: Vec<String> = fields
        .iter()
        .map(|field| format!("{}: Path `{}` is required.", field, field))
        .collect();
    format!("Device validation failed: {}", details.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_device() -> NewDevice {
        NewDevice {
            name: Some("Office Sensor".to_string()),
            kind: None,
            script_url: Some("AKfycbExample".to_string()),
            metrics: None,
            user_id: Some("user-1".to_string()),
        }
    }

    #[test]
    fn test_new_device_defaults() {
        let now = Utc::now();
        let device = sample_new_device().into_device(now).unwrap();

        assert_eq!(device.kind, DEFAULT_DEVICE_TYPE);
        assert_eq!(device.metrics, vec!["temperature", "humidity"]);
        assert_eq!(device.last_updated, now);
        assert!(!device.id.is_empty());
    }

    #[test]
    fn test_new_device_missing_locator() {
        let req = NewDevice {
            script_url: None,
            ..sample_new_device()
        };
        let err = req.into_device(Utc::now()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Device validation failed: scriptUrl: Path `scriptUrl` is required."
        );
    }

    #[test]
    fn test_new_device_reports_every_missing_field() {
        let err = NewDevice::default().into_device(Utc::now()).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("name: Path `name`"));
        assert!(message.contains("scriptUrl: Path `scriptUrl`"));
        assert!(message.contains("userId: Path `userId`"));
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let mut device = sample_new_device().into_device(Utc::now()).unwrap();
        let result = DevicePatch::rename("  ").apply(&mut device, Utc::now());

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(device.name, "Office Sensor");
    }

    #[test]
    fn test_device_wire_format() {
        let device = sample_new_device().into_device(Utc::now()).unwrap();
        let json = serde_json::to_value(&device).unwrap();

        assert!(json.get("_id").is_some());
        assert_eq!(json["type"], "Google Sheets");
        assert_eq!(json["scriptUrl"], "AKfycbExample");
        assert_eq!(json["userId"], "user-1");
        assert!(json.get("lastUpdated").is_some());
    }

    #[test]
    fn test_public_account_has_no_password() {
        let account = Account {
            id: "a1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            phone: "+94 77 123 4567".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(account.to_public()).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["_id"], "a1");
    }
}
