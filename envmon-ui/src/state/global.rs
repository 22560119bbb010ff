//! Global Application State
//!
//! Reactive state management using Leptos signals. The device list and the
//! signed-in profile are loaded from local storage when the state is created
//! and written back whenever they change.
//!
//! While a user is signed in the server owns their devices: mutations go to
//! the API first and the cache follows. Signed out, the cache is the only store.

use leptos::*;
use serde::{Deserialize, Serialize};

use crate::api;
use crate::state::storage::{self, DEVICES_KEY, LAST_SELECTED_KEY, USER_KEY};

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Cached device list
    pub devices: RwSignal<Vec<Device>>,
    /// Signed-in profile
    pub user: RwSignal<Option<User>>,
    /// Global loading state
    pub loading: RwSignal<bool>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Account profile as returned by the API
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A device record, either from the API or created locally
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub script_url: String,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub last_updated: String,
}

fn default_kind() -> String {
    "Google Sheets".to_string()
}

/// Create payload for POST /devices
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub script_url: String,
    pub metrics: Vec<String>,
    pub user_id: String,
}

impl Device {
    /// Device that exists only in this browser
    pub fn local(name: String, script_url: String, now_ms: i64, now_iso: String) -> Self {
        Self {
            id: format!("gsheet-{}", now_ms),
            name,
            kind: default_kind(),
            script_url,
            metrics: vec!["temperature".to_string(), "humidity".to_string()],
            user_id: None,
            last_updated: now_iso,
        }
    }
}

/// Reduce a pasted Apps Script URL to its deployment id; other input is trimmed
pub fn normalize_locator(input: &str) -> String {
    const MARKER: &str = "/macros/s/";

    if let Some(pos) = input.find(MARKER) {
        let id: String = input[pos + MARKER.len()..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if !id.is_empty() {
            return id;
        }
    }

    input.trim().to_string()
}

/// Device to show first: the requested one, else the last selected, else the first listed
pub fn choose_device(
    devices: &[Device],
    requested: Option<&str>,
    last_selected: Option<&str>,
) -> Option<String> {
    let known = |id: &str| devices.iter().any(|d| d.id == id);

    requested
        .filter(|id| known(id))
        .or_else(|| last_selected.filter(|id| known(id)))
        .map(str::to_string)
        .or_else(|| devices.first().map(|d| d.id.clone()))
}

/// Where device mutations land
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceBackend {
    /// Signed in: the API is authoritative and the cache follows it
    Server { user_id: String },
    /// Signed out: the browser cache is the only store
    Local,
}

pub fn device_backend(user: Option<&User>) -> DeviceBackend {
    match user {
        Some(user) => DeviceBackend::Server {
            user_id: user.id.clone(),
        },
        None => DeviceBackend::Local,
    }
}

/// How a new device gets created
#[derive(Clone, Debug, PartialEq)]
pub enum AddPlan {
    /// POST this payload and cache the record the API returns
    Remote(NewDevice),
    /// Cache this record directly
    Local(Device),
}

pub fn plan_add(
    backend: &DeviceBackend,
    name: String,
    locator: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> AddPlan {
    let script_url = normalize_locator(locator);

    match backend {
        DeviceBackend::Server { user_id } => AddPlan::Remote(NewDevice {
            name,
            kind: default_kind(),
            script_url,
            metrics: vec!["temperature".to_string(), "humidity".to_string()],
            user_id: user_id.clone(),
        }),
        DeviceBackend::Local => AddPlan::Local(Device::local(
            name,
            script_url,
            now.timestamp_millis(),
            now.to_rfc3339(),
        )),
    }
}

/// The API answers a rename of a missing device with `null`
pub fn rename_outcome(updated: Option<Device>) -> Result<Device, String> {
    updated.ok_or_else(|| "Device no longer exists".to_string())
}

/// Swap in the server's copy of a device
pub fn replace_device(list: &mut [Device], updated: Device) {
    if let Some(slot) = list.iter_mut().find(|d| d.id == updated.id) {
        *slot = updated;
    }
}

pub fn rename_local(list: &mut [Device], id: &str, name: String, now_iso: String) {
    if let Some(device) = list.iter_mut().find(|d| d.id == id) {
        device.name = name;
        device.last_updated = now_iso;
    }
}

pub fn remove_device(list: &mut Vec<Device>, id: &str) {
    list.retain(|d| d.id != id);
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState::new(
        storage::load_devices(storage::read(DEVICES_KEY)),
        storage::load_user(storage::read(USER_KEY)),
    );

    // Save hooks
    let devices = state.devices;
    create_effect(move |_| {
        devices.with(|list| storage::write(DEVICES_KEY, &storage::encode_devices(list)));
    });

    let user = state.user;
    create_effect(move |_| match user.get() {
        Some(user) => match serde_json::to_string(&user) {
            Ok(raw) => storage::write(USER_KEY, &raw),
            Err(e) => web_sys::console::error_1(&format!("Failed to save user: {}", e).into()),
        },
        None => storage::remove(USER_KEY),
    });

    provide_context(state);
}

impl GlobalState {
    pub fn new(devices: Vec<Device>, user: Option<User>) -> Self {
        Self {
            devices: create_rw_signal(devices),
            user: create_rw_signal(user),
            loading: create_rw_signal(false),
            error: create_rw_signal(None),
            success: create_rw_signal(None),
        }
    }

    pub fn sign_in(&self, user: User) {
        self.user.set(Some(user));
    }

    /// Drop the profile and the account's devices; the cache starts over from the seed
    pub fn sign_out(&self) {
        self.user.set(None);
        self.devices.set(storage::seed_devices());
    }

    pub fn user_id(&self) -> Option<String> {
        self.user.with_untracked(|u| u.as_ref().map(|u| u.id.clone()))
    }

    fn backend(&self) -> DeviceBackend {
        self.user.with_untracked(|u| device_backend(u.as_ref()))
    }

    pub fn last_selected(&self) -> Option<String> {
        storage::read(LAST_SELECTED_KEY)
    }

    pub fn remember_selection(&self, device_id: &str) {
        storage::write(LAST_SELECTED_KEY, device_id);
    }

    /// Replace the cache with the server's list (signed in only)
    pub async fn refresh_devices(&self) -> Result<(), String> {
        let DeviceBackend::Server { user_id } = self.backend() else {
            return Ok(());
        };

        let devices = api::list_devices(&user_id).await?;
        self.devices.set(devices);
        Ok(())
    }

    pub async fn add_device(&self, name: String, locator: String) -> Result<Device, String> {
        let device = match plan_add(&self.backend(), name, &locator, chrono::Utc::now()) {
            AddPlan::Remote(new_device) => api::create_device(&new_device).await?,
            AddPlan::Local(device) => device,
        };

        self.devices.update(|list| list.push(device.clone()));
        Ok(device)
    }

    pub async fn rename_device(&self, id: String, name: String) -> Result<(), String> {
        match self.backend() {
            DeviceBackend::Server { .. } => {
                let updated = rename_outcome(api::rename_device(&id, &name).await?)?;
                self.devices.update(|list| replace_device(list, updated));
            }
            DeviceBackend::Local => {
                let now = chrono::Utc::now().to_rfc3339();
                self.devices.update(|list| rename_local(list, &id, name, now));
            }
        }
        Ok(())
    }

    pub async fn delete_device(&self, id: String) -> Result<(), String> {
        if let DeviceBackend::Server { .. } = self.backend() {
            api::delete_device(&id).await?;
        }
        self.devices.update(|list| remove_device(list, &id));
        Ok(())
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> Device {
        Device {
            id: id.to_string(),
            ..Device::local(id.to_string(), "abc".to_string(), 0, String::new())
        }
    }

    #[test]
    fn test_normalize_locator() {
        assert_eq!(
            normalize_locator("https://script.google.com/macros/s/AKfy_cb-1/exec"),
            "AKfy_cb-1"
        );
        assert_eq!(normalize_locator("  AKfycb \n"), "AKfycb");
        assert_eq!(normalize_locator("https://example.com/feed"), "https://example.com/feed");
    }

    #[test]
    fn test_local_device_defaults() {
        let d = Device::local("Office".into(), "abc".into(), 1700000000000, "now".into());

        assert_eq!(d.id, "gsheet-1700000000000");
        assert_eq!(d.kind, "Google Sheets");
        assert_eq!(d.metrics, vec!["temperature", "humidity"]);
        assert!(d.user_id.is_none());
    }

    #[test]
    fn test_choose_device() {
        let devices = vec![device("a"), device("b"), device("c")];

        assert_eq!(choose_device(&devices, Some("c"), Some("b")).as_deref(), Some("c"));
        assert_eq!(choose_device(&devices, None, Some("b")).as_deref(), Some("b"));
        assert_eq!(choose_device(&devices, Some("zz"), Some("gone")).as_deref(), Some("a"));
        assert_eq!(choose_device(&[], Some("a"), None), None);
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Nimal".to_string(),
            email: "n@example.com".to_string(),
            phone: String::new(),
            created_at: None,
        }
    }

    fn at(ms: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_backend_follows_sign_in() {
        assert_eq!(device_backend(None), DeviceBackend::Local);
        assert_eq!(
            device_backend(Some(&user("u1"))),
            DeviceBackend::Server {
                user_id: "u1".to_string()
            }
        );
    }

    #[test]
    fn test_signed_in_add_goes_to_server() {
        let backend = device_backend(Some(&user("u1")));
        let plan = plan_add(
            &backend,
            "Lab".into(),
            "https://script.google.com/macros/s/AKfy_1/exec",
            at(1_700_000_000_000),
        );

        assert_eq!(
            plan,
            AddPlan::Remote(NewDevice {
                name: "Lab".into(),
                kind: "Google Sheets".into(),
                script_url: "AKfy_1".into(),
                metrics: vec!["temperature".into(), "humidity".into()],
                user_id: "u1".into(),
            })
        );
    }

    #[test]
    fn test_signed_out_add_stays_local() {
        let plan = plan_add(&DeviceBackend::Local, "Lab".into(), " AKfy_1 ", at(1_700_000_000_000));

        let AddPlan::Local(device) = plan else {
            panic!("expected a local device");
        };
        assert_eq!(device.id, "gsheet-1700000000000");
        assert_eq!(device.script_url, "AKfy_1");
        assert!(device.user_id.is_none());
    }

    #[test]
    fn test_rename_of_missing_device_is_reported() {
        assert_eq!(rename_outcome(None), Err("Device no longer exists".to_string()));
        assert_eq!(rename_outcome(Some(device("a"))), Ok(device("a")));
    }

    #[test]
    fn test_server_rename_replaces_cached_copy() {
        let mut list = vec![device("a"), device("b")];
        let updated = Device {
            name: "Renamed".into(),
            last_updated: "2024-05-01T08:00:00Z".into(),
            ..device("b")
        };

        replace_device(&mut list, updated.clone());
        assert_eq!(list[1], updated);
        assert_eq!(list[0], device("a"));

        replace_device(&mut list, device("zz"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_local_rename_stamps_time() {
        let mut list = vec![device("a")];

        rename_local(&mut list, "a", "Porch".into(), "2024-05-01T08:00:00Z".into());
        assert_eq!(list[0].name, "Porch");
        assert_eq!(list[0].last_updated, "2024-05-01T08:00:00Z");

        rename_local(&mut list, "missing", "Nope".into(), "later".into());
        assert_eq!(list[0].name, "Porch");
    }

    #[test]
    fn test_remove_device() {
        let mut list = vec![device("a"), device("b")];
        remove_device(&mut list, "a");
        assert_eq!(list, vec![device("b")]);

        remove_device(&mut list, "a");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_sign_out_reseeds_cache() {
        let runtime = create_runtime();
        let owned = Device {
            user_id: Some("u1".into()),
            ..device("64f1")
        };
        let state = GlobalState::new(vec![owned], Some(user("u1")));

        state.sign_out();

        assert!(state.user.get_untracked().is_none());
        assert_eq!(state.devices.get_untracked(), storage::seed_devices());
        runtime.dispose();
    }

    #[test]
    fn test_device_wire_names() {
        let json = serde_json::to_value(device("a")).unwrap();
        assert_eq!(json["_id"], "a");
        assert_eq!(json["type"], "Google Sheets");
        assert_eq!(json["scriptUrl"], "abc");
    }
}
