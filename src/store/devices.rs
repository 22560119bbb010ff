//! Device Store
//!
//! Persists device records: named pointers to an external readings source.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::store::accounts::timestamp_from_millis;
use crate::store::db::Database;
use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{Device, DevicePatch, NewDevice};

const DEVICE_COLUMNS: &str = "id, name, kind, script_url, metrics, user_id, last_updated";

/// Store of device records
#[derive(Clone)]
pub struct DeviceStore {
    db: Database,
}

impl DeviceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All devices owned by `user_id`, in creation order
    pub fn list_for_owner(&self, user_id: &str) -> StoreResult<Vec<Device>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM devices WHERE user_id = ?1 ORDER BY rowid ASC",
                DEVICE_COLUMNS
            ))?;

            let rows = stmt.query_map(params![user_id], raw_device_from_row)?;

            let mut devices = Vec::new();
            for row in rows {
                devices.push(row?.into_device()?);
            }
            Ok(devices)
        })
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Device>> {
        self.db.with_conn(|conn| fetch(conn, id))
    }

    /// Validate and insert a new device
    pub fn create(&self, new: NewDevice) -> StoreResult<Device> {
        let device = new.into_device(Utc::now())?;
        let metrics = serde_json::to_string(&device.metrics)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO devices (id, name, kind, script_url, metrics, user_id, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    device.id,
                    device.name,
                    device.kind,
                    device.script_url,
                    metrics,
                    device.user_id,
                    device.last_updated.timestamp_millis(),
                ],
            )?;
            Ok(())
        })?;

        tracing::info!(device_id = %device.id, user_id = %device.user_id, "Created device");
        Ok(device)
    }

    /// Apply a partial update. Returns `None` when no device has `id`.
    pub fn update(&self, id: &str, patch: DevicePatch) -> StoreResult<Option<Device>> {
        let updated = self.db.with_conn(|conn| {
            let Some(mut device) = fetch(conn, id)? else {
                return Ok(None);
            };

            patch.apply(&mut device, Utc::now())?;
            let metrics = serde_json::to_string(&device.metrics)?;

            conn.execute(
                "UPDATE devices
                 SET name = ?2, kind = ?3, script_url = ?4, metrics = ?5, user_id = ?6,
                     last_updated = ?7
                 WHERE id = ?1",
                params![
                    device.id,
                    device.name,
                    device.kind,
                    device.script_url,
                    metrics,
                    device.user_id,
                    device.last_updated.timestamp_millis(),
                ],
            )?;

            Ok(Some(device))
        })?;

        match &updated {
            Some(device) => tracing::info!(device_id = %device.id, "Updated device"),
            None => tracing::debug!(device_id = %id, "Update for unknown device"),
        }

        Ok(updated)
    }

    /// Delete a device. Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let removed = self
            .db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM devices WHERE id = ?1", params![id])?))?;

        tracing::info!(device_id = %id, removed = removed > 0, "Deleted device");
        Ok(removed > 0)
    }
}

fn fetch(conn: &Connection, id: &str) -> StoreResult<Option<Device>> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM devices WHERE id = ?1", DEVICE_COLUMNS),
            params![id],
            raw_device_from_row,
        )
        .optional()?;

    raw.map(RawDevice::into_device).transpose()
}

/// Row as stored, before the metrics column is decoded
struct RawDevice {
    id: String,
    name: String,
    kind: String,
    script_url: String,
    metrics: String,
    user_id: String,
    last_updated: i64,
}

impl RawDevice {
    fn into_device(self) -> StoreResult<Device> {
        let metrics: Vec<String> = serde_json::from_str(&self.metrics).map_err(|e| {
            StoreError::Serialization(format!("Bad metrics column for device {}: {}", self.id, e))
        })?;

        Ok(Device {
            id: self.id,
            name: self.name,
            kind: self.kind,
            script_url: self.script_url,
            metrics,
            user_id: self.user_id,
            last_updated: timestamp_from_millis(self.last_updated),
        })
    }
}

fn raw_device_from_row(row: &Row<'_>) -> rusqlite::Result<RawDevice> {
    Ok(RawDevice {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        script_url: row.get(3)?,
        metrics: row.get(4)?,
        user_id: row.get(5)?,
        last_updated: row.get(6)?,
    })
}
