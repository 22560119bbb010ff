//! Envmon Record Store
//!
//! Account and device records kept in a single SQLite database:
//!
//! - **db**: connection handling and schema
//! - **accounts**: account records and login checks
//! - **devices**: device records (CRUD)
//! - **types**: record and payload types
//! - **error**: error types
//!
//! # Example
//!
//! ```rust,no_run
//! use envmon::store::{AccountStore, Database, DeviceStore, NewAccount, NewDevice};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("./envmon_data/envmon.db")?;
//!     let accounts = AccountStore::new(db.clone());
//!     let devices = DeviceStore::new(db);
//!
//!     let owner = accounts.create(NewAccount {
//!         name: "Ada".into(),
//!         email: "ada@example.com".into(),
//!         password: "correct horse".into(),
//!         phone: "+94 77 123 4567".into(),
//!     })?;
//!
//!     devices.create(NewDevice {
//!         name: Some("Office Sensor".into()),
//!         script_url: Some("AKfycbExample".into()),
//!         user_id: Some(owner.id.clone()),
//!         ..Default::default()
//!     })?;
//!
//!     println!("{} devices", devices.list_for_owner(&owner.id)?.len());
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod db;
pub mod devices;
pub mod error;
pub mod types;

pub use accounts::{AccountStore, LoginOutcome};
pub use db::Database;
pub use devices::DeviceStore;
pub use error::{StoreError, StoreResult};
pub use types::{
    default_metrics, Account, Device, DevicePatch, NewAccount, NewDevice, PublicAccount,
    DEFAULT_DEVICE_TYPE,
};
