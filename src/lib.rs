//! # Envmon
//!
//! Environmental monitoring backend: user accounts, device records pointing at
//! external sensor feeds, and a readings service that turns those feeds into
//! dashboard snapshots.
//!
//! ## Modules
//!
//! - [`store`]: SQLite-backed account and device records
//! - [`auth`]: password hashing
//! - [`readings`]: external feed fetching and snapshot derivation
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use envmon::readings::ReadingsService;
//! use envmon::config::ReadingsConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let readings = ReadingsService::http(ReadingsConfig::default())?;
//!
//!     let snapshot = readings.snapshot("AKfycbExample", None).await?;
//!     if let Some(latest) = snapshot.latest {
//!         println!("{:.1} °C, {:.1} %", latest.temperature, latest.humidity);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod readings;
pub mod store;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};
pub use auth::PasswordService;
pub use config::{ApiConfig, Config, ConfigError, ReadingsConfig};
pub use readings::{ReadingSource, ReadingsError, ReadingsService, ReadingsSnapshot};
pub use store::{
    AccountStore, Database, Device, DeviceStore, LoginOutcome, PublicAccount, StoreError,
    StoreResult,
};
