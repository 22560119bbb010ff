//! Pages
//!
//! Top-level page components for each route.

pub mod dashboard;
pub mod devices;
pub mod login;
pub mod profile;
pub mod signup;
pub mod welcome;

pub use dashboard::Dashboard;
pub use devices::Devices;
pub use login::Login;
pub use profile::Profile;
pub use signup::Signup;
pub use welcome::Welcome;
