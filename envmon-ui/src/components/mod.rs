//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod loading;
pub mod sidebar;
pub mod status_card;
pub mod toast;

pub use chart::Chart;
pub use loading::{CardSkeleton, Loading};
pub use sidebar::SignedInShell;
pub use status_card::StatusCard;
pub use toast::Toast;
