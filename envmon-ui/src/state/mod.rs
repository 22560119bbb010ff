//! State Management
//!
//! Global application state, local persistence and recurring tasks.

pub mod global;
pub mod poller;
pub mod storage;
