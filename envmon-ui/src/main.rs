//! Envmon Dashboard
//!
//! Environmental monitoring dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Live temperature, humidity, TVOC, eCO2 and air-quality readings
//! - Device manager for the sensor feeds a user follows
//! - Account signup, login and profile
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the Envmon API over HTTP and keeps the device list
//! and signed-in profile in local storage.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
