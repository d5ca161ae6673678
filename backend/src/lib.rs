//! IOU Tracker Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
/// Domain models
pub mod models;
pub mod services;
/// Application state management
pub mod state;
pub mod store;
