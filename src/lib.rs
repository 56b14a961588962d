//! Platter - headless playback state-synchronization engine.
//!
//! Platter mirrors the playback state of a remote streaming service (exposed
//! through a backend REST API) and reconciles it with two optional local
//! transports: a short-preview audio sink and an in-process embedded playback
//! client. The main features include:
//!
//! - A single authoritative now-playing snapshot exposed as a reactive property
//! - Transport selection and graceful degradation across preview, embedded and
//!   remote devices
//! - Auto-advance/track-end detection debounced across racing signal sources
//! - A persisted user-preference store (selected device, volume, appearance)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use platter::settings::SettingsStore;
//!
//! // Create the preference store with defaults
//! let settings = SettingsStore::with_defaults();
//! println!("Volume: {}", settings.current().volume);
//! ```

/// Configuration schema definitions and file loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Persisted user-preference store.
pub mod settings;

/// Reactive services: backend API client and playback orchestration.
pub mod services;

/// Tracing/logging initialization.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{PlatterError, Result};
