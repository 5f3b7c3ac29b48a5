//! Core error types for nappi-core.
//!
//! This module defines the error hierarchy using thiserror. Nothing in the
//! core is fatal to the process: every failure degrades to "feature
//! temporarily unavailable" at the call site rather than crashing the client.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nappi-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Alert stream errors
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Push notification errors
    #[error("Push error: {0}")]
    Push(#[from] PushError),

    /// Sleep coordinator errors
    #[error("Sleep error: {0}")]
    Sleep(#[from] SleepError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the typed backend API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Server answered 2xx but reported `success: false`.
    #[error("{endpoint} rejected the request")]
    Rejected { endpoint: String },

    /// Invalid base URL in config.
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Errors from the alert stream client.
///
/// Transport failures on a live stream are never surfaced through this type;
/// they are recovered internally by the reconnect timer and only observable
/// as `ConnectionState::Disconnected`.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Invalid stream base URL.
    #[error("Invalid stream URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to construct the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors from the push notification gateway and registrar.
#[derive(Error, Debug)]
pub enum PushError {
    /// Server reports push delivery is not configured. Subscription must
    /// not be attempted; the caller is told so explicitly.
    #[error("Push notifications are not configured on the server")]
    NotConfigured,

    /// User denied the notification permission. Surfaced once, never
    /// auto-retried.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The host notification surface failed to render or close.
    #[error("Notification surface error: {0}")]
    Surface(String),

    /// The host subscription provider failed.
    #[error("Subscription provider error: {0}")]
    Provider(String),

    /// Server declined the subscribe/unsubscribe request.
    #[error("Push registration failed")]
    RegistrationFailed,

    /// Underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from the sleep state coordinator.
#[derive(Error, Debug)]
pub enum SleepError {
    /// A prior intervention is still in flight; concurrent calls are
    /// rejected, not queued.
    #[error("An intervention is already in flight")]
    InterventionInFlight,

    /// The requested action matches the currently displayed state. Only the
    /// inverse action is ever offered.
    #[error("Action '{requested}' does not invert the current sleep state")]
    RedundantAction { requested: String },

    /// No sleep state has been fetched yet for this subject.
    #[error("Sleep state is unknown; call refresh() first")]
    StateUnknown,

    /// Underlying API call failed. Displayed state is left untouched.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}
