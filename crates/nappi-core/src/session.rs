//! The signed-in session.
//!
//! A `Session` is built once at startup and passed by reference to every
//! component that needs to know who is signed in and which subject is
//! monitored. Components never read shared storage ad hoc.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ConfigError;

/// Identifies the signed-in parent (owner) and the monitored infant
/// (subject) for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Parent account receiving alerts.
    pub owner_id: i64,
    /// Monitored infant whose sleep/environment is tracked.
    pub subject_id: i64,
}

impl Session {
    pub fn new(owner_id: i64, subject_id: i64) -> Self {
        Self {
            owner_id,
            subject_id,
        }
    }

    /// Build a session from persisted config, failing explicitly when the
    /// ids were never stored.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let owner_id = config
            .session
            .owner_id
            .ok_or_else(|| ConfigError::MissingKey("session.owner_id".to_string()))?;
        let subject_id = config
            .session
            .subject_id
            .ok_or_else(|| ConfigError::MissingKey("session.subject_id".to_string()))?;
        Ok(Self::new(owner_id, subject_id))
    }
}
