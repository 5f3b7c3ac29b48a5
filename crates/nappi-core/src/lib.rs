//! # Nappi Core Library
//!
//! Client-side core for the Nappi infant sleep/room monitor. It implements
//! the live-notification subsystem behind every front end: a CLI binary
//! ships in this workspace, and GUI shells are thin layers over the same
//! library.
//!
//! ## Architecture
//!
//! - **Alert stream**: one SSE connection per signed-in owner, feeding a
//!   bounded newest-first buffer; disconnects recover on a fixed-delay
//!   reconnect and only ever surface as a connectivity flag
//! - **Push gateway**: background notification rendering and interaction
//!   routing, independent of any open client, behind host trait seams
//! - **Sleep coordinator**: manual sleep/awake override with a
//!   server-controlled cooldown window and a single-flight guard
//! - **API client**: typed request/response structs for every backend
//!   endpoint, validated at the network boundary
//!
//! ## Key Components
//!
//! - [`AlertStreamClient`]: reconnecting SSE client
//! - [`AlertBuffer`] / [`AlertInbox`]: bounded store + optimistic read-state
//! - [`PushGateway`] / [`PushRegistrar`]: background delivery path
//! - [`SleepStateCoordinator`]: sleep/cooldown override state machine
//! - [`ApiClient`]: backend endpoints
//! - [`Session`]: signed-in owner/subject, built once and passed down

pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod push;
pub mod session;
pub mod sleep;
pub mod stream;

pub use alerts::{AlertBuffer, AlertInbox, AlertKind, AlertRecord, Severity, ALERT_BUFFER_CAPACITY};
pub use api::{ApiClient, InterventionAction, PushSubscription};
pub use config::Config;
pub use error::{ApiError, ConfigError, CoreError, PushError, SleepError, StreamError};
pub use push::{PushGateway, PushRegistrar};
pub use session::Session;
pub use sleep::{CooldownState, SleepState, SleepStateCoordinator};
pub use stream::{AlertStreamClient, ConnectionState, RECONNECT_DELAY};
