//! Background push delivery path.
//!
//! Runs whenever the host delivers a push message, independent of whether
//! the application is open. Three handlers, each restartable on its own:
//! push delivery, notification interaction, and worker activation. The OS
//! notification surface and the window registry are trait seams so hosts
//! differ but the routing logic does not.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NotificationsConfig;
use crate::error::PushError;

/// Fallback title when a payload cannot be parsed.
pub const FALLBACK_TITLE: &str = "Nappi";
/// Fallback body when a payload cannot be parsed.
pub const FALLBACK_BODY: &str = "New notification";
/// Default icon, also used as the badge.
pub const DEFAULT_ICON: &str = "/logo.svg";
/// Short buzz, pause, buzz.
pub const VIBRATION_PATTERN: [u32; 3] = [200, 100, 200];

/// Push payload as sent by the server.
#[derive(Debug, Clone, Deserialize)]
struct PushPayload {
    title: String,
    body: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Action button on a rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// What the gateway asks the host surface to display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibration: Vec<u32>,
    pub data: Value,
    pub actions: Vec<NotificationAction>,
}

/// How the user interacted with a rendered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// The "Open App" action button.
    OpenApp,
    /// The "Dismiss" action button.
    Dismiss,
    /// A plain click on the notification body.
    Click,
}

/// Host notification surface. `show` must not return until the
/// notification is actually visible; the push event is only acknowledged
/// afterwards, otherwise the host may terminate the handler first.
pub trait NotificationSurface {
    fn show(&mut self, notification: &RenderedNotification) -> Result<(), PushError>;
    fn close(&mut self) -> Result<(), PushError>;
}

/// Application windows known to the host, including ones not yet claimed
/// by the current worker generation.
pub trait WindowRegistry {
    type WindowId: Copy;

    fn windows(&self) -> Vec<Self::WindowId>;
    fn focus(&mut self, window: Self::WindowId) -> Result<(), PushError>;
    /// Open a new window at the application root.
    fn open_root(&mut self) -> Result<(), PushError>;
    /// Take over all open windows immediately instead of waiting for their
    /// next navigation.
    fn claim_all(&mut self);
}

pub struct PushGateway<S, W> {
    surface: S,
    windows: W,
    enabled: bool,
    vibration: bool,
    default_icon: String,
}

impl<S: NotificationSurface, W: WindowRegistry> PushGateway<S, W> {
    pub fn new(surface: S, windows: W) -> Self {
        Self::with_settings(surface, windows, &NotificationsConfig::default())
    }

    /// Build a gateway honoring the user's `[notifications]` settings.
    pub fn with_settings(surface: S, windows: W, settings: &NotificationsConfig) -> Self {
        Self {
            surface,
            windows,
            enabled: settings.enabled,
            vibration: settings.vibration,
            default_icon: settings.icon.clone(),
        }
    }

    /// A push message arrived. Parse it, falling back to a fixed safe
    /// notification on malformed payloads -- the user must never see a
    /// broken or empty notification. Returns what was rendered, or `None`
    /// when notifications are disabled and nothing was shown.
    pub fn handle_push(
        &mut self,
        payload: &[u8],
    ) -> Result<Option<RenderedNotification>, PushError> {
        if !self.enabled {
            debug!("notifications disabled, suppressing push");
            return Ok(None);
        }

        let parsed = match serde_json::from_slice::<PushPayload>(payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "malformed push payload, using fallback");
                PushPayload {
                    title: FALLBACK_TITLE.to_string(),
                    body: FALLBACK_BODY.to_string(),
                    icon: None,
                    data: None,
                }
            }
        };

        let notification = RenderedNotification {
            title: parsed.title,
            body: parsed.body,
            icon: parsed.icon.unwrap_or_else(|| self.default_icon.clone()),
            badge: self.default_icon.clone(),
            vibration: if self.vibration {
                VIBRATION_PATTERN.to_vec()
            } else {
                Vec::new()
            },
            data: parsed.data.unwrap_or_else(|| Value::Object(Default::default())),
            actions: vec![
                NotificationAction {
                    action: "open".to_string(),
                    title: "Open App".to_string(),
                },
                NotificationAction {
                    action: "dismiss".to_string(),
                    title: "Dismiss".to_string(),
                },
            ],
        };

        // Awaited before the push event is acknowledged.
        self.surface.show(&notification)?;
        Ok(Some(notification))
    }

    /// The user interacted with a rendered notification. Dismiss closes it
    /// and does nothing else; any other interaction routes back into the
    /// application: focus the first open window, or open a fresh one at
    /// the root.
    pub fn handle_interaction(&mut self, interaction: Interaction) -> Result<(), PushError> {
        debug!(?interaction, "notification interaction");
        self.surface.close()?;

        if interaction == Interaction::Dismiss {
            return Ok(());
        }

        match self.windows.windows().first().copied() {
            Some(window) => self.windows.focus(window),
            None => self.windows.open_root(),
        }
    }

    /// A new worker generation took over. Claim all open windows at once
    /// so live alert delivery is not left with a stale generation.
    pub fn handle_activation(&mut self) {
        debug!("worker activated, claiming clients");
        self.windows.claim_all();
    }
}
