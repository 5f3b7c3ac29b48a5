//! Typed backend API client.
//!
//! Every response is validated into an explicit struct at the network
//! boundary; optional fields are optional in the type, never implicit.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::alerts::AlertRecord;
use crate::config::Config;
use crate::error::ApiError;

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertListResponse {
    pub alerts: Vec<AlertRecord>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct UnreadCountResponse {
    count: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ReadAllResponse {
    updated_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepStatusResponse {
    pub is_sleeping: bool,
    #[serde(default)]
    pub sleep_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sleep_duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownStatusResponse {
    pub in_cooldown: bool,
    #[serde(default)]
    pub cooldown_remaining_minutes: Option<i64>,
}

/// Manual override of the automated sleep determination. Only the inverse
/// of the displayed state is ever submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionAction {
    MarkAsleep,
    MarkAwake,
}

impl fmt::Display for InterventionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkAsleep => write!(f, "mark_asleep"),
            Self::MarkAwake => write!(f, "mark_awake"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterventionRequest {
    pub subject_id: i64,
    pub action: InterventionAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepStatusKind {
    Sleeping,
    Awake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionResponse {
    pub status: SleepStatusKind,
    /// Cooldown length chosen by the server; it may vary by context.
    pub cooldown_minutes: i64,
    pub cooldown_until: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapidKeyResponse {
    pub public_key: Option<String>,
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushStatusResponse {
    pub subscribed: bool,
    pub push_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push delivery registration: an opaque endpoint plus its crypto keys,
/// bound to exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Nappi backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.server.base_url,
            Duration::from_secs(config.server.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Alerts ───────────────────────────────────────────────────────

    /// Alert history for an owner, newest first, paged by limit/offset.
    pub async fn alert_history(
        &self,
        owner_id: i64,
        limit: u32,
        offset: u32,
        unread_only: bool,
    ) -> Result<AlertListResponse, ApiError> {
        self.get_json(
            "/alerts/history",
            &[
                ("user_id", owner_id.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("unread_only", unread_only.to_string()),
            ],
        )
        .await
    }

    pub async fn unread_count(&self, owner_id: i64) -> Result<u64, ApiError> {
        let resp: UnreadCountResponse = self
            .get_json("/alerts/unread-count", &[("user_id", owner_id.to_string())])
            .await?;
        Ok(resp.count)
    }

    /// Authoritative single-record read-state write.
    pub async fn mark_alert_read(&self, alert_id: i64, owner_id: i64) -> Result<bool, ApiError> {
        let endpoint = format!("/alerts/{alert_id}/read");
        let resp: SuccessResponse = self
            .post_json(&endpoint, &[("user_id", owner_id.to_string())], None::<&()>)
            .await?;
        Ok(resp.success)
    }

    /// Authoritative batch read-state write. Returns the updated count.
    pub async fn mark_all_read(&self, owner_id: i64) -> Result<u64, ApiError> {
        let resp: ReadAllResponse = self
            .post_json(
                "/alerts/read-all",
                &[("user_id", owner_id.to_string())],
                None::<&()>,
            )
            .await?;
        Ok(resp.updated_count)
    }

    // ── Sleep / intervention ─────────────────────────────────────────

    pub async fn sleep_status(&self, subject_id: i64) -> Result<SleepStatusResponse, ApiError> {
        self.get_json(&format!("/sensor/sleep-status/{subject_id}"), &[])
            .await
    }

    pub async fn cooldown_status(
        &self,
        subject_id: i64,
    ) -> Result<CooldownStatusResponse, ApiError> {
        self.get_json(&format!("/sensor/cooldown-status/{subject_id}"), &[])
            .await
    }

    pub async fn submit_intervention(
        &self,
        request: &InterventionRequest,
    ) -> Result<InterventionResponse, ApiError> {
        self.post_json("/sensor/intervention", &[], Some(request))
            .await
    }

    // ── Push ─────────────────────────────────────────────────────────

    pub async fn vapid_key(&self) -> Result<VapidKeyResponse, ApiError> {
        self.get_json("/push/vapid-key", &[]).await
    }

    pub async fn push_status(&self, owner_id: i64) -> Result<PushStatusResponse, ApiError> {
        self.get_json("/push/status", &[("user_id", owner_id.to_string())])
            .await
    }

    pub async fn push_subscribe(
        &self,
        owner_id: i64,
        subscription: &PushSubscription,
    ) -> Result<bool, ApiError> {
        let resp: SuccessResponse = self
            .post_json(
                "/push/subscribe",
                &[("user_id", owner_id.to_string())],
                Some(subscription),
            )
            .await?;
        Ok(resp.success)
    }

    pub async fn push_unsubscribe(&self, owner_id: i64) -> Result<bool, ApiError> {
        let resp: SuccessResponse = self
            .post_json(
                "/push/unsubscribe",
                &[("user_id", owner_id.to_string())],
                None::<&()>,
            )
            .await?;
        Ok(resp.success)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)?).query(query).send().await?;
        Self::decode(path, resp).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut req = self.http.post(self.url(path)?).query(query);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        Self::decode(path, resp).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }
}
