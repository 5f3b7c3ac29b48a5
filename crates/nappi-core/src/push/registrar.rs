//! Push subscription management.
//!
//! Plain request/response, not event-driven. A subscription is created
//! from a server-issued public key; when the server reports the feature
//! unconfigured, subscription is never attempted and the caller is told so
//! explicitly. Replacing a subscription unsubscribes the previous
//! registration first so the server never accumulates orphaned endpoints.

use tracing::{debug, info};

use crate::api::{ApiClient, PushStatusResponse, PushSubscription};
use crate::error::PushError;
use crate::session::Session;

/// Host-side subscription store. Creating a subscription may prompt the
/// user for permission; a denial surfaces as `PushError::PermissionDenied`
/// and is never auto-retried.
pub trait SubscriptionProvider {
    /// The currently held subscription, if any.
    fn current(&self) -> Option<PushSubscription>;
    /// Create a new subscription against the server's public key.
    fn subscribe(&mut self, server_key: &str) -> Result<PushSubscription, PushError>;
    /// Drop the held subscription.
    fn unsubscribe(&mut self) -> Result<(), PushError>;
}

pub struct PushRegistrar<P> {
    api: ApiClient,
    owner_id: i64,
    provider: P,
}

impl<P: SubscriptionProvider> PushRegistrar<P> {
    pub fn new(api: ApiClient, session: &Session, provider: P) -> Self {
        Self {
            api,
            owner_id: session.owner_id,
            provider,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether this owner is subscribed and whether the server supports
    /// push at all.
    pub async fn status(&self) -> Result<PushStatusResponse, PushError> {
        Ok(self.api.push_status(self.owner_id).await?)
    }

    /// Subscribe this owner to background push delivery.
    pub async fn enable(&mut self) -> Result<(), PushError> {
        let key = self.api.vapid_key().await?;
        if !key.configured {
            return Err(PushError::NotConfigured);
        }
        let public_key = key.public_key.ok_or(PushError::NotConfigured)?;

        // Replace, never accumulate: drop the old registration on both
        // sides before creating the new one.
        if self.provider.current().is_some() {
            debug!("replacing existing push subscription");
            self.provider.unsubscribe()?;
            self.api.push_unsubscribe(self.owner_id).await?;
        }

        let subscription = self.provider.subscribe(&public_key)?;
        if !self.api.push_subscribe(self.owner_id, &subscription).await? {
            return Err(PushError::RegistrationFailed);
        }
        info!("push subscription registered");
        Ok(())
    }

    /// Remove this owner's subscription locally and server-side.
    pub async fn disable(&mut self) -> Result<(), PushError> {
        self.provider.unsubscribe()?;
        if !self.api.push_unsubscribe(self.owner_id).await? {
            return Err(PushError::RegistrationFailed);
        }
        info!("push subscription removed");
        Ok(())
    }
}
