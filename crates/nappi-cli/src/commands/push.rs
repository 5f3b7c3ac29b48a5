use std::path::PathBuf;

use clap::Subcommand;

use nappi_core::api::{PushKeys, PushSubscription};
use nappi_core::config::data_dir;
use nappi_core::error::PushError;
use nappi_core::push::{PushRegistrar, SubscriptionProvider};

use super::{load_context, CliResult};

#[derive(Subcommand)]
pub enum PushAction {
    /// Print subscription status
    Status,
    /// Register a push subscription created by the host platform
    Subscribe {
        /// Delivery endpoint issued by the push service
        #[arg(long)]
        endpoint: String,
        /// p256dh key material
        #[arg(long)]
        p256dh: String,
        /// auth secret
        #[arg(long)]
        auth: String,
    },
    /// Remove the push subscription
    Unsubscribe,
}

/// Stores the registered subscription under the data directory. The
/// endpoint and key material are created by the host push service; the CLI
/// only registers precomputed material, so the server key goes unused here.
struct FileSubscriptionProvider {
    path: PathBuf,
    pending: Option<PushSubscription>,
}

impl FileSubscriptionProvider {
    fn new(pending: Option<PushSubscription>) -> Result<Self, PushError> {
        let path = data_dir()
            .map_err(|e| PushError::Provider(e.to_string()))?
            .join("subscription.json");
        Ok(Self { path, pending })
    }
}

impl SubscriptionProvider for FileSubscriptionProvider {
    fn current(&self) -> Option<PushSubscription> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn subscribe(&mut self, _server_key: &str) -> Result<PushSubscription, PushError> {
        let subscription = self
            .pending
            .take()
            .ok_or_else(|| PushError::Provider("no subscription material supplied".to_string()))?;
        let contents = serde_json::to_string_pretty(&subscription)
            .map_err(|e| PushError::Provider(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| PushError::Provider(e.to_string()))?;
        Ok(subscription)
    }

    fn unsubscribe(&mut self) -> Result<(), PushError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| PushError::Provider(e.to_string()))?;
        }
        Ok(())
    }
}

pub async fn run(action: PushAction) -> CliResult {
    let (_config, session, api) = load_context()?;

    match action {
        PushAction::Status => {
            let provider = FileSubscriptionProvider::new(None)?;
            let registrar = PushRegistrar::new(api, &session, provider);
            let status = registrar.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        PushAction::Subscribe {
            endpoint,
            p256dh,
            auth,
        } => {
            let subscription = PushSubscription {
                endpoint,
                keys: PushKeys { p256dh, auth },
            };
            let provider = FileSubscriptionProvider::new(Some(subscription))?;
            let mut registrar = PushRegistrar::new(api, &session, provider);
            registrar.enable().await?;
            println!("Push subscription registered");
        }
        PushAction::Unsubscribe => {
            let provider = FileSubscriptionProvider::new(None)?;
            let mut registrar = PushRegistrar::new(api, &session, provider);
            registrar.disable().await?;
            println!("Push subscription removed");
        }
    }
    Ok(())
}
