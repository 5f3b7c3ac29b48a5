pub mod alerts;
pub mod config;
pub mod push;
pub mod sleep;
pub mod stream;

use nappi_core::{ApiClient, Config, Session};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load config, the persisted session, and an API client in one go.
/// Session ids come from `nappi-cli config set-session`.
pub(crate) fn load_context() -> Result<(Config, Session, ApiClient), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = Session::from_config(&config)?;
    let api = ApiClient::from_config(&config)?;
    Ok((config, session, api))
}
