use clap::Subcommand;

use nappi_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init,
    /// Store the signed-in owner and subject ids
    SetSession {
        #[arg(long)]
        owner_id: i64,
        #[arg(long)]
        subject_id: i64,
    },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Init => {
            let path = Config::path()?;
            if path.exists() {
                return Err(format!("config already exists at {}", path.display()).into());
            }
            Config::default().save()?;
            println!("Wrote {}", path.display());
        }
        ConfigAction::SetSession {
            owner_id,
            subject_id,
        } => {
            let mut config = Config::load()?;
            config.session.owner_id = Some(owner_id);
            config.session.subject_id = Some(subject_id);
            config.save()?;
            println!("Session set: owner {owner_id}, subject {subject_id}");
        }
    }
    Ok(())
}
