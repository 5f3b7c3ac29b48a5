use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use nappi_core::{CooldownState, InterventionAction, SleepState, SleepStateCoordinator};

use super::{load_context, CliResult};

#[derive(Subcommand)]
pub enum SleepAction {
    /// Fetch and print current sleep and cooldown status
    Status,
    /// Submit a manual override (must invert the current state)
    Intervene {
        #[arg(value_enum)]
        action: InterventionArg,
    },
    /// Re-fetch status on the configured interval until Ctrl-C
    Watch,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InterventionArg {
    MarkAsleep,
    MarkAwake,
}

impl From<InterventionArg> for InterventionAction {
    fn from(arg: InterventionArg) -> Self {
        match arg {
            InterventionArg::MarkAsleep => InterventionAction::MarkAsleep,
            InterventionArg::MarkAwake => InterventionAction::MarkAwake,
        }
    }
}

#[derive(Serialize)]
struct StatusOutput {
    is_sleeping: bool,
    sleep_started_at: Option<chrono::DateTime<Utc>>,
    cooldown_remaining_minutes: Option<i64>,
    /// The only intervention currently offered.
    available_action: String,
}

fn status_output(state: &SleepState) -> StatusOutput {
    let cooldown_remaining_minutes = match state.cooldown(Utc::now()) {
        CooldownState::CoolingDown { remaining_minutes } => Some(remaining_minutes),
        CooldownState::NoCooldown => None,
    };
    let available_action = if state.is_sleeping {
        InterventionAction::MarkAwake
    } else {
        InterventionAction::MarkAsleep
    };
    StatusOutput {
        is_sleeping: state.is_sleeping,
        sleep_started_at: state.sleep_started_at,
        cooldown_remaining_minutes,
        available_action: available_action.to_string(),
    }
}

pub async fn run(action: SleepAction) -> CliResult {
    let (config, session, api) = load_context()?;
    let coordinator = SleepStateCoordinator::new(api, &session);

    match action {
        SleepAction::Status => {
            let state = coordinator.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&status_output(&state))?);
        }
        SleepAction::Intervene { action } => {
            coordinator.refresh().await?;
            let state = coordinator.submit_intervention(action.into()).await?;
            println!("{}", serde_json::to_string_pretty(&status_output(&state))?);
        }
        SleepAction::Watch => {
            let interval = std::time::Duration::from_secs(config.sleep.refresh_interval_secs);
            loop {
                match coordinator.refresh().await {
                    Ok(state) => {
                        println!("{}", serde_json::to_string(&status_output(&state))?);
                    }
                    Err(e) => tracing::warn!(error = %e, "status refresh failed"),
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }
    Ok(())
}
