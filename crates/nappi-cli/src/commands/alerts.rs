use clap::Subcommand;

use super::{load_context, CliResult};

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Print alert history as JSON
    History {
        #[arg(long, default_value = "50")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Only unread alerts
        #[arg(long)]
        unread_only: bool,
    },
    /// Print the unread alert count
    UnreadCount,
    /// Mark one alert as read
    MarkRead {
        /// Alert id
        id: i64,
    },
    /// Mark every alert as read
    MarkAllRead,
}

pub async fn run(action: AlertsAction) -> CliResult {
    let (_config, session, api) = load_context()?;

    match action {
        AlertsAction::History {
            limit,
            offset,
            unread_only,
        } => {
            let page = api
                .alert_history(session.owner_id, limit, offset, unread_only)
                .await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        AlertsAction::UnreadCount => {
            let count = api.unread_count(session.owner_id).await?;
            println!("{count}");
        }
        AlertsAction::MarkRead { id } => {
            if api.mark_alert_read(id, session.owner_id).await? {
                println!("Alert {id} marked read");
            } else {
                return Err(format!("server declined to mark alert {id} read").into());
            }
        }
        AlertsAction::MarkAllRead => {
            let updated = api.mark_all_read(session.owner_id).await?;
            println!("{updated} alerts marked read");
        }
    }
    Ok(())
}
