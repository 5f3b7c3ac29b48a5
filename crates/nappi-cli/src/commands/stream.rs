use clap::Args;
use nappi_core::AlertStreamClient;

use super::{load_context, CliResult};

#[derive(Args)]
pub struct StreamArgs {
    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(long)]
    duration: Option<u64>,
}

/// Follow the live alert stream, printing one JSON alert per line on
/// stdout and connection transitions on stderr.
pub async fn run(args: StreamArgs) -> CliResult {
    let (config, session, _api) = load_context()?;

    let mut client = AlertStreamClient::new(&config.server.base_url)?;
    client.set_handler(|alert| match serde_json::to_string(alert) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("error: failed to serialize alert: {e}"),
    });

    let mut state_rx = client.state_watch();
    client.connect(session.owner_id);

    let transitions = async {
        while state_rx.changed().await.is_ok() {
            eprintln!("connection: {:?}", *state_rx.borrow());
        }
    };

    match args.duration {
        Some(secs) => {
            tokio::select! {
                _ = transitions => {}
                _ = tokio::time::sleep(std::time::Duration::from_secs(secs)) => {}
            }
        }
        None => {
            tokio::select! {
                _ = transitions => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    client.disconnect();
    Ok(())
}
