use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "nappi-cli", version, about = "Nappi monitor CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Alert history and read-state
    Alerts {
        #[command(subcommand)]
        action: commands::alerts::AlertsAction,
    },
    /// Follow the live alert stream
    Stream(commands::stream::StreamArgs),
    /// Sleep status and manual intervention
    Sleep {
        #[command(subcommand)]
        action: commands::sleep::SleepAction,
    },
    /// Push notification subscription
    Push {
        #[command(subcommand)]
        action: commands::push::PushAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Alerts { action } => commands::alerts::run(action).await,
        Commands::Stream(args) => commands::stream::run(args).await,
        Commands::Sleep { action } => commands::sleep::run(action).await,
        Commands::Push { action } => commands::push::run(action).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
