use anyhow::Result;
use burnrate::{
    app,
    cli::{
        handle_logs_command, handle_roster_command, handle_session_command, Cli, CliCommand,
    },
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("burnrate {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Session(args)) => {
            handle_session_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Roster(args)) => {
            handle_roster_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Logs(args)) => {
            handle_logs_command(args)?;
            return Ok(());
        }
        None => {}
    }

    app::run_service().await
}
