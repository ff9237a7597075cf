use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "burnrate")]
#[command(about = "Real-time meeting cost clock", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Control the meeting clock on a running service
    Session(SessionCliArgs),
    /// Manage the participant roster on a running service
    Roster(RosterCliArgs),
    /// View service logs
    Logs(LogsCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct SessionCliArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Start or resume the meeting clock
    Start,
    /// Pause the meeting clock, keeping elapsed time
    Pause,
    /// Zero the clock and every participant's accrual
    Reset,
    /// Hand the floor to the next participant
    Next,
    /// Toggle the off-track flag on the current speaker
    Offtrack,
    /// Show the live session status
    Status,
    /// Set the total meeting duration in minutes
    Duration { minutes: f64 },
}

#[derive(ClapArgs, Debug)]
pub struct RosterCliArgs {
    #[command(subcommand)]
    pub command: RosterCommand,
}

#[derive(Subcommand, Debug)]
pub enum RosterCommand {
    /// Add a participant with an hourly (default) or monthly rate
    Add {
        name: String,
        /// Compensation rate in dollars
        #[arg(long)]
        rate: f64,
        /// Treat the rate as monthly instead of hourly
        #[arg(long)]
        monthly: bool,
    },
    /// Replace the roster with the example set from config
    Preset,
    /// Remove every participant and halt the session
    Clear,
    /// List the roster
    List,
}

#[derive(ClapArgs, Debug)]
pub struct LogsCliArgs {
    /// Number of log entries to show
    #[arg(short = 'n', long, default_value = "30")]
    pub lines: usize,
}
