mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tabtidy_core::config::get_data_dir;

use commands::daemon::{run_daemon_process, show_status, start_daemon, stop_daemon};

#[derive(Parser)]
#[command(name = "tabtidy")]
#[command(about = "Browser tab declutter daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the declutter daemon
    Start,
    /// (Internal) Run the daemon process
    #[command(hide = true)]
    DaemonInternalStart,
    /// Stop the declutter daemon
    Stop,
    /// Show daemon status and open-tab overview
    Status,
    /// Focus mode controls
    Focus {
        #[command(subcommand)]
        action: FocusAction,
    },
    /// Close duplicate tabs now
    Duplicates,
    /// Show tabs archived to the reading list
    ReadingList,
    /// Manage the blocked-site list
    Block {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Manage the allow list (never closed, wins over the block list)
    Allow {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand, Debug)]
enum FocusAction {
    /// Activate focus mode: sweep distractions now and on an interval
    On {
        /// Sweep interval in milliseconds (defaults to the stored value)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Deactivate focus mode
    Off,
}

#[derive(Subcommand, Debug)]
enum ListAction {
    /// Add a domain substring
    Add { site: String },
    /// Remove a domain substring
    Remove { site: String },
    /// Show the current list
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::DaemonInternalStart) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_secs()
            .init();
    }

    let data_dir = get_data_dir()?;

    match cli.command {
        Commands::Start => start_daemon(&data_dir),
        Commands::DaemonInternalStart => run_daemon_process().await,
        Commands::Stop => stop_daemon(&data_dir).await,
        Commands::Status => show_status(&data_dir).await,
        Commands::Focus { action } => match action {
            FocusAction::On { interval_ms } => {
                commands::control::focus_on(&data_dir, interval_ms).await
            }
            FocusAction::Off => commands::control::focus_off(&data_dir).await,
        },
        Commands::Duplicates => commands::control::close_duplicates(&data_dir).await,
        Commands::ReadingList => commands::reading_list::show_reading_list(&data_dir).await,
        Commands::Block { action } => match action {
            ListAction::Add { site } => commands::policy::block_add(&site),
            ListAction::Remove { site } => commands::policy::block_remove(&site),
            ListAction::List => commands::policy::block_list(),
        },
        Commands::Allow { action } => match action {
            ListAction::Add { site } => commands::policy::allow_add(&site),
            ListAction::Remove { site } => commands::policy::allow_remove(&site),
            ListAction::List => commands::policy::allow_list(),
        },
    }
}
