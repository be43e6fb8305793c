use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, clear, config, progress, status};
use media_status_config::PathManager;
use media_status_models::SeasonKey;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "finwatch")]
#[command(about = "finwatch - Browse a Jellyfin library and see what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the rotating log file instead of stderr
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the server connection and sign in
    #[command(long_about = "Manage the Jellyfin server connection. 'config server' signs in and stores the access token; 'config show' prints the current settings with the token masked.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// List libraries, or the children of a library item, with watch indicators
    #[command(long_about = "Without an argument, list the user's libraries. With a PARENT_ID, list that item's children. --type lists every series or movie below the parent (or in the whole library). --filter keeps items whose name contains the text, ignoring case. Series and seasons are marked ✔ (watched), ~ (partially watched) or left blank, based on their episodes.")]
    Browse {
        /// Item id to list children of
        parent_id: Option<String>,

        /// Only list items of this type, searching recursively
        #[arg(long = "type", value_enum, value_name = "TYPE")]
        media_type: Option<browse::MediaType>,

        /// Only list items whose name contains this text (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        filter: Option<String>,
    },
    /// Show the aggregated watch status of a series
    Status {
        /// Series id
        show_id: String,

        /// Only show this season ('none' for episodes without a season)
        #[arg(long, value_name = "SEASON_ID")]
        season: Option<SeasonKey>,
    },
    /// Report playback of an item to the server
    #[command(long_about = "Report a playback event for an item. Defaults to a progress report; use --start when playback begins and --stopped when it ends. After a stop report the owning series' status is refreshed.")]
    Progress {
        /// Item id being played
        item_id: String,

        /// Playback position in seconds
        #[arg(long, value_name = "SECS", default_value_t = 0)]
        position: u64,

        /// Report playback start
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "stopped")]
        start: bool,

        /// Report playback stopped
        #[arg(long, action = ArgAction::SetTrue)]
        stopped: bool,
    },
    /// Clear stored session data
    #[command(long_about = "Clear stored session data. Use --session to sign out while keeping this device's id, or --credentials to delete the credentials file entirely.")]
    Clear {
        /// Forget the access token and user id
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "credentials")]
        session: bool,

        /// Delete the credentials file
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set the server and sign in
    Server {
        /// Server base URL (if not provided, will prompt)
        #[arg(long)]
        url: Option<String>,

        /// Username (if not provided, will prompt)
        #[arg(long)]
        username: Option<String>,
    },
    /// Show current configuration (masks the access token)
    Show {
        /// Show the access token unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli.log_to_file.then(|| PathManager::default().log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Browse { parent_id, media_type, filter } => {
            browse::run_browse(parent_id, media_type, filter, &output).await
        }
        Commands::Status { show_id, season } => status::run_status(&show_id, season, &output).await,
        Commands::Progress { item_id, position, start, stopped } => {
            progress::run_progress(&item_id, position, start, stopped, &output).await
        }
        Commands::Clear { session, credentials } => clear::run_clear(session, credentials, &output).await,
    }
}
