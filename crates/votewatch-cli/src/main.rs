mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "votewatch",
    about = "World Assembly roll-call recorder with event-log finalization at close",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .votewatch/ or .git/)
    #[arg(long, global = true, env = "VOTEWATCH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config and data directories
    Init,

    /// Poll every chamber once, finalizing resolutions that closed
    Tick {
        /// Only poll these chambers (default: all configured chambers)
        #[arg(long = "chamber", value_name = "ID")]
        chambers: Vec<String>,

        /// Override the configured User-Agent sent to the API
        #[arg(long, env = "VOTEWATCH_USER_AGENT")]
        user_agent: Option<String>,
    },

    /// Show what each chamber is tracking
    Status,

    /// Show the stored roster for a resolution
    Show {
        /// Resolution id
        resolution: String,

        /// List every voter, not just the totals
        #[arg(long)]
        voters: bool,
    },

    /// Re-run the event-log backfill for a stored roster
    Backfill {
        /// Resolution id
        resolution: String,

        /// Window start (unix seconds)
        #[arg(long)]
        since: i64,

        /// Window end (unix seconds), normally the resolution's close time
        #[arg(long)]
        until: i64,

        /// Override the configured User-Agent sent to the API
        #[arg(long, env = "VOTEWATCH_USER_AGENT")]
        user_agent: Option<String>,
    },

    /// Inspect and validate the config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Tick { .. } | Commands::Backfill { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Tick {
            chambers,
            user_agent,
        } => cmd::tick::run(&root, &chambers, user_agent, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Show { resolution, voters } => {
            cmd::show::run(&root, &resolution, voters, cli.json)
        }
        Commands::Backfill {
            resolution,
            since,
            until,
            user_agent,
        } => cmd::backfill::run(&root, &resolution, since, until, user_agent, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
