mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mnemono",
    about = "Song-cycle planner: split a song's deadline into weighted stages and track progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./mnemono.yaml; missing file means defaults)
    #[arg(long, global = true, env = "MNEMONO_CONFIG")]
    config: Option<PathBuf>,

    /// State document (overrides `state_file` from the config)
    #[arg(long, global = true, env = "MNEMONO_STATE")]
    state: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new cycle
    New {
        /// Song name
        name: Vec<String>,

        /// Cycle length in days (default 30, minimum 7)
        #[arg(long, short = 'd')]
        days: Option<String>,

        /// Replace a cycle that is still in progress
        #[arg(long)]
        force: bool,
    },

    /// Show where today falls in the cycle
    Status,

    /// Mark a stage complete
    Done {
        #[arg(required = true)]
        stage: Vec<String>,
    },

    /// Preview how a cycle length would be split, without saving
    Plan {
        #[arg(long, short = 'd')]
        days: Option<String>,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the Telegram bot and the liveness server together
    Serve {
        /// HTTP port for the liveness endpoint
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Telegram bot token
        #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = Context::resolve(cli.config.as_deref(), cli.state.as_deref()).and_then(|ctx| {
        match cli.command {
            Commands::New { name, days, force } => {
                cmd::new::run(&ctx, &name.join(" "), days.as_deref(), force, cli.json)
            }
            Commands::Status => cmd::status::run(&ctx, cli.json),
            Commands::Done { stage } => cmd::done::run(&ctx, &stage.join(" "), cli.json),
            Commands::Plan { days } => cmd::plan::run(&ctx, days.as_deref(), cli.json),
            Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand, cli.json),
            Commands::Serve { port, token } => cmd::serve::run(ctx, port, token),
        }
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
