mod emit;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use donebell_config::NotifierConfig;
use donebell_types::LogMode;

#[derive(Parser)]
#[command(name = "donebell", about = "Push notifications when the agent finishes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the plugin to a host over stdin/stdout
    Serve {
        /// Log mode (overrides config): verbose or silent
        #[arg(short, long)]
        mode: Option<LogMode>,

        /// Config file path (default: ~/.donebell/config.json5)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Dispatch a single event, e.g. from a shell hook
    Emit {
        /// Event type (e.g. "session.idle"), or "-" to read an event object from stdin
        event_type: String,

        /// Project directory (defaults to the current directory)
        #[arg(short, long)]
        directory: Option<String>,

        /// Project name (derived from the directory if omitted)
        #[arg(short, long)]
        project: Option<String>,

        /// Log mode (overrides config): verbose or silent
        #[arg(short, long)]
        mode: Option<LogMode>,

        /// Config file path (default: ~/.donebell/config.json5)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config {
        /// Config file path (default: ~/.donebell/config.json5)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // stdout belongs to the plugin protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { mode, config } => {
            let config = load_config(config.as_deref(), mode)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve::run_serve(config))?;
        }
        Commands::Emit {
            event_type,
            directory,
            project,
            mode,
            config,
        } => {
            let config = load_config(config.as_deref(), mode)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(emit::run_emit(config, event_type, directory, project))?;
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref(), None)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Resolve configuration: file, then `DONEBELL_MODE`, then the CLI flag.
fn load_config(path: Option<&Path>, mode: Option<LogMode>) -> anyhow::Result<NotifierConfig> {
    let mut config = match path {
        Some(path) => {
            let _ = dotenvy::dotenv();
            donebell_config::load_config_with_env(path)?
        }
        None => donebell_config::load_config()?,
    };

    if let Some(mode) = mode {
        config.mode = mode;
    }

    tracing::debug!(mode = %config.mode, program = %config.command.program, "Configuration loaded");
    Ok(config)
}
