use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_chat::config::Config;
use agent_chat::transport::cli;

#[derive(Parser)]
#[command(name = "agent-chat")]
#[command(author, version, about = "Terminal chat client for a multi-agent backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides config and AGENT_CHAT_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// User identifier sent with every request
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (TUI); the default when no command is given
    Chat {
        /// Initial message to send
        message: Option<String>,
    },

    /// List the agents that can be mentioned
    Agents {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Send one message and print the reply
    Ask {
        /// Message text
        message: String,
    },

    /// Send feedback for an agent run
    Feedback {
        /// Score given to the run
        #[arg(short, long)]
        score: f64,

        /// Free-form comment
        #[arg(short, long)]
        text: Option<String>,

        /// Invocation the feedback refers to (generated when omitted)
        #[arg(long)]
        invocation_id: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    config.apply_overrides(cli.api_base.clone(), cli.user_id.clone());
    Ok(config)
}

/// Logging goes to a file while the TUI owns the terminal, stderr otherwise
fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let filter = if verbose {
        "agent_chat=debug"
    } else {
        "agent_chat=info"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if to_file {
        let path = Config::log_dir()?.join("agent-chat.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.as_ref();
    let is_chat = matches!(command, None | Some(Commands::Chat { .. }));

    init_logging(cli.verbose, is_chat)?;
    let config = load_config(&cli)?;

    match cli.command {
        None => cli::run_tui_chat(None, &config).await?,
        Some(Commands::Chat { message }) => cli::run_tui_chat(message, &config).await?,
        Some(Commands::Agents { format }) => cli::run_agents(&config, &format).await?,
        Some(Commands::Ask { message }) => cli::run_ask(&config, &message).await?,
        Some(Commands::Feedback {
            score,
            text,
            invocation_id,
        }) => cli::run_feedback(&config, score, text, invocation_id).await?,
    }

    Ok(())
}
