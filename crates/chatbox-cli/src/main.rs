//! chatbox CLI: Terminal chat client for a text chat endpoint

use chatbox_engine::{ChatClient, Config, Conversation, ExchangeOutcome, HttpChatClient};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Chat with an AI endpoint from the terminal
#[derive(Parser)]
#[command(name = "chatbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "chatbox.json")]
    config: PathBuf,

    /// Base URL of the chat backend (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Percent-encode the message in the query string
    #[arg(long)]
    encode_query: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat view (default when no command specified)
    Tui,

    /// Send one message and print the reply
    Ask {
        /// Message to send
        message: String,

        /// Output the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

/// Log file used while the terminal is owned by the chat view.
const LOG_FILE: &str = "chatbox.log";

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => init_file_logging(cli.debug),
        Some(Commands::Ask { .. }) => init_stderr_logging(cli.debug),
        Some(Commands::Config) => {}
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            let client: Arc<dyn ChatClient> = Arc::new(HttpChatClient::from_config(&config));
            let rt = runtime();
            if let Err(e) = rt.block_on(chatbox_tui::run_tui(&config, client)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { message, json }) => {
            let rt = runtime();
            let code = rt.block_on(cmd_ask(&config, message, json));
            std::process::exit(code);
        }
        Some(Commands::Config) => {
            cmd_config(&config);
        }
    }
}

/// Load the config file (if present) and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, chatbox_engine::ConfigError> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(endpoint) = &cli.endpoint {
        config.base_url.clone_from(endpoint);
    }
    if cli.encode_query {
        config.encode_query = true;
    }
    debug!(path = %cli.config.display(), ?config, "configuration loaded");
    Ok(config)
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    let default = if debug { "info,chatbox=debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_stderr_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file in the temp dir so output does not corrupt the screen.
fn init_file_logging(debug: bool) {
    let path = std::env::temp_dir().join(LOG_FILE);
    match open_log_file(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(debug))
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        Err(e) => {
            eprintln!("Warning: logging disabled, cannot open {}: {e}", path.display());
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

/// Run one exchange and print the reply. Returns the process exit code.
async fn cmd_ask(config: &Config, message: String, json: bool) -> i32 {
    let client = HttpChatClient::from_config(config);
    let mut conversation = Conversation::new();
    conversation.update_draft(message);

    match conversation.exchange(&client).await {
        None => {
            eprintln!("Error: message is empty");
            1
        }
        Some(ExchangeOutcome::Failed(e)) => {
            eprintln!("Error: {e}");
            1
        }
        Some(ExchangeOutcome::Replied { .. }) => {
            let Some(reply) = conversation.log().last() else {
                return 1;
            };
            if json {
                match serde_json::to_string_pretty(reply) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return 1;
                    }
                }
            } else {
                println!("{}", reply.text());
                if let Some(label) = reply.elapsed_label() {
                    println!("({label})");
                }
            }
            0
        }
    }
}

fn cmd_config(config: &Config) {
    match serde_json::to_string_pretty(config) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
