//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for streamchat
#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(author, version, about = "Streaming LLM chat with an animated terminal transcript")]
#[command(long_about = r#"
streamchat streams replies from a generation engine (Ollama, or the offline
scripted engine) over Server-Sent Events and reveals them one character at
a time.

Run a server, then chat against it:
  streamchat serve
  streamchat chat --model llama3

Or skip the server and run the engines in-process:
  streamchat --local --service scripted ask "Hello"

Configuration files are loaded from (in priority order):
1. STREAMCHAT_* environment variables (e.g. STREAMCHAT_CLIENT__MODEL)
2. --config <path>     Explicit config file
3. ./streamchat.toml   Project-level config
4. ~/.config/streamchat/config.toml   Global config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Generation server base URL (overrides client.server_url)
    #[arg(long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Engine service to use (e.g. ollama, scripted)
    #[arg(short, long, value_name = "SERVICE", global = true)]
    pub service: Option<String>,

    /// Model to request from the engine
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Print replies as they arrive instead of one character per tick
    #[arg(long, global = true)]
    pub no_animation: bool,

    /// Run the engines in-process instead of connecting to a server
    #[arg(long, global = true)]
    pub local: bool,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the generation server
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Also write daily-rotated log files to this directory
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Interactive chat (default)
    Chat {
        /// Conversation identifier (overrides client.conversation_id)
        #[arg(long, value_name = "ID")]
        conversation: Option<String>,
    },

    /// Generate a single reply and exit
    Ask {
        /// The prompt to send
        prompt: String,
    },

    /// List the models offered by an engine
    Models,
}

impl Cli {
    /// The subcommand to run; interactive chat when none is given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Chat { conversation: None })
    }
}
