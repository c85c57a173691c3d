//! Command line chat client for ullm backends

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
pub use {chat::ChatCmd, config::Config};

mod chat;
mod config;

/// Crates whose logs `-v` turns up.
const TARGETS: [&str; 3] = ["ucli", "ullm_core", "ullm_openai"];

/// Chat with any configured LLM backend
#[derive(Debug, Parser)]
#[command(name = "ullm", version, about)]
pub struct App {
    /// Stream responses as they are generated
    #[arg(short, long, global = true)]
    pub stream: bool,

    /// Verbosity level (-v for ullm logs, -vv for raw stream units)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with a model, once or interactively
    Chat(ChatCmd),

    /// Write a default configuration file
    Generate(GenerateCmd),
}

/// Generate command arguments
#[derive(Debug, Args)]
pub struct GenerateCmd {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

impl App {
    /// Install the tracing subscriber; `RUST_LOG` wins over `-v`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives(self.verbose)));

        fmt()
            .without_time()
            .with_env_filter(filter)
            .with_target(self.verbose != 0)
            .init();
    }

    /// Run the selected command.
    pub async fn run(self) -> Result<()> {
        match &self.command {
            Command::Chat(chat) => chat.run(self.stream).await,
            Command::Generate(generate) => {
                Config::default().generate(Config::path(), generate.force)
            }
        }
    }
}

/// Filter directives for a `-v` count.
///
/// Dependencies stay at `warn` until `-vvv`.
pub fn directives(verbose: u8) -> String {
    let level = match verbose {
        0 => return "warn,ucli=info".to_owned(),
        1 => "debug",
        2 => "trace",
        3 => return "debug".to_owned(),
        _ => return "trace".to_owned(),
    };
    let mut directives = String::from("warn");
    for target in TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}
