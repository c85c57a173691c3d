//! Chat command

use super::Config;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use futures_util::StreamExt;
use schemars::JsonSchema;
use serde::Deserialize;
use std::io::{BufRead, Write};
use ullm::{ChatRequest, ChatResponse, Message, Registry, Request, Tool};

/// Chat command arguments
#[derive(Debug, Args)]
pub struct ChatCmd {
    /// The model to chat with, defaults to the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Offer the built-in tools to the model
    #[arg(short, long)]
    pub tools: bool,

    /// The message to send (if empty, starts interactive mode)
    pub message: Option<String>,
}

/// Parameters for the get_time tool
#[derive(JsonSchema, Deserialize)]
struct GetTimeParams {
    /// If returns UNIX timestamp instead
    #[serde(default)]
    timestamp: bool,
}

fn get_time_tool() -> Tool {
    Tool::typed("get_time", |params: GetTimeParams| async move {
        let now = Utc::now();
        let time = if params.timestamp {
            now.timestamp().to_string()
        } else {
            now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
        };
        Ok(Some(time))
    })
    .description("Gets the current UTC time in ISO 8601 format.")
}

impl ChatCmd {
    /// Run the chat command
    pub async fn run(&self, stream: bool) -> Result<()> {
        let config = Config::load()?;
        let model = self.model.as_deref().unwrap_or(&config.model);
        let registry = config.registry(model)?;

        let tools = if self.tools {
            vec![get_time_tool()]
        } else {
            Vec::new()
        };
        let mut request = ChatRequest::new(
            model,
            vec![Message::system("You are a helpful assistant.")],
        )
        .with_tools(tools);

        if let Some(message) = &self.message {
            Self::send(&registry, &request.appending([Message::user(message)]), stream).await?;
            return Ok(());
        }

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("> ");
            stdout.flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                break;
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }
            if input == "/quit" || input == "/exit" {
                break;
            }

            request = request.appending([Message::user(input)]);
            let reply = Self::send(&registry, &request, stream).await?;
            request = request.appending([reply]);
        }

        Ok(())
    }

    /// Send one exchange, print it, and return the assistant turn.
    async fn send(registry: &Registry, request: &ChatRequest, stream: bool) -> Result<Message> {
        if !stream {
            let response = registry.perform(request.clone()).await?;
            if let Some(reasoning) = response.reasoning() {
                println!("REASONING\n{reasoning}\n\nCONTENT");
            }
            println!("{}", response.content());
            return Ok(Message::assistant(response.content()));
        }

        let mut reasoning = false;
        let mut content = String::new();
        let mut partials = std::pin::pin!(registry.stream(request.clone()));
        while let Some(partial) = partials.next().await {
            let partial: ChatResponse = partial?;
            if let Some(text) = partial.reasoning().filter(|t| !t.is_empty()) {
                if !reasoning {
                    println!("REASONING");
                    reasoning = true;
                }
                print!("{text}");
            }

            let text = partial.content();
            if !text.is_empty() {
                if reasoning {
                    println!("\n\nCONTENT");
                    reasoning = false;
                }
                print!("{text}");
                content.push_str(text);
            }
            std::io::stdout().flush()?;
        }
        println!();
        Ok(Message::assistant(content))
    }
}
