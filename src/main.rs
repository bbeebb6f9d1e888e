//! Artifact Chat - Terminal front-end
//!
//! Plain lines are sent to the model. Commands:
//!
//! - `/structured [strategy] <prompt>` - ask for a fenced code block
//! - `/save [name]` - write the pending artifact
//! - `/clear` - forget the conversation
//! - `/quit` - exit

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use artifact_chat::adapters::{LocalArtifactStore, OpenAICompatibleService};
use artifact_chat::application::{
    ControllerConfig, ConversationController, ConversationError, SaveOutcome,
};
use artifact_chat::config::AppConfig;
use artifact_chat::domain::conversation::{ConversationState, DispatchPhase, PromptStrategy};

const HELP: &str = "\
Commands:
  /structured [standard|direct|role_based|markdown_friendly] <prompt>
  /save [name]
  /clear
  /quit";

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let service = match OpenAICompatibleService::new(config.completion.to_service_config()) {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "Failed to create completion service");
            std::process::exit(1);
        }
    };
    let store = LocalArtifactStore::new(&config.artifacts.directory);

    let controller = ConversationController::new(
        Arc::new(service),
        Arc::new(store),
        ControllerConfig::from(&config.conversation)
            .with_suggested_directory(&config.artifacts.directory),
    );

    println!(
        "Chatting with {} at {}. Type /help for commands.",
        config.completion.model, config.completion.base_url
    );

    if let Err(e) = run(&controller, &config).await {
        error!(error = %e, "Terminal input failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "artifact_chat=info".into());
    let json = std::env::var("ARTIFACT_CHAT_LOG_FORMAT").is_ok_and(|v| v == "json");

    // Logs go to stderr so they don't interleave with replies on stdout.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(controller: &ConversationController, config: &AppConfig) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{}", HELP),
            ("/clear", _) => {
                controller.clear_conversation();
                println!("Conversation cleared.");
            }
            ("/save", name) => {
                let name = match name.trim() {
                    "" => config.artifacts.file_name.as_str(),
                    given => given,
                };
                save(controller, name, &config.artifacts.extension).await;
            }
            ("/structured", rest) => {
                let (strategy, prompt) = parse_structured(rest);
                if prompt.is_empty() {
                    println!("Usage: /structured [strategy] <prompt>");
                    continue;
                }
                let result = controller
                    .request_structured_reply(prompt, strategy, &config.conversation.structured_tag)
                    .await
                    .map(Some);
                report(controller, result);
            }
            _ => {
                controller.stage_input(input);
                let result = controller.submit_pending_input().await;
                report(controller, result);
            }
        }
    }

    Ok(())
}

/// Splits an optional leading strategy name off the prompt.
fn parse_structured(rest: &str) -> (PromptStrategy, &str) {
    let rest = rest.trim();
    if let Some((first, prompt)) = rest.split_once(' ') {
        if let Ok(strategy) = first.parse::<PromptStrategy>() {
            return (strategy, prompt.trim());
        }
    }
    (PromptStrategy::default(), rest)
}

fn report(
    controller: &ConversationController,
    result: Result<Option<DispatchPhase>, ConversationError>,
) {
    match result {
        Ok(Some(_)) => print_reply(&controller.snapshot()),
        Ok(None) => {}
        Err(e) => println!("! {}", e),
    }
}

fn print_reply(state: &ConversationState) {
    let Some(entry) = state.history().iter().rev().find(|e| !e.is_from_user()) else {
        return;
    };

    println!("[{}] {}", entry.created_at().clock_label(), entry.text());
    if let Some(extraction) = entry.extraction() {
        if !extraction.code_blocks.is_empty() {
            println!("({} code block(s) found)", extraction.code_blocks.len());
        }
    }
    if state.show_save_prompt() {
        println!("An artifact is ready. Type /save [name] to write it.");
    }
}

async fn save(controller: &ConversationController, name: &str, extension: &str) {
    match controller.save_pending_artifact(name, extension).await {
        Ok(SaveOutcome::Saved(path)) => println!("Saved to {}", path.display()),
        Ok(SaveOutcome::Cancelled) => println!("Save cancelled."),
        Ok(SaveOutcome::Failed(message)) => {
            println!("! Save failed: {}", message);
            controller.dismiss_alert();
        }
        Err(e) => println!("! {}", e),
    }
}
