//! Terminal chat against the wealth advisor agent.
//!
//! Runs a single local session; type `exit` or `quit` to leave.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, Conversation, Message};
use agent_runtime::OllamaProvider;
use wealth_advisor::{AdvisorConfig, Backends, WEALTH_ADVISOR_PROMPT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let provider = Arc::new(OllamaProvider::from_env()?);
    let backends = Backends::connect(&AdvisorConfig::from_env()).await;

    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".into());
    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(backends.tool_registry())
        .system_prompt(WEALTH_ADVISOR_PROMPT)
        .model(model)
        .build()?;

    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Wealth advisor ready. Type 'exit' to quit.");
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        conversation.push(Message::user(input));
        match agent.run(&mut conversation).await {
            Ok(answer) => println!("Advisor: {answer}\n"),
            Err(e) => {
                tracing::error!(error = %e, "Agent error");
                println!("Advisor: {}\n", e.user_message());
            }
        }
    }

    Ok(())
}
