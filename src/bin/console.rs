//! Text console for the voice agent
//!
//! Reads one utterance per line from stdin and prints the agent's reply.
//! Logs go to stderr so replies stay readable.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voice_agent::agent::Agent;
use voice_agent::config::Config;
use voice_agent::dialogue::SystemClock;
use voice_agent::llm::build_service;

const SESSION_ID: &str = "console";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "voice_agent=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let llm = config.llm.as_ref().and_then(build_service);
    let agent = Agent::new(llm, Arc::new(SystemClock));
    agent.start(SESSION_ID).await;

    println!("Voice agent console. Say \"goodbye\" to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let outcome = agent.handle_turn(SESSION_ID, &line).await;
        println!("Agent: {}", outcome.reply);

        if outcome.should_exit {
            break;
        }
    }

    Ok(())
}
