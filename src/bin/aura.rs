//! AURA command line
//!
//! Usage: cargo r --bin aura -- <command>
//!
//! Classification and mock replies work offline. `chat` uses the configured
//! completion service when an API key is set and falls back to mock replies
//! otherwise. Conversations live in AURA_DATA_FILE.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use aura_insight::ai_service::{detect_conversation_type, detect_expertise_level};
use aura_insight::app_config::AppConfig;
use aura_insight::{
    build_engine, classify_emotion, classify_topic, derive_summary, mock_reply, summarize,
    ReplyContext,
};

#[derive(Parser)]
#[command(name = "aura")]
#[command(about = "AURA conversation insight tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the emotional tone and topic of a message
    Classify {
        text: String,

        /// Use this stored conversation as recent history
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Generate a mock reply without calling any model
    Reply {
        text: String,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Send a message and store the exchange
    Chat {
        text: String,

        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// List stored conversations
    List,

    /// Print one conversation as JSON
    Show { id: String },

    /// Print insights and summary for a conversation
    Insights { id: String },

    /// Delete one conversation
    Delete { id: String },

    /// Delete every stored conversation
    Clear,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to encode output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Classify { text, conversation } => {
            let history = match conversation {
                Some(id) => {
                    let engine = build_engine(&config)?;
                    engine
                        .store()
                        .get(&id)?
                        .with_context(|| format!("Conversation {id} not found"))?
                        .history
                }
                None => Vec::new(),
            };
            print_json(&serde_json::json!({
                "emotion": classify_emotion(&text, &history),
                "topic": classify_topic(&text, &history),
                "conversationType": detect_conversation_type(&text),
            }))?;
        }

        Commands::Reply { text, seed } => {
            let mut rng = match seed.or(config.mock_seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let context = ReplyContext {
                conversation_type: detect_conversation_type(&text),
                expertise_level: detect_expertise_level(&text),
                emotional_tone: classify_emotion(&text, &[]).emotion,
            };
            print_json(&mock_reply(&text, &context, &mut rng))?;
        }

        Commands::Chat { text, conversation } => {
            let engine = build_engine(&config)?;
            let turn = engine.send_message(conversation.as_deref(), &text).await?;
            println!("[{}] {}", turn.conversation.id, turn.conversation.title);
            println!(
                "({} / {}{})",
                turn.emotion.emotion.as_str(),
                turn.topic.primary_topic.as_str(),
                if turn.is_mock { ", mock" } else { "" }
            );
            println!("{}", turn.reply.content);
        }

        Commands::List => {
            let engine = build_engine(&config)?;
            for conversation in engine.store().list()? {
                println!(
                    "{}  {}  {} messages  {}",
                    conversation.id,
                    conversation.last_active.format("%Y-%m-%d %H:%M"),
                    conversation.history.len(),
                    conversation.title
                );
            }
        }

        Commands::Show { id } => {
            let engine = build_engine(&config)?;
            let conversation = engine
                .store()
                .get(&id)?
                .with_context(|| format!("Conversation {id} not found"))?;
            print_json(&conversation)?;
        }

        Commands::Insights { id } => {
            let engine = build_engine(&config)?;
            let conversation = engine
                .store()
                .get(&id)?
                .with_context(|| format!("Conversation {id} not found"))?;
            print_json(&serde_json::json!({
                "insights": summarize(&conversation.history),
                "summary": derive_summary(&conversation.history),
            }))?;
        }

        Commands::Delete { id } => {
            let engine = build_engine(&config)?;
            engine.store().delete(&id)?;
            println!("Deleted {id}");
        }

        Commands::Clear => {
            let engine = build_engine(&config)?;
            let deleted = engine.store().clear_all()?;
            println!("Deleted {deleted} conversations");
        }
    }

    Ok(())
}
