//! intent-runtime - poll editing from the terminal
//!
//! Reads chat messages on stdin, detects the intended edit and prints the
//! resulting poll. `INTENT_CONFIG` points at an optional TOML file; the first
//! argument picks the poll type (`date` or `form`).

use intent_runtime::{apply_intent, DetectOptions, IntentService, RuntimeConfig};
use poll_rs::{Poll, PollType};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("INTENT_CONFIG").ok().map(PathBuf::from);
    let config = RuntimeConfig::load(config_path.as_deref())?;

    poll_rs::logging::init(&config.logging);
    info!("🚀 Starting intent-runtime...");

    let poll_type = match std::env::args().nth(1).as_deref() {
        Some("form") => PollType::Form,
        _ => PollType::Date,
    };

    let service = IntentService::from_config(&config)?;
    let options = DetectOptions::from(&config.intent);
    info!(
        "✅ {} strategies registered, AI fallback {}",
        service.registry().len(),
        if options.use_ai { "enabled" } else { "disabled" }
    );

    let mut poll = Arc::new(Poll::new(poll_type, "Nouveau sondage"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(intent) = service.detect_intent(&line, &poll, &options).await else {
            println!("Je n'ai pas compris la modification demandée.");
            continue;
        };

        if !intent.meets(config.intent.min_confidence) {
            warn!(
                "Ignoring {:?} intent below confidence threshold ({:.2} < {:.2})",
                intent.strategy, intent.confidence, config.intent.min_confidence
            );
            continue;
        }

        if let Some(explanation) = &intent.explanation {
            println!("{}", explanation);
        }

        let previous = Some(poll.clone());
        let reduction = apply_intent(previous.clone(), &intent);
        if reduction.is_same_as(&previous) {
            println!("(aucun changement)");
            continue;
        }

        if let Some(hint) = &reduction.hint {
            println!("{}", serde_json::to_string(hint)?);
        }
        if let Some(next) = reduction.state {
            poll = next;
        }
        println!("{}", serde_json::to_string_pretty(poll.as_ref())?);
    }

    Ok(())
}
