use std::env;

use serde_json::{json, Map, Value};
use tutor_core::{BackendKind, PartitionedStore, Profile, Record, TutorConfig};
use tutor_records::Feature;

const USAGE: &str = "usage: tutor <owner|prefs|conversations|assignments|writing|active|visits|mark-visited|reset-visit|clear-chat>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TutorConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter(&config))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    if let Ok(path) = env::var("TUTOR_DB_PATH") {
        config.storage.path = Some(path);
    }
    if let Some(backend) = parse_backend("TUTOR_BACKEND") {
        config.storage.backend = backend;
    }
    tracing::debug!(backend = ?config.storage.backend, "opening profile");

    let profile = Profile::open(&config);
    let output = match command.as_str() {
        "owner" => json!(profile.owner_id()),
        "prefs" => serde_json::to_value(profile.preferences().get())?,
        "conversations" => dump(&profile.conversations())?,
        "assignments" => dump(&profile.assignments())?,
        "writing" => dump(&profile.writing())?,
        "active" => json!(profile.active_conversation().get()),
        "visits" => {
            let visits = profile.visits();
            let flags: Map<String, Value> = Feature::ALL
                .iter()
                .map(|feature| (feature.to_string(), json!(visits.has_visited(*feature))))
                .collect();
            Value::Object(flags)
        }
        "mark-visited" | "reset-visit" => {
            let Some(label) = args.next() else {
                eprintln!("usage: tutor {command} <chat|dictionary|assignments>");
                std::process::exit(2);
            };
            let feature: Feature = label.parse()?;
            let outcome = if command == "mark-visited" {
                profile.visits().mark_visited(feature)
            } else {
                profile.visits().reset(feature)
            };
            json!({ "feature": feature.as_str(), "outcome": format!("{outcome:?}") })
        }
        "clear-chat" => json!(format!("{:?}", profile.clear_chat_history())),
        other => {
            eprintln!("unknown command: {other}\n{USAGE}");
            std::process::exit(2);
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn dump<T: Record>(store: &PartitionedStore<T>) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "ownerId": store.owner_id(),
        "status": format!("{:?}", store.status()),
        "records": serde_json::to_value(store.records())?,
    }))
}

fn parse_backend(key: &str) -> Option<BackendKind> {
    let value = env::var(key).ok()?;
    let parsed = BackendKind::from_label(value.trim());
    if parsed.is_none() {
        tracing::warn!(%value, "ignoring unknown {key}");
    }
    parsed
}

fn tracing_filter(config: &TutorConfig) -> tracing_subscriber::EnvFilter {
    let explicit = env::var("TUTOR_LOG").or_else(|_| env::var("RUST_LOG")).ok();
    if let Some(filter) = explicit {
        return tracing_subscriber::EnvFilter::new(filter);
    }
    if config.debug_enabled() {
        return tracing_subscriber::EnvFilter::new("debug");
    }
    tracing_subscriber::EnvFilter::new("warn")
}
