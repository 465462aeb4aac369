//! wavescache - refresh, rank and summarize cached game-account progression.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wavescache_core::{
    ApiClient, CacheStore, Config, KeyringCredentialStore, RefreshOrchestrator, RemoteAccountClient,
    ScoringEngine, TokioPacer,
};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "WAVESCACHE_CONFIG";

/// Upper bound on ranking length.
const MAX_TOP_N: usize = 20;

const LOG_FILE_PREFIX: &str = "wavescache.log";

const USAGE: &str = "\
Usage: wavescache <command> [args]

Commands:
  bind <user>             Bind an account token to a user
  unbind <user>           Remove a user's bound account
  refresh <user> [name]   Refresh all entities, or one entity by name or id
  rank <user> [n]         Top n cached entities by composite score
  summary <user>          Score statistics over all cached entities
  list <user>             Cached entity list
  show <user> <name>      Cached detail of one entity, by name or id
  status <user>           Cache age and staleness";

/// Initialize the tracing subscriber for logging.
///
/// Returns the guard of the file writer, which must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config() -> Result<Config> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Config::load_from(&PathBuf::from(path)),
        None => Config::load(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_top_n(arg: Option<&str>, default: usize) -> Result<usize> {
    let n = match arg {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("Invalid count: {}", raw))?,
        None => default,
    };
    Ok(n.clamp(1, MAX_TOP_N))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config()?;
    let _guard = init_tracing(config.log_dir.as_deref());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, user_id) = match (args.first(), args.get(1)) {
        (Some(command), Some(user_id)) => (command.as_str(), user_id.as_str()),
        _ => {
            eprintln!("{}", USAGE);
            bail!("Missing command or user");
        }
    };
    let extra = args.get(2).map(String::as_str);

    let cache = Arc::new(CacheStore::new(config.cache_dir()?).context("Failed to open cache")?);
    let credentials = Arc::new(KeyringCredentialStore::default());

    info!(command = command, user_id = user_id, "wavescache starting");

    match command {
        "bind" => {
            let token = rpassword::prompt_password("Token: ")?;
            let token = token.trim();
            if token.is_empty() {
                bail!("Token must not be empty");
            }
            let client = ApiClient::new(&config)?;
            let account_id = client
                .resolve_account(token)
                .await
                .context("Token was rejected by the remote service")?;
            let account = credentials.store(user_id, &account_id, token)?;
            print_json(&json!({
                "user_id": account.user_id,
                "account_id": account.external_account_id,
                "bound_at": account.updated_at,
            }))
        }
        "unbind" => {
            credentials.delete(user_id)?;
            cache.clear_user(user_id)?;
            print_json(&json!({ "user_id": user_id, "unbound": true }))
        }
        "refresh" => {
            let client = Arc::new(ApiClient::new(&config)?);
            let orchestrator =
                RefreshOrchestrator::new(client, credentials, Arc::clone(&cache), Arc::new(TokioPacer))
                    .with_delays(config.settle_delay(), config.pacing_delay());

            let outcome = match extra {
                Some(name) => orchestrator.refresh_single(user_id, name).await?,
                None => orchestrator.refresh_all(user_id).await?,
            };
            print_json(&json!({
                "status": outcome.status(),
                "succeeded": outcome.succeeded_count(),
                "failed": outcome.failed_count(),
                "outcome": outcome,
            }))
        }
        "rank" => {
            let top_n = parse_top_n(extra, config.top_n)?;
            let engine = ScoringEngine::new(cache, config.weights);
            print_json(&engine.rank(user_id, top_n)?)
        }
        "summary" => {
            let engine = ScoringEngine::new(cache, config.weights);
            print_json(&engine.summarize(user_id)?)
        }
        "list" => print_json(&cache.query_entity_list(user_id)?),
        "show" => {
            let Some(name) = extra else {
                eprintln!("{}", USAGE);
                bail!("Missing entity name");
            };
            print_json(&cache.query_entity_detail(user_id, name)?)
        }
        "status" => {
            let snapshot = cache.load_account_snapshot(user_id);
            print_json(&json!({
                "user_id": user_id,
                "cached": snapshot.is_some(),
                "captured_at": snapshot.as_ref().map(|s| s.captured_at),
                "age_minutes": snapshot.as_ref().map(|s| s.age_minutes()),
                "entities": snapshot.as_ref().map(|s| s.data.entities.len()),
                "needs_refresh": cache.needs_refresh(user_id, config.cache_max_age()),
            }))
        }
        other => {
            eprintln!("{}", USAGE);
            bail!("Unknown command: {}", other)
        }
    }
}
