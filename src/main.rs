use std::path::Path;
use std::sync::Arc;

use plano_core::config::{Config, DatabaseConfig};
use plano_core::error::{PlanoError, Result};
use plano_llm::gemini::{GeminiEmbedding, GeminiLlm};
use plano_retrieval::client::RetrievalClient;
use plano_scheduler::Scheduler;
use plano_store::Store;
use plano_telegram::bot::TelegramBot;
use plano_webhook::router::Router;

#[tokio::main]
async fn main() {
    let config_path =
        std::env::var("PLANO_CONFIG").unwrap_or_else(|_| "plano.toml".to_string());

    let config = Config::load(Path::new(&config_path)).unwrap_or_else(|e| {
        eprintln!("fatal: failed to load config: {e}");
        std::process::exit(1);
    });

    eprintln!("plano: starting...");

    // One database handle, shared read-only by both tasks. Missing secrets
    // for the remote collaborators are not checked here; those calls fail
    // lazily and are handled at their call sites.
    let db = open_db(&config.database).await.unwrap_or_else(|e| {
        eprintln!("fatal: failed to open database: {e}");
        std::process::exit(1);
    });
    let store = Arc::new(Store::new(db));
    if let Err(e) = store.init().await {
        eprintln!("fatal: failed to initialize tables: {e}");
        std::process::exit(1);
    }

    let tz = config.schedule.timezone_offset;

    let router = Arc::new(Router::new(
        Arc::clone(&store),
        RetrievalClient::new(
            config.retrieval.url.clone(),
            config.retrieval.api_key.clone(),
        ),
        GeminiLlm::new(config.llm.api_key.clone(), config.llm.model.clone()),
        GeminiEmbedding::new(
            config.embedding.api_key.clone(),
            config.embedding.model.clone(),
            config.embedding.dimensions,
        ),
        TelegramBot::new(config.telegram.token.clone()),
        config.retrieval.match_threshold,
        config.retrieval.match_count,
        tz,
    ));

    // Separate bot and client instances for the scheduler.
    let scheduler = Scheduler::new(
        Arc::clone(&store),
        RetrievalClient::new(
            config.retrieval.url.clone(),
            config.retrieval.api_key.clone(),
        ),
        GeminiLlm::new(config.llm.api_key.clone(), config.llm.model.clone()),
        TelegramBot::new(config.telegram.token.clone()),
        config.telegram.ops_chat_id.clone(),
        tz,
        config.schedule.keepalive_days,
    );

    tokio::select! {
        result = plano_webhook::server::serve(config.server.port, router) => {
            if let Err(e) = result {
                eprintln!("fatal: webhook server error: {e}");
                std::process::exit(1);
            }
        }
        result = scheduler.run() => {
            if let Err(e) = result {
                eprintln!("fatal: scheduler error: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Open the document database: Turso remote when configured, local file
/// otherwise.
async fn open_db(config: &DatabaseConfig) -> Result<libsql::Database> {
    if !config.turso_url.is_empty() {
        libsql::Builder::new_remote(config.turso_url.clone(), config.turso_token.clone())
            .build()
            .await
            .map_err(|e| PlanoError::Database(e.to_string()))
    } else {
        libsql::Builder::new_local(&config.path)
            .build()
            .await
            .map_err(|e| PlanoError::Database(e.to_string()))
    }
}
