use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use serde_json::json;

use plano_core::error::{PlanoError, Result};
use plano_core::log;
use plano_llm::provider::{EmbeddingProvider, LlmProvider};
use plano_telegram::types::Update;

use crate::router::Router;

/// Webhook acknowledgments are always HTTP 200, even for malformed payloads
/// or internal failures — a non-200 would make Telegram redeliver the update
/// and the user would get duplicate replies. Errors go into the JSON body.
async fn telegram_webhook<L, E>(
    State(router): State<Arc<Router<L, E>>>,
    body: String,
) -> Json<serde_json::Value>
where
    L: LlmProvider,
    E: EmbeddingProvider,
{
    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            log!("[webhook] unparseable payload, acknowledging anyway: {e}");
            return Json(json!({ "ok": true }));
        }
    };

    match router.handle_update(update).await {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => {
            log!("[webhook] internal error: {e}");
            Json(json!({ "ok": false, "error": e.to_string() }))
        }
    }
}

/// Bind and run the webhook server. Runs until the process exits.
pub async fn serve<L, E>(port: u16, router: Arc<Router<L, E>>) -> Result<()>
where
    L: LlmProvider + 'static,
    E: EmbeddingProvider + 'static,
{
    let app = axum::Router::new()
        .route("/telegram", post(telegram_webhook::<L, E>))
        .with_state(router);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| PlanoError::Server(format!("failed to bind port {port}: {e}")))?;

    log!("[webhook] listening on 0.0.0.0:{port}");

    axum::serve(listener, app)
        .await
        .map_err(|e| PlanoError::Server(format!("webhook server error: {e}")))?;

    Ok(())
}
