use std::sync::Arc;

use plano_core::error::Result;
use plano_core::log;
use plano_llm::provider::{EmbeddingProvider, LlmProvider};
use plano_retrieval::client::RetrievalClient;
use plano_store::Store;
use plano_telegram::bot::TelegramBot;
use plano_telegram::types::Update;

use crate::replies::{self, Command};

/// Routes one inbound webhook update to a reply.
///
/// Collaborator handles are constructed once at process start and shared
/// read-only; the router holds no state of its own between updates.
pub struct Router<L, E> {
    store: Arc<Store>,
    retrieval: RetrievalClient,
    llm: L,
    embedder: E,
    bot: TelegramBot,
    match_threshold: f64,
    match_count: usize,
    tz_offset: i32,
}

impl<L: LlmProvider, E: EmbeddingProvider> Router<L, E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<Store>,
        retrieval: RetrievalClient,
        llm: L,
        embedder: E,
        bot: TelegramBot,
        match_threshold: f64,
        match_count: usize,
        tz_offset: i32,
    ) -> Self {
        Self {
            store,
            retrieval,
            llm,
            embedder,
            bot,
            match_threshold,
            match_count,
            tz_offset,
        }
    }

    /// Handle one webhook update end to end: log the message, produce exactly
    /// one reply, attempt exactly one send. Payloads without a text message
    /// are acknowledged and dropped.
    pub async fn handle_update(&self, update: Update) -> Result<()> {
        let Some(msg) = update.message else {
            log!("[webhook] update {} has no message, skipping", update.update_id);
            return Ok(());
        };

        let chat_id = msg.chat.id.to_string();
        let text = match msg.text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => {
                log!("[webhook] message without text from chat {chat_id}, skipping");
                return Ok(());
            }
        };

        log!("[recv] chat={chat_id} text=\"{}\"", truncate_for_log(text));

        // Append to the message log first. Best-effort — a failed write must
        // never block the reply.
        if let Err(e) = self.store.log_message(&chat_id, text).await {
            log!("[store] failed to log message from {chat_id}: {e}");
        }

        let reply = match Command::parse(text) {
            Some(Command::Start) => replies::ONBOARDING.to_string(),
            Some(Command::Help) => replies::HELP.to_string(),
            Some(Command::Plan) => self.plan_overview(&chat_id).await,
            Some(Command::Unknown) => replies::UNKNOWN_COMMAND.to_string(),
            None => self.answer_free_text(text).await,
        };

        match self.bot.send_message(&chat_id, &reply).await {
            Ok(()) => log!("[send] reply delivered to {chat_id}"),
            Err(e) => log!("[send] delivery to {chat_id} failed: {e}"),
        }

        Ok(())
    }

    /// `/plan` — list the 5 most recent approved plans. A store failure is
    /// converted into a fixed user-facing string here, never propagated.
    async fn plan_overview(&self, chat_id: &str) -> String {
        match self.store.recent_approved_plans(chat_id, 5).await {
            Ok(plans) if plans.is_empty() => replies::PLAN_EMPTY.to_string(),
            Ok(plans) => replies::render_plan_list(&plans, self.tz_offset),
            Err(e) => {
                log!("[plan] fetching plans for {chat_id} failed: {e}");
                replies::PLAN_FETCH_ERROR.to_string()
            }
        }
    }

    /// Free text — retrieve related notes (best-effort) and generate a reply.
    async fn answer_free_text(&self, text: &str) -> String {
        let context = match self.search_context(text).await {
            Ok(ctx) => {
                if ctx.is_empty() {
                    log!("[rag] no matches, answering without context");
                } else {
                    log!("[rag] context attached ({} chars)", ctx.len());
                }
                ctx
            }
            Err(e) => {
                log!("[rag] retrieval failed, answering without context: {e}");
                String::new()
            }
        };

        let prompt = replies::build_prompt(text, &context);
        match self.llm.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log!("[llm] generation failed: {e}");
                replies::APOLOGY.to_string()
            }
        }
    }

    /// Embed the query and run similarity search, returning the rendered
    /// context block (empty when nothing matches).
    async fn search_context(&self, query: &str) -> Result<String> {
        let embeddings = self.embedder.embed(&[query]).await?;
        let Some(embedding) = embeddings.first() else {
            return Ok(String::new());
        };

        let matches = self
            .retrieval
            .match_documents(embedding, self.match_threshold, self.match_count)
            .await?;

        Ok(replies::build_context(&matches))
    }
}

fn truncate_for_log(text: &str) -> &str {
    plano_core::time::truncate_chars(text, 80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plano_core::error::PlanoError;
    use std::future::Future;
    use std::sync::Mutex;

    /// Captures every prompt handed to it and answers with a fixed string.
    #[derive(Clone, Default)]
    struct RecordingLlm {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl LlmProvider for RecordingLlm {
        fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send {
            self.prompts.lock().unwrap().push(prompt.to_string());
            async { Ok("noted".to_string()) }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        fn embed(
            &self,
            _texts: &[&str],
        ) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send {
            async { Err(PlanoError::Embedding("backend unavailable".to_string())) }
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct EmptyEmbedder;

    impl EmbeddingProvider for EmptyEmbedder {
        fn embed(
            &self,
            _texts: &[&str],
        ) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send {
            async { Ok(Vec::new()) }
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    async fn test_router<E: EmbeddingProvider>(
        llm: RecordingLlm,
        embedder: E,
    ) -> Router<RecordingLlm, E> {
        let db = libsql::Builder::new_local(":memory:").build().await.unwrap();
        Router::new(
            Arc::new(Store::new(db)),
            RetrievalClient::new("http://localhost:1".to_string(), String::new()),
            llm,
            embedder,
            TelegramBot::new(String::new()),
            0.3,
            2,
            0,
        )
    }

    #[tokio::test]
    async fn embed_failure_falls_back_to_empty_context() {
        let llm = RecordingLlm::default();
        let router = test_router(llm.clone(), FailingEmbedder).await;

        let reply = router.answer_free_text("how do I start running?").await;

        assert_eq!(reply, "noted");
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context from saved notes:\n\n"));
        assert!(prompts[0].contains("User message: how do I start running?"));
    }

    #[tokio::test]
    async fn no_embeddings_still_prompts_with_empty_context() {
        let llm = RecordingLlm::default();
        let router = test_router(llm.clone(), EmptyEmbedder).await;

        let reply = router.answer_free_text("hello").await;

        assert_eq!(reply, "noted");
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context from saved notes:\n\n"));
    }
}
