use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use plano_core::error::Result;
use plano_core::log;
use plano_core::types::now_unix;
use plano_llm::provider::LlmProvider;
use plano_retrieval::client::RetrievalClient;
use plano_store::Store;
use plano_telegram::bot::TelegramBot;

use crate::clock::{due_jobs, Job, LocalStamp};
use crate::notify;

/// Interval between schedule checks. Short enough to never skip a minute.
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Minimal generation request used to confirm the LLM backend is alive.
const PROBE_PROMPT: &str = "Say 'OK' in one word";

/// Background scheduler for the three timed jobs: weekly digest, daily
/// reminder, and keep-alive probe.
///
/// Each run is a pure function of stored state and the current local time;
/// nothing carries over between runs except the minute guard that stops a
/// job from firing twice within the same minute.
pub struct Scheduler<L> {
    store: Arc<Store>,
    retrieval: RetrievalClient,
    llm: L,
    bot: TelegramBot,
    /// Chat that receives keep-alive summaries and alerts.
    ops_chat_id: String,
    tz_offset: i32,
    keepalive_days: i64,
    check_interval: Duration,
}

impl<L: LlmProvider> Scheduler<L> {
    pub fn new(
        store: Arc<Store>,
        retrieval: RetrievalClient,
        llm: L,
        bot: TelegramBot,
        ops_chat_id: String,
        tz_offset: i32,
        keepalive_days: i64,
    ) -> Self {
        Self {
            store,
            retrieval,
            llm,
            bot,
            ops_chat_id,
            tz_offset,
            keepalive_days,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Main loop. Runs indefinitely; a failing job never kills the loop.
    pub async fn run(&self) -> Result<()> {
        log!(
            "[scheduler] started (interval {:?}, UTC{:+})",
            self.check_interval,
            self.tz_offset
        );

        let mut last_minute: Option<i64> = None;

        loop {
            let stamp = LocalStamp::from_unix(now_unix(), self.tz_offset);
            let key = stamp.minute_key();

            if last_minute != Some(key) {
                last_minute = Some(key);
                for job in due_jobs(&stamp, self.keepalive_days) {
                    match job {
                        Job::WeeklyDigest => self.run_weekly().await,
                        Job::DailyReminder(hour) => self.run_daily(hour).await,
                        Job::KeepAlive => self.run_keepalive().await,
                    }
                }
            }

            tokio::time::sleep(self.check_interval).await;
        }
    }

    /// Weekly digest: one message per notifiable user. A user failure is
    /// recorded and the batch continues.
    async fn run_weekly(&self) {
        log!("[weekly] digest run started");

        let users = match self.store.list_profiles().await {
            Ok(users) => users,
            Err(e) => {
                log!("[weekly] profile enumeration failed: {e}");
                return;
            }
        };

        let mut failed: Vec<String> = Vec::new();
        for user in users.iter().filter(|u| u.is_notifiable()) {
            if let Err(e) = self.weekly_for_user(&user.chat_id).await {
                log!("[weekly] user {} failed: {e}", user.chat_id);
                failed.push(user.chat_id.clone());
            }
        }

        if failed.is_empty() {
            log!("[weekly] digest run completed ({} profile(s))", users.len());
        } else {
            log!(
                "[weekly] digest run completed, {} user(s) failed: {}",
                failed.len(),
                failed.join(", ")
            );
        }
    }

    async fn weekly_for_user(&self, chat_id: &str) -> Result<()> {
        let plans = self.store.pending_plans(chat_id, 5).await?;
        let message = notify::weekly_message(&plans);
        self.bot.send_message(chat_id, &message).await
    }

    /// Daily reminder for the given local hour. Only users whose reminder
    /// slots include this hour are considered.
    async fn run_daily(&self, hour: u32) {
        log!("[daily] reminder run for {hour:02}:00");

        let users = match self.store.list_profiles().await {
            Ok(users) => users,
            Err(e) => {
                log!("[daily] profile enumeration failed: {e}");
                return;
            }
        };

        let mut failed: Vec<String> = Vec::new();
        for user in users.iter().filter(|u| u.is_notifiable()) {
            if !notify::should_remind(user, hour) {
                continue;
            }
            if let Err(e) = self.daily_for_user(&user.chat_id, hour).await {
                log!("[daily] user {} failed: {e}", user.chat_id);
                failed.push(user.chat_id.clone());
            }
        }

        if failed.is_empty() {
            log!("[daily] reminder run completed");
        } else {
            log!(
                "[daily] reminder run completed, {} user(s) failed: {}",
                failed.len(),
                failed.join(", ")
            );
        }
    }

    async fn daily_for_user(&self, chat_id: &str, hour: u32) -> Result<()> {
        let plans = self.store.active_approved_plans(chat_id, 3).await?;
        match notify::daily_message(hour, &plans) {
            Some(message) => self.bot.send_message(chat_id, &message).await,
            // No active plans outside the morning slot: stay silent.
            None => Ok(()),
        }
    }

    /// Keep-alive: probe all three backends in order, then report to the ops
    /// chat. The first failing probe aborts the rest of the sequence.
    async fn run_keepalive(&self) {
        log!("[keepalive] probing backends");

        let result = run_probes(
            self.store.ping(),
            self.retrieval.probe(),
            async { self.llm.generate(PROBE_PROMPT).await.map(|_| ()) },
        )
        .await;

        match result {
            Ok(()) => {
                log!("[keepalive] all backends healthy");
                if let Err(e) = self
                    .bot
                    .send_message(&self.ops_chat_id, notify::ALL_OPERATIONAL)
                    .await
                {
                    log!("[keepalive] status report send failed: {e}");
                }
            }
            Err(e) => {
                log!("[keepalive] probe failed: {e}");
                let alert = notify::keepalive_alert(&e.to_string());
                if let Err(send_err) = self.bot.send_message(&self.ops_chat_id, &alert).await {
                    log!("[keepalive] alert send failed: {send_err}");
                }
            }
        }
    }
}

/// Await the three probes in order; a failure short-circuits so later
/// backends are never touched in that run.
async fn run_probes(
    database: impl Future<Output = Result<()>>,
    vector: impl Future<Output = Result<()>>,
    llm: impl Future<Output = Result<()>>,
) -> Result<()> {
    database.await?;
    vector.await?;
    llm.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plano_core::error::PlanoError;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn probes_run_in_order_when_healthy() {
        let touched = AtomicBool::new(false);
        let result = run_probes(
            async { Ok(()) },
            async { Ok(()) },
            async {
                touched.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;
        assert!(result.is_ok());
        assert!(touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn vector_failure_skips_llm_probe() {
        let llm_touched = AtomicBool::new(false);
        let result = run_probes(
            async { Ok(()) },
            async { Err(PlanoError::Retrieval("connection refused".to_string())) },
            async {
                llm_touched.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;
        assert!(matches!(result, Err(PlanoError::Retrieval(_))));
        assert!(!llm_touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn database_failure_skips_everything_else() {
        let vector_touched = AtomicBool::new(false);
        let result = run_probes(
            async { Err(PlanoError::Database("ping failed".to_string())) },
            async {
                vector_touched.store(true, Ordering::SeqCst);
                Ok(())
            },
            async { Ok(()) },
        )
        .await;
        assert!(matches!(result, Err(PlanoError::Database(_))));
        assert!(!vector_touched.load(Ordering::SeqCst));
    }
}
