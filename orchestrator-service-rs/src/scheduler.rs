// orchestrator-service-rs/src/scheduler.rs
// Delayed proactive follow-ups for high-risk commitments. Tasks are tracked so
// shutdown can cancel the ones still waiting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::notifier::Notifier;

pub fn follow_up_text(commitment: &str) -> String {
    format!("🔔 Accountability check-in: {}", commitment)
}

pub struct FollowUpScheduler {
    notifier: Arc<dyn Notifier>,
    delay: Duration,
    tasks: Mutex<JoinSet<()>>,
}

impl FollowUpScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, delay: Duration) -> Self {
        Self {
            notifier,
            delay,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub async fn schedule(&self, user_id: &str, chat_id: Option<String>, commitment: &str) {
        let notifier = Arc::clone(&self.notifier);
        let delay = self.delay;
        let text = follow_up_text(commitment);
        let user = user_id.to_string();

        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.send(&text, chat_id.as_deref()).await;
            tracing::info!(user_id = %user, "follow_up_sent");
        });
        tracing::info!(user_id, delay_secs = delay.as_secs(), "follow_up_scheduled");
    }

    /// Follow-ups that have not fired yet.
    pub async fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Cancel every follow-up still waiting and wait for the tasks to wind down.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        let cancelled = tasks.len();
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        tracing::info!(cancelled, "follow_up_scheduler_stopped");
    }
}
