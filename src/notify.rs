use crate::domain::TaskStatus;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Emitted after each execution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub campaign_id: Uuid,
    pub task_id: Uuid,
    pub status: TaskStatus,
}

/// Best-effort status broadcast. Implementations swallow their own delivery
/// failures; the engine's correctness never depends on a notification
/// arriving.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn status_changed(&self, event: StatusEvent);
}

/// Default sink: structured log lines only.
pub struct LogNotifier;

#[async_trait]
impl StatusNotifier for LogNotifier {
    async fn status_changed(&self, event: StatusEvent) {
        info!(
            campaign = %event.campaign_id,
            task = %event.task_id,
            status = event.status.as_str(),
            "task status changed"
        );
    }
}
