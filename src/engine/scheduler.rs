use super::controller::Controller;
use super::error::EngineError;
use crate::domain::{Campaign, CampaignStatus};
use crate::notify::{StatusEvent, StatusNotifier};
use crate::storage::Repositories;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    /// Bounds how many campaigns advance per cycle, not simultaneous
    /// execution: the selected campaigns are processed sequentially.
    pub max_concurrent_campaigns: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_concurrent_campaigns: 1,
        }
    }
}

/// The only driver of execution: polls for active campaigns and advances
/// each selected one by exactly one task step per cycle.
pub struct Scheduler {
    controller: Arc<Controller>,
    repos: Repositories,
    notifier: Arc<dyn StatusNotifier>,
    config: SchedulerConfig,
    shutdown: Notify,
    stopping: AtomicBool,
}

impl Scheduler {
    pub fn new(
        controller: Arc<Controller>,
        repos: Repositories,
        notifier: Arc<dyn StatusNotifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            controller,
            repos,
            notifier,
            config,
            shutdown: Notify::new(),
            stopping: AtomicBool::new(false),
        }
    }

    /// Poll until `shutdown` is called. Cancellation is observed both
    /// between campaigns and during the inter-cycle delay.
    pub async fn run(&self) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            cap = self.config.max_concurrent_campaigns,
            "scheduler started"
        );
        loop {
            if self.stopping.load(Ordering::SeqCst) {
                break;
            }
            self.run_cycle().await;
            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = self.shutdown.notified() => break,
            }
        }
        info!("scheduler stopped");
    }

    /// Signal the scheduler to stop promptly. Safe to call before `run`.
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    async fn run_cycle(&self) {
        let active = match self
            .repos
            .campaigns
            .get_by_status(CampaignStatus::Active)
            .await
        {
            Ok(campaigns) => campaigns,
            Err(err) => {
                warn!(%err, "failed to list active campaigns");
                return;
            }
        };

        let mut advanced = 0usize;
        for campaign in active {
            if advanced >= self.config.max_concurrent_campaigns {
                break;
            }
            if self.stopping.load(Ordering::SeqCst) {
                break;
            }
            // Campaigns with no runnable task do not consume the cap, so
            // one idle campaign cannot starve the rest. One campaign's
            // failure never aborts the cycle.
            match self.advance(&campaign).await {
                Ok(true) => advanced += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(campaign = %campaign.id, %err, "campaign step failed");
                }
            }
        }
        debug!(advanced, "scheduler cycle finished");
    }

    /// Exactly one execution step for this campaign, fully awaited.
    async fn advance(&self, campaign: &Campaign) -> Result<bool, EngineError> {
        let state = self.controller.reload_state(campaign.id).await?;
        let Some(task) = Controller::select_next_task(&state) else {
            debug!(campaign = %campaign.id, "no runnable task");
            return Ok(false);
        };
        let task_id = task.id;

        self.controller.execute_task(task_id).await?;

        if let Some(updated) = self.repos.tasks.get_by_id(task_id).await? {
            self.notifier
                .status_changed(StatusEvent {
                    campaign_id: campaign.id,
                    task_id,
                    status: updated.status,
                })
                .await;
        }
        Ok(true)
    }
}
