use super::error::EngineError;
use super::prompt;
use super::state::CampaignState;
use crate::domain::{
    Artifact, Campaign, CampaignStatus, Task, TaskStatus, transition_allowed,
};
use crate::generator::ProposalGenerator;
use crate::storage::Repositories;
use crate::tooling::ToolRegistry;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The deterministic half of the system: reloads committed state, selects
/// work, validates untrusted proposals, executes them through the registry
/// and records every outcome. The model and the tool providers are treated
/// as unreliable black boxes throughout.
pub struct Controller {
    repos: Repositories,
    registry: Arc<ToolRegistry>,
    generator: Arc<dyn ProposalGenerator>,
    // Serializes the claim window (reload, runnable check, InProgress
    // write). Never held across the generator or a tool call.
    claim_gate: Mutex<()>,
    recent_artifacts: usize,
}

impl Controller {
    pub fn new(
        repos: Repositories,
        registry: Arc<ToolRegistry>,
        generator: Arc<dyn ProposalGenerator>,
    ) -> Self {
        Self {
            repos,
            registry,
            generator,
            claim_gate: Mutex::new(()),
            recent_artifacts: prompt::DEFAULT_RECENT_ARTIFACTS,
        }
    }

    pub fn with_recent_artifacts(mut self, recent_artifacts: usize) -> Self {
        self.recent_artifacts = recent_artifacts;
        self
    }

    /// Full, uncached snapshot of one campaign from the committed store.
    pub async fn reload_state(&self, campaign_id: Uuid) -> Result<CampaignState, EngineError> {
        let campaign = self
            .repos
            .campaigns
            .get_by_id(campaign_id)
            .await?
            .ok_or(EngineError::CampaignNotFound(campaign_id))?;
        let mut tasks = self.repos.tasks.get_by_campaign_id(campaign_id).await?;
        tasks.sort_by_key(|task| (task.created_at, task.id));
        let mut artifacts = self.repos.artifacts.get_by_campaign_id(campaign_id).await?;
        artifacts.sort_by_key(|artifact| (artifact.created_at, artifact.id));
        let mut leads = self.repos.leads.get_by_campaign_id(campaign_id).await?;
        leads.sort_by_key(|lead| (lead.created_at, lead.id));
        Ok(CampaignState {
            campaign,
            tasks,
            artifacts,
            leads,
        })
    }

    /// Pure selection policy over a snapshot: no I/O, no mutation. Equal
    /// snapshots always yield the same choice.
    pub fn select_next_task(state: &CampaignState) -> Option<&Task> {
        if state.campaign.status != CampaignStatus::Active {
            return None;
        }
        state
            .tasks
            .iter()
            .filter(|task| task.status.is_runnable())
            .min_by_key(|task| (task.created_at, task.id))
    }

    /// Advance one task by one model-proposed, engine-validated action.
    pub async fn execute_task(&self, task_id: Uuid) -> Result<(), EngineError> {
        let Some((task, state)) = self.claim(task_id).await? else {
            return Ok(());
        };

        let tools = match self.registry.discover_tools().await {
            Ok(tools) => tools,
            Err(err) => {
                warn!(task = %task.id, %err, "tool discovery failed");
                return self
                    .record_failure(task, "discovery_failed", json!({ "error": err.to_string() }))
                    .await;
            }
        };

        let prompt_text = prompt::build(&state, &task, self.recent_artifacts);
        let proposal = match self
            .generator
            .generate(&state, &tools, &prompt_text)
            .await
        {
            Ok(proposal) => proposal,
            Err(err) => {
                warn!(task = %task.id, %err, "proposal generation failed");
                return self
                    .record_failure(task, "proposal_failed", json!({ "error": err.to_string() }))
                    .await;
            }
        };

        if proposal.is_task_complete() {
            info!(task = %task.id, "model reported task complete");
            return self.complete(task, "task_complete", proposal.params).await;
        }

        // Validation happens before any external call; an invalid proposal
        // never reaches a tool server.
        let Some(tool) = tools.iter().find(|tool| tool.name == proposal.action) else {
            warn!(task = %task.id, action = %proposal.action, "proposal names unknown action");
            return self
                .record_failure(
                    task,
                    "proposal_rejected",
                    json!({
                        "proposal": proposal,
                        "error": format!("unknown action '{}'", proposal.action),
                    }),
                )
                .await;
        };
        if let Err(err) = ToolRegistry::validate(tool, &proposal.params) {
            warn!(task = %task.id, action = %proposal.action, %err, "proposal failed validation");
            return self
                .record_failure(
                    task,
                    "proposal_rejected",
                    json!({ "proposal": proposal, "error": err.to_string() }),
                )
                .await;
        }

        info!(task = %task.id, tool = %proposal.action, "dispatching validated proposal");
        match self
            .registry
            .call_tool(&proposal.action, proposal.params.clone())
            .await
        {
            Ok(result) => self.complete(task, &proposal.action, result).await,
            Err(err) => {
                warn!(task = %task.id, tool = %proposal.action, %err, "tool execution failed");
                self.record_failure(
                    task,
                    "execution_failed",
                    json!({ "tool": proposal.action, "error": err.to_string() }),
                )
                .await
            }
        }
    }

    /// Enforce the campaign status transition table; illegal requests are
    /// rejected without mutating state.
    pub async fn transition_campaign_status(
        &self,
        campaign_id: Uuid,
        new_status: CampaignStatus,
    ) -> Result<Campaign, EngineError> {
        let mut campaign = self
            .repos
            .campaigns
            .get_by_id(campaign_id)
            .await?
            .ok_or(EngineError::CampaignNotFound(campaign_id))?;
        if !transition_allowed(campaign.status, new_status) {
            return Err(EngineError::IllegalTransition {
                from: campaign.status,
                to: new_status,
            });
        }
        campaign.status = new_status;
        campaign.updated_at = Utc::now();
        self.repos.campaigns.update(campaign.clone()).await?;
        info!(campaign = %campaign.id, status = new_status.as_str(), "campaign status changed");
        Ok(campaign)
    }

    /// Append an immutable audit record; the sole mechanism for post-hoc
    /// reconstruction of what happened and why.
    pub async fn create_audit_log(
        &self,
        campaign_id: Uuid,
        action: &str,
        details: Value,
    ) -> Result<Artifact, EngineError> {
        let entry = Artifact::audit(campaign_id, action, details);
        self.repos.artifacts.create(entry.clone()).await?;
        Ok(entry)
    }

    /// Reload, check runnability and mark InProgress under the claim gate.
    /// The persisted InProgress transition is the serialization point that
    /// keeps two callers from picking up the same task.
    async fn claim(
        &self,
        task_id: Uuid,
    ) -> Result<Option<(Task, CampaignState)>, EngineError> {
        let _gate = self.claim_gate.lock().await;
        let stored = self
            .repos
            .tasks
            .get_by_id(task_id)
            .await?
            .ok_or(EngineError::TaskNotFound(task_id))?;
        let state = self.reload_state(stored.campaign_id).await?;
        let Some(task) = state.tasks.iter().find(|task| task.id == task_id) else {
            return Err(EngineError::TaskNotFound(task_id));
        };
        if !task.status.is_runnable() {
            debug!(
                task = %task_id,
                status = task.status.as_str(),
                "task is not runnable; skipping duplicate execution"
            );
            return Ok(None);
        }

        let mut claimed = task.clone();
        claimed.status = TaskStatus::InProgress;
        claimed.started_at = Some(Utc::now());
        self.repos.tasks.update(claimed.clone()).await?;
        Ok(Some((claimed, state)))
    }

    async fn complete(&self, mut task: Task, action: &str, output: Value) -> Result<(), EngineError> {
        task.output = Some(output);
        task.status = TaskStatus::Done;
        task.error = None;
        task.completed_at = Some(Utc::now());
        // The task mutation is committed before the audit row is written,
        // so the audit trail never claims an action the task state does
        // not also reflect.
        self.repos.tasks.update(task.clone()).await?;
        info!(task = %task.id, action, "task completed");
        self.create_audit_log(
            task.campaign_id,
            action,
            json!({ "task_id": task.id, "status": task.status.as_str() }),
        )
        .await?;
        Ok(())
    }

    async fn record_failure(
        &self,
        mut task: Task,
        action: &str,
        details: Value,
    ) -> Result<(), EngineError> {
        let error_text = details
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("action failed")
            .to_string();
        if task.retry_count >= task.max_retries {
            task.status = TaskStatus::Failed;
            task.completed_at = Some(Utc::now());
        } else {
            task.retry_count += 1;
            task.status = TaskStatus::Retrying;
        }
        task.error = Some(error_text);
        self.repos.tasks.update(task.clone()).await?;
        warn!(
            task = %task.id,
            action,
            status = task.status.as_str(),
            retry_count = task.retry_count,
            "task step failed"
        );
        self.create_audit_log(
            task.campaign_id,
            action,
            json!({
                "task_id": task.id,
                "status": task.status.as_str(),
                "retry_count": task.retry_count,
                "context": details,
            }),
        )
        .await?;
        Ok(())
    }
}
