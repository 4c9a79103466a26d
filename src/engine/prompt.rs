use super::state::CampaignState;
use crate::domain::Task;

pub(crate) const DEFAULT_RECENT_ARTIFACTS: usize = 5;

const CONTENT_PREVIEW_CHARS: usize = 240;

/// Summarize campaign, task and recent artifacts for the proposal
/// generator. Purely derived from the snapshot, so the same state always
/// produces the same prompt.
pub(crate) fn build(state: &CampaignState, task: &Task, recent_artifacts: usize) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "Campaign: {} (status: {})\n",
        state.campaign.name,
        state.campaign.status.as_str()
    ));
    text.push_str(&format!(
        "Target audience: {}\n",
        state.campaign.target_audience
    ));
    text.push_str(&format!(
        "\nCurrent task ({}): {}\n",
        task.kind, task.description
    ));
    text.push_str(&format!(
        "Attempt {} of {}.\n",
        task.retry_count + 1,
        task.max_retries + 1
    ));
    if !task.input.is_null() {
        text.push_str(&format!("Task input: {}\n", task.input));
    }
    if let Some(error) = &task.error {
        text.push_str(&format!("Previous attempt failed: {error}\n"));
    }

    let recent = state
        .artifacts
        .iter()
        .rev()
        .take(recent_artifacts)
        .collect::<Vec<_>>();
    if !recent.is_empty() {
        text.push_str("\nRecent campaign records (newest first):\n");
        for artifact in recent {
            let label = artifact
                .key
                .as_deref()
                .unwrap_or_else(|| artifact.kind.as_str());
            text.push_str(&format!(
                "- [{}] {}: {}\n",
                artifact.kind.as_str(),
                label,
                preview(&artifact.content.to_string())
            ));
        }
    }

    text.push_str("\nDecide the single next action for this task.");
    text
}

fn preview(text: &str) -> String {
    if text.chars().count() <= CONTENT_PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(CONTENT_PREVIEW_CHARS).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Artifact, ArtifactKind, ArtifactSource, Campaign, CampaignStatus};
    use serde_json::json;

    fn sample_state() -> CampaignState {
        let mut campaign = Campaign::new("Spring launch", "fintech founders", "/tmp/spring");
        campaign.status = CampaignStatus::Active;
        let campaign_id = campaign.id;
        CampaignState {
            campaign,
            tasks: Vec::new(),
            artifacts: vec![
                Artifact::new(
                    campaign_id,
                    ArtifactKind::ContextData,
                    ArtifactSource::User,
                    json!({"notes": "warm intros preferred"}),
                )
                .with_key("briefing"),
            ],
            leads: Vec::new(),
        }
    }

    #[test]
    fn prompt_is_deterministic_for_equal_snapshots() {
        let state = sample_state();
        let task = Task::new(state.campaign.id, "find 10 leads", "research");
        assert_eq!(build(&state, &task, 5), build(&state, &task, 5));
    }

    #[test]
    fn prompt_mentions_campaign_task_and_artifacts() {
        let state = sample_state();
        let task = Task::new(state.campaign.id, "find 10 leads", "research");
        let prompt = build(&state, &task, 5);
        assert!(prompt.contains("Spring launch"));
        assert!(prompt.contains("find 10 leads"));
        assert!(prompt.contains("briefing"));
        assert!(prompt.contains("Attempt 1 of 4."));
    }

    #[test]
    fn artifact_window_is_bounded() {
        let mut state = sample_state();
        for index in 0..10 {
            state.artifacts.push(Artifact::new(
                state.campaign.id,
                ArtifactKind::Log,
                ArtifactSource::Agent,
                json!({"step": index}),
            ));
        }
        let task = Task::new(state.campaign.id, "draft email", "compose");
        let prompt = build(&state, &task, 3);
        assert_eq!(prompt.matches("- [").count(), 3);
    }

    #[test]
    fn long_content_is_truncated() {
        let long = "x".repeat(1000);
        assert!(preview(&long).chars().count() <= CONTENT_PREVIEW_CHARS + 1);
    }
}
