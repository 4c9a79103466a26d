use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ContextData,
    LeadList,
    ScoringHeuristics,
    /// Free-form records; also the tag used for audit-log entries.
    Log,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::ContextData => "context_data",
            ArtifactKind::LeadList => "lead_list",
            ArtifactKind::ScoringHeuristics => "scoring_heuristics",
            ArtifactKind::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSource {
    User,
    Agent,
}

/// A versioned, typed record scoped to a campaign. Immutable once written;
/// new information is a new row, never an in-place edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub kind: ArtifactKind,
    pub key: Option<String>,
    pub content: Value,
    pub source: ArtifactSource,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        campaign_id: Uuid,
        kind: ArtifactKind,
        source: ArtifactSource,
        content: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            kind,
            key: None,
            content,
            source,
            version: 1,
            created_at: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Build an audit-log entry describing an executed (or rejected) action.
    pub fn audit(campaign_id: Uuid, action: &str, details: Value) -> Self {
        Self::new(
            campaign_id,
            ArtifactKind::Log,
            ArtifactSource::Agent,
            json!({ "action": action, "details": details }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_entry_carries_action_and_details() {
        let campaign_id = Uuid::new_v4();
        let entry = Artifact::audit(campaign_id, "task_executed", json!({"tool": "web_search"}));
        assert_eq!(entry.kind, ArtifactKind::Log);
        assert_eq!(entry.source, ArtifactSource::Agent);
        assert_eq!(entry.version, 1);
        assert_eq!(entry.content["action"], "task_executed");
        assert_eq!(entry.content["details"]["tool"], "web_search");
    }
}
