use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Initializing,
    Active,
    Paused,
    Completed,
    Error,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Initializing => "initializing",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Error => "error",
        }
    }
}

/// Validate that a campaign status transition is allowed.
///
/// Valid transitions:
/// - Initializing -> Active
/// - Active -> Paused
/// - Paused -> Active
/// - Active -> Completed
/// - Active -> Error
pub fn transition_allowed(from: CampaignStatus, to: CampaignStatus) -> bool {
    matches!(
        (from, to),
        (CampaignStatus::Initializing, CampaignStatus::Active)
            | (CampaignStatus::Active, CampaignStatus::Paused)
            | (CampaignStatus::Paused, CampaignStatus::Active)
            | (CampaignStatus::Active, CampaignStatus::Completed)
            | (CampaignStatus::Active, CampaignStatus::Error)
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
    pub target_audience: String,
    pub working_dir: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(
        name: impl Into<String>,
        target_audience: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: CampaignStatus::Initializing,
            target_audience: target_audience.into(),
            working_dir: working_dir.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializing_only_activates() {
        assert!(transition_allowed(
            CampaignStatus::Initializing,
            CampaignStatus::Active
        ));
        assert!(!transition_allowed(
            CampaignStatus::Initializing,
            CampaignStatus::Paused
        ));
        assert!(!transition_allowed(
            CampaignStatus::Initializing,
            CampaignStatus::Completed
        ));
        assert!(!transition_allowed(
            CampaignStatus::Initializing,
            CampaignStatus::Error
        ));
    }

    #[test]
    fn active_pauses_completes_or_errors() {
        assert!(transition_allowed(
            CampaignStatus::Active,
            CampaignStatus::Paused
        ));
        assert!(transition_allowed(
            CampaignStatus::Active,
            CampaignStatus::Completed
        ));
        assert!(transition_allowed(
            CampaignStatus::Active,
            CampaignStatus::Error
        ));
        assert!(!transition_allowed(
            CampaignStatus::Active,
            CampaignStatus::Initializing
        ));
    }

    #[test]
    fn paused_only_resumes() {
        assert!(transition_allowed(
            CampaignStatus::Paused,
            CampaignStatus::Active
        ));
        assert!(!transition_allowed(
            CampaignStatus::Paused,
            CampaignStatus::Completed
        ));
        assert!(!transition_allowed(
            CampaignStatus::Paused,
            CampaignStatus::Error
        ));
    }

    #[test]
    fn terminal_statuses_never_leave() {
        for to in [
            CampaignStatus::Initializing,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Error,
        ] {
            assert!(!transition_allowed(CampaignStatus::Completed, to));
        }
        for to in [
            CampaignStatus::Initializing,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
        ] {
            assert!(!transition_allowed(CampaignStatus::Error, to));
        }
    }

    #[test]
    fn self_transitions_rejected() {
        for status in [
            CampaignStatus::Initializing,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
            CampaignStatus::Error,
        ] {
            assert!(!transition_allowed(status, status));
        }
    }
}
