use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Responded,
    Qualified,
    Disqualified,
}

/// Produced and consumed by scoring; never mutated by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub url: Option<String>,
    pub score: f64,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(campaign_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            name: name.into(),
            title: None,
            company: None,
            url: None,
            score: 0.0,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}
