mod memory;

pub use memory::MemoryStore;

use crate::domain::{Artifact, Campaign, CampaignStatus, Lead, Task, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{entity} {id} already exists")]
    Conflict { entity: &'static str, id: Uuid },
    #[error("storage backend failure: {message}")]
    Backend { message: String },
}

/// The engine depends only on these narrow per-entity contracts, never on a
/// specific storage technology. All reads reflect committed writes only.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StorageError>;
    async fn get_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>, StorageError>;
    async fn create(&self, campaign: Campaign) -> Result<(), StorageError>;
    async fn update(&self, campaign: Campaign) -> Result<(), StorageError>;
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StorageError>;
    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Task>, StorageError>;
    async fn get_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StorageError>;
    async fn create(&self, task: Task) -> Result<(), StorageError>;
    async fn update(&self, task: Task) -> Result<(), StorageError>;
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

/// Artifacts are append-only: the contract deliberately has no update
/// operation, so audit records share the same immutability guarantee.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Artifact>, StorageError>;
    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Artifact>, StorageError>;
    async fn create(&self, artifact: Artifact) -> Result<(), StorageError>;
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lead>, StorageError>;
    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Lead>, StorageError>;
    async fn create(&self, lead: Lead) -> Result<(), StorageError>;
    async fn update(&self, lead: Lead) -> Result<(), StorageError>;
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

/// The repository handles the engine components share.
#[derive(Clone)]
pub struct Repositories {
    pub campaigns: Arc<dyn CampaignRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub artifacts: Arc<dyn ArtifactRepository>,
    pub leads: Arc<dyn LeadRepository>,
}

impl Repositories {
    /// Wire all four contracts to one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CampaignRepository + TaskRepository + ArtifactRepository + LeadRepository + 'static,
    {
        Self {
            campaigns: store.clone(),
            tasks: store.clone(),
            artifacts: store.clone(),
            leads: store,
        }
    }
}
