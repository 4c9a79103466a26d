use crate::domain::CampaignStatus;
use crate::storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("campaign {0} not found")]
    CampaignNotFound(Uuid),
    #[error("task {0} not found")]
    TaskNotFound(Uuid),
    #[error(
        "illegal campaign status transition: {} -> {}",
        .from.as_str(),
        .to.as_str()
    )]
    IllegalTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
