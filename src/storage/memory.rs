use super::{
    ArtifactRepository, CampaignRepository, LeadRepository, StorageError, TaskRepository,
};
use crate::domain::{Artifact, Campaign, CampaignStatus, Lead, Task, TaskStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory reference store. Backs the binary and the tests; production
/// deployments substitute their own repository implementations.
#[derive(Default)]
pub struct MemoryStore {
    campaigns: Mutex<HashMap<Uuid, Campaign>>,
    tasks: Mutex<HashMap<Uuid, Task>>,
    artifacts: Mutex<HashMap<Uuid, Artifact>>,
    leads: Mutex<HashMap<Uuid, Lead>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_new<T>(
    map: &Mutex<HashMap<Uuid, T>>,
    entity: &'static str,
    id: Uuid,
    value: T,
) -> Result<(), StorageError> {
    let mut guard = map.lock().expect("store lock");
    if guard.contains_key(&id) {
        return Err(StorageError::Conflict { entity, id });
    }
    guard.insert(id, value);
    Ok(())
}

fn replace_existing<T>(
    map: &Mutex<HashMap<Uuid, T>>,
    entity: &'static str,
    id: Uuid,
    value: T,
) -> Result<(), StorageError> {
    let mut guard = map.lock().expect("store lock");
    if !guard.contains_key(&id) {
        return Err(StorageError::NotFound { entity, id });
    }
    guard.insert(id, value);
    Ok(())
}

fn remove_existing<T>(
    map: &Mutex<HashMap<Uuid, T>>,
    entity: &'static str,
    id: Uuid,
) -> Result<(), StorageError> {
    let mut guard = map.lock().expect("store lock");
    guard
        .remove(&id)
        .map(|_| ())
        .ok_or(StorageError::NotFound { entity, id })
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StorageError> {
        Ok(self.campaigns.lock().expect("store lock").get(&id).cloned())
    }

    async fn get_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>, StorageError> {
        let mut matches: Vec<Campaign> = self
            .campaigns
            .lock()
            .expect("store lock")
            .values()
            .filter(|campaign| campaign.status == status)
            .cloned()
            .collect();
        matches.sort_by_key(|campaign| (campaign.created_at, campaign.id));
        Ok(matches)
    }

    async fn create(&self, campaign: Campaign) -> Result<(), StorageError> {
        insert_new(&self.campaigns, "campaign", campaign.id, campaign)
    }

    async fn update(&self, campaign: Campaign) -> Result<(), StorageError> {
        replace_existing(&self.campaigns, "campaign", campaign.id, campaign)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        remove_existing(&self.campaigns, "campaign", id)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        Ok(self.tasks.lock().expect("store lock").get(&id).cloned())
    }

    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Task>, StorageError> {
        let mut matches: Vec<Task> = self
            .tasks
            .lock()
            .expect("store lock")
            .values()
            .filter(|task| task.campaign_id == campaign_id)
            .cloned()
            .collect();
        matches.sort_by_key(|task| (task.created_at, task.id));
        Ok(matches)
    }

    async fn get_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StorageError> {
        let mut matches: Vec<Task> = self
            .tasks
            .lock()
            .expect("store lock")
            .values()
            .filter(|task| task.status == status)
            .cloned()
            .collect();
        matches.sort_by_key(|task| (task.created_at, task.id));
        Ok(matches)
    }

    async fn create(&self, task: Task) -> Result<(), StorageError> {
        insert_new(&self.tasks, "task", task.id, task)
    }

    async fn update(&self, task: Task) -> Result<(), StorageError> {
        replace_existing(&self.tasks, "task", task.id, task)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        remove_existing(&self.tasks, "task", id)
    }
}

#[async_trait]
impl ArtifactRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Artifact>, StorageError> {
        Ok(self.artifacts.lock().expect("store lock").get(&id).cloned())
    }

    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Artifact>, StorageError> {
        let mut matches: Vec<Artifact> = self
            .artifacts
            .lock()
            .expect("store lock")
            .values()
            .filter(|artifact| artifact.campaign_id == campaign_id)
            .cloned()
            .collect();
        matches.sort_by_key(|artifact| (artifact.created_at, artifact.id));
        Ok(matches)
    }

    async fn create(&self, artifact: Artifact) -> Result<(), StorageError> {
        insert_new(&self.artifacts, "artifact", artifact.id, artifact)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        remove_existing(&self.artifacts, "artifact", id)
    }
}

#[async_trait]
impl LeadRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lead>, StorageError> {
        Ok(self.leads.lock().expect("store lock").get(&id).cloned())
    }

    async fn get_by_campaign_id(&self, campaign_id: Uuid) -> Result<Vec<Lead>, StorageError> {
        let mut matches: Vec<Lead> = self
            .leads
            .lock()
            .expect("store lock")
            .values()
            .filter(|lead| lead.campaign_id == campaign_id)
            .cloned()
            .collect();
        matches.sort_by_key(|lead| (lead.created_at, lead.id));
        Ok(matches)
    }

    async fn create(&self, lead: Lead) -> Result<(), StorageError> {
        insert_new(&self.leads, "lead", lead.id, lead)
    }

    async fn update(&self, lead: Lead) -> Result<(), StorageError> {
        replace_existing(&self.leads, "lead", lead.id, lead)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        remove_existing(&self.leads, "lead", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let campaign = Campaign::new("launch", "founders", "/tmp/launch");
        CampaignRepository::create(&store, campaign.clone())
            .await
            .expect("first create succeeds");
        let duplicate = CampaignRepository::create(&store, campaign).await;
        assert!(matches!(duplicate, Err(StorageError::Conflict { .. })));
    }

    #[tokio::test]
    async fn update_requires_existing_row() {
        let store = MemoryStore::new();
        let task = Task::new(Uuid::new_v4(), "draft outreach email", "compose");
        let missing = TaskRepository::update(&store, task).await;
        assert!(matches!(missing, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn campaign_scoped_reads_sort_by_creation() {
        let store = MemoryStore::new();
        let campaign_id = Uuid::new_v4();
        let first = Task::new(campaign_id, "first", "research");
        let second = Task::new(campaign_id, "second", "research");
        TaskRepository::create(&store, second.clone())
            .await
            .expect("create succeeds");
        TaskRepository::create(&store, first.clone())
            .await
            .expect("create succeeds");

        let tasks = TaskRepository::get_by_campaign_id(&store, campaign_id)
            .await
            .expect("reads");
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].created_at <= tasks[1].created_at);
    }
}
