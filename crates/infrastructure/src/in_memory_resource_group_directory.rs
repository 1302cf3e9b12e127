use std::collections::BTreeMap;

use async_trait::async_trait;
use soxguard_application::{ResourceGroupDirectory, ResourceGroupTagStore};
use soxguard_core::{AppError, AppResult};
use soxguard_domain::{ResourceGroupRef, Subscription};
use tokio::sync::RwLock;

/// In-memory resource group directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryResourceGroupDirectory {
    resource_groups: RwLock<BTreeMap<String, Vec<ResourceGroupRef>>>,
}

impl InMemoryResourceGroupDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resource group, keyed by subscription and name.
    pub async fn insert(&self, resource_group: ResourceGroupRef) {
        let mut resource_groups = self.resource_groups.write().await;
        let groups = resource_groups
            .entry(resource_group.subscription_id().to_owned())
            .or_default();

        match groups
            .iter_mut()
            .find(|existing| existing.name() == resource_group.name())
        {
            Some(existing) => *existing = resource_group,
            None => groups.push(resource_group),
        }
    }
}

#[async_trait]
impl ResourceGroupDirectory for InMemoryResourceGroupDirectory {
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        Ok(self
            .resource_groups
            .read()
            .await
            .keys()
            .map(|subscription_id| Subscription::new(subscription_id.as_str(), None))
            .collect())
    }

    async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> AppResult<Vec<ResourceGroupRef>> {
        Ok(self
            .resource_groups
            .read()
            .await
            .get(subscription_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_resource_group(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<Option<ResourceGroupRef>> {
        Ok(self
            .resource_groups
            .read()
            .await
            .get(subscription_id)
            .and_then(|groups| {
                groups
                    .iter()
                    .find(|group| group.name() == resource_group_name)
            })
            .cloned())
    }
}

#[async_trait]
impl ResourceGroupTagStore for InMemoryResourceGroupDirectory {
    async fn save_tags(&self, resource_group: &ResourceGroupRef) -> AppResult<()> {
        let mut resource_groups = self.resource_groups.write().await;
        let stored = resource_groups
            .get_mut(resource_group.subscription_id())
            .and_then(|groups| {
                groups
                    .iter_mut()
                    .find(|group| group.name() == resource_group.name())
            })
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "resource group '{}' does not exist in subscription '{}'",
                    resource_group.name(),
                    resource_group.subscription_id()
                ))
            })?;

        *stored = stored.clone().with_tags(resource_group.tags().clone());
        Ok(())
    }
}
