use std::sync::Arc;

use soxguard_core::{AppError, AppResult};
use soxguard_domain::{ResourceGroupRef, Subscription};

use crate::ResourceGroupDirectory;

/// Resolves resource group handles for governance runs.
#[derive(Clone)]
pub struct ResourceGroupService {
    directory: Arc<dyn ResourceGroupDirectory>,
}

impl ResourceGroupService {
    /// Creates a resource group service.
    #[must_use]
    pub fn new(directory: Arc<dyn ResourceGroupDirectory>) -> Self {
        Self { directory }
    }

    /// Lists subscriptions visible to the credential.
    pub async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        self.directory.list_subscriptions().await
    }

    /// Lists every resource group of every visible subscription.
    pub async fn get_resource_groups(&self) -> AppResult<Vec<ResourceGroupRef>> {
        let mut resource_groups = Vec::new();
        for subscription in self.directory.list_subscriptions().await? {
            resource_groups.extend(
                self.directory
                    .list_resource_groups(subscription.subscription_id())
                    .await?,
            );
        }

        Ok(resource_groups)
    }

    /// Returns one resource group by subscription and name.
    pub async fn get_resource_group_by_name(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<ResourceGroupRef> {
        self.directory
            .find_resource_group(subscription_id, resource_group_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "resource group '{resource_group_name}' does not exist in subscription '{subscription_id}'"
                ))
            })
    }
}
