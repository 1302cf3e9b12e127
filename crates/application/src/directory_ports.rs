use async_trait::async_trait;
use soxguard_core::AppResult;
use soxguard_domain::{ResourceGroupRef, Subscription};

/// Port for subscription and resource group lookup.
#[async_trait]
pub trait ResourceGroupDirectory: Send + Sync {
    /// Lists subscriptions visible to the credential.
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>>;

    /// Lists resource groups of one subscription.
    async fn list_resource_groups(&self, subscription_id: &str)
    -> AppResult<Vec<ResourceGroupRef>>;

    /// Finds one resource group by name.
    async fn find_resource_group(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<Option<ResourceGroupRef>>;
}

/// Port that stores a resource group's tag set remotely.
#[async_trait]
pub trait ResourceGroupTagStore: Send + Sync {
    /// Replaces the stored tags with the handle's local tag set.
    async fn save_tags(&self, resource_group: &ResourceGroupRef) -> AppResult<()>;
}
