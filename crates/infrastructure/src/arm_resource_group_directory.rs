use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use soxguard_application::{ControlPlaneClient, ResourceGroupDirectory, ResourceGroupTagStore};
use soxguard_core::{AppError, AppResult, RemoteRequestFailure};
use soxguard_domain::{ResourceGroupRef, Subscription, build_resource_group_tags_request};
use tracing::debug;

const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";
const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionPayload {
    subscription_id: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceGroupPayload {
    name: String,
    location: Option<String>,
    #[serde(default)]
    tags: Option<BTreeMap<String, String>>,
}

impl ResourceGroupPayload {
    fn into_resource_group(self, subscription_id: &str) -> ResourceGroupRef {
        let resource_group = ResourceGroupRef::new(subscription_id, self.name)
            .with_tags(self.tags.unwrap_or_default());

        match self.location {
            Some(location) => resource_group.with_location(location),
            None => resource_group,
        }
    }
}

/// Resource group directory backed by Azure Resource Manager list/get calls.
#[derive(Clone)]
pub struct ArmResourceGroupDirectory {
    control_plane: ControlPlaneClient,
}

impl ArmResourceGroupDirectory {
    /// Creates a directory that reads through the given control-plane client.
    #[must_use]
    pub fn new(control_plane: ControlPlaneClient) -> Self {
        Self { control_plane }
    }

    async fn get_json<T>(&self, url: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.control_plane.get(url).await?;
        if !response.is_success() {
            return Err(
                RemoteRequestFailure::new("GET", url, response.status, response.body, None).into(),
            );
        }

        serde_json::from_str(response.body.as_str()).map_err(|error| {
            AppError::Internal(format!("failed to parse response from '{url}': {error}"))
        })
    }

    async fn get_all_pages<T>(&self, first_url: String) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut next_url = Some(first_url);

        while let Some(url) = next_url.take() {
            if !visited.insert(url.clone()) {
                return Err(AppError::Internal(format!(
                    "paging revisited '{url}' after {} pages",
                    visited.len()
                )));
            }

            let page: Page<T> = self.get_json(url.as_str()).await?;
            debug!(url = %url, items = page.value.len(), "fetched directory page");
            items.extend(page.value);

            if let Some(link) = page.next_link.filter(|link| !link.is_empty()) {
                next_url = Some(self.control_plane.endpoint().resolve_link(link.as_str())?);
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl ResourceGroupDirectory for ArmResourceGroupDirectory {
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        let url = self
            .control_plane
            .endpoint()
            .resource_url(&["subscriptions"], SUBSCRIPTIONS_API_VERSION)?;

        Ok(self
            .get_all_pages::<SubscriptionPayload>(url)
            .await?
            .into_iter()
            .map(|payload| Subscription::new(payload.subscription_id, payload.display_name))
            .collect())
    }

    async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> AppResult<Vec<ResourceGroupRef>> {
        let url = self.control_plane.endpoint().resource_url(
            &["subscriptions", subscription_id, "resourcegroups"],
            RESOURCE_GROUPS_API_VERSION,
        )?;

        Ok(self
            .get_all_pages::<ResourceGroupPayload>(url)
            .await?
            .into_iter()
            .map(|payload| payload.into_resource_group(subscription_id))
            .collect())
    }

    async fn find_resource_group(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<Option<ResourceGroupRef>> {
        let url = self.control_plane.endpoint().resource_url(
            &[
                "subscriptions",
                subscription_id,
                "resourcegroups",
                resource_group_name,
            ],
            RESOURCE_GROUPS_API_VERSION,
        )?;

        let response = self.control_plane.get(url.as_str()).await?;
        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(RemoteRequestFailure::new(
                "GET",
                url,
                response.status,
                response.body,
                None,
            )
            .into());
        }

        let payload: ResourceGroupPayload = serde_json::from_str(response.body.as_str())
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to parse resource group '{resource_group_name}': {error}"
                ))
            })?;

        Ok(Some(payload.into_resource_group(subscription_id)))
    }
}

#[async_trait]
impl ResourceGroupTagStore for ArmResourceGroupDirectory {
    async fn save_tags(&self, resource_group: &ResourceGroupRef) -> AppResult<()> {
        let request = build_resource_group_tags_request(
            self.control_plane.endpoint(),
            resource_group.subscription_id(),
            resource_group.name(),
            resource_group.tags(),
        )?;

        self.control_plane.send_expecting_success(&request).await?;
        debug!(
            subscription_id = resource_group.subscription_id(),
            resource_group = resource_group.name(),
            tags = resource_group.tags().len(),
            "saved resource group tags"
        );
        Ok(())
    }
}
