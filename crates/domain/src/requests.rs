use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use soxguard_core::{AppError, AppResult};

use crate::ControlPlaneEndpoint;

/// API version pinned for `Microsoft.Insights/activityLogAlerts`.
pub const ACTIVITY_LOG_ALERT_API_VERSION: &str = "2020-10-01";

/// API version pinned for `Microsoft.Authorization/locks`.
pub const MANAGEMENT_LOCK_API_VERSION: &str = "2016-09-01";

/// API version pinned for `Microsoft.Resources/tags`.
pub const RESOURCE_TAGS_API_VERSION: &str = "2021-04-01";

const ALERT_RULE_PREFIX: &str = "AutoLockMonitoring";
const ALERT_LOCATION: &str = "Global";
const ALERT_DESCRIPTION: &str = "Description of sample Activity Log Alert rule.";
const ADMINISTRATIVE_CATEGORY: &str = "Administrative";
const LOCK_DELETE_OPERATION: &str = "Microsoft.Authorization/locks/delete";
const READ_ONLY_LOCK_LEVEL: &str = "ReadOnly";

/// HTTP method used against the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Create or replace a resource.
    Put,
    /// Read a resource.
    Get,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Get => "GET",
        }
    }
}

/// One control-plane call: method, absolute URL and optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceRequest {
    method: HttpMethod,
    url: String,
    body: Option<String>,
}

impl GovernanceRequest {
    /// Creates a PUT request carrying the JSON encoding of `body`.
    pub fn put<T>(url: impl Into<String>, body: &T) -> AppResult<Self>
    where
        T: Serialize,
    {
        let body = serde_json::to_string(body).map_err(|error| {
            AppError::Internal(format!("failed to encode request body: {error}"))
        })?;

        Ok(Self {
            method: HttpMethod::Put,
            url: url.into(),
            body: Some(body),
        })
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the absolute URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the JSON body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Activity-log alert rule resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogAlertBody {
    /// Always `Global` for activity-log alerts.
    pub location: String,
    /// Resource tags on the rule itself.
    pub tags: BTreeMap<String, String>,
    /// Rule definition.
    pub properties: ActivityLogAlertProperties,
}

/// Activity-log alert rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogAlertProperties {
    /// Resource ids the rule watches.
    pub scopes: Vec<String>,
    /// Conjunction of leaf conditions.
    pub condition: AlertRuleAllOfCondition,
    /// Notification targets.
    pub actions: AlertActionList,
    /// Whether the rule is active.
    pub enabled: bool,
    /// Free-form description.
    pub description: String,
}

/// Every leaf must match for the rule to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRuleAllOfCondition {
    /// Leaf conditions.
    pub all_of: Vec<AlertRuleLeafCondition>,
}

/// Field equality condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRuleLeafCondition {
    /// Activity-log event field.
    pub field: String,
    /// Expected value.
    pub equals: String,
}

/// Action groups notified when the rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertActionList {
    /// Referenced action groups.
    pub action_groups: Vec<ActionGroupReference>,
}

/// Reference to one action group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupReference {
    /// Full resource id of the action group.
    pub action_group_id: String,
    /// Properties forwarded to webhook receivers.
    pub webhook_properties: BTreeMap<String, String>,
}

/// Management lock resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementLockBody {
    /// Lock definition.
    pub properties: ManagementLockProperties,
}

/// Management lock definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementLockProperties {
    /// Lock level, such as `ReadOnly`.
    pub level: String,
}

/// Tags resource that replaces the whole tag set of its parent scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTagsBody {
    /// Tag set.
    pub properties: ResourceTagsProperties,
}

/// Tag set of a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTagsProperties {
    /// Tags by key.
    pub tags: BTreeMap<String, String>,
}

impl ActivityLogAlertBody {
    /// Rule that fires on administrative lock deletions in the subscription.
    #[must_use]
    pub fn lock_deletion(subscription_id: &str, action_group_id: &str) -> Self {
        Self {
            location: ALERT_LOCATION.to_owned(),
            tags: BTreeMap::new(),
            properties: ActivityLogAlertProperties {
                scopes: vec![format!("/subscriptions/{subscription_id}")],
                condition: AlertRuleAllOfCondition {
                    all_of: vec![
                        AlertRuleLeafCondition {
                            field: "category".to_owned(),
                            equals: ADMINISTRATIVE_CATEGORY.to_owned(),
                        },
                        AlertRuleLeafCondition {
                            field: "operationName".to_owned(),
                            equals: LOCK_DELETE_OPERATION.to_owned(),
                        },
                    ],
                },
                actions: AlertActionList {
                    action_groups: vec![ActionGroupReference {
                        action_group_id: action_group_id.to_owned(),
                        webhook_properties: BTreeMap::from([(
                            "sampleWebhookProperty".to_owned(),
                            "SamplePropertyValue".to_owned(),
                        )]),
                    }],
                },
                enabled: true,
                description: ALERT_DESCRIPTION.to_owned(),
            },
        }
    }
}

impl ManagementLockBody {
    /// Lock that blocks every write, including deletion.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            properties: ManagementLockProperties {
                level: READ_ONLY_LOCK_LEVEL.to_owned(),
            },
        }
    }
}

/// Returns the alert rule name for a resource group.
#[must_use]
pub fn lock_deletion_alert_rule_name(resource_group_name: &str) -> String {
    format!("{ALERT_RULE_PREFIX}{resource_group_name}")
}

/// Returns the URL of the lock-deletion alert rule for a resource group.
pub fn lock_deletion_alert_url(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
) -> AppResult<String> {
    let rule_name = lock_deletion_alert_rule_name(resource_group_name);
    endpoint.resource_url(
        &[
            "subscriptions",
            subscription_id,
            "resourceGroups",
            resource_group_name,
            "providers",
            "Microsoft.Insights",
            "activityLogAlerts",
            rule_name.as_str(),
        ],
        ACTIVITY_LOG_ALERT_API_VERSION,
    )
}

/// Returns the URL of a management lock on a resource group.
pub fn management_lock_url(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
    lock_name: &str,
) -> AppResult<String> {
    endpoint.resource_url(
        &[
            "subscriptions",
            subscription_id,
            "resourceGroups",
            resource_group_name,
            "providers",
            "Microsoft.Authorization",
            "locks",
            lock_name,
        ],
        MANAGEMENT_LOCK_API_VERSION,
    )
}

/// Builds the PUT that creates the lock-deletion alert rule.
///
/// The action group id is passed through unchecked; the control plane
/// rejects ids it cannot resolve.
pub fn build_lock_deletion_alert_request(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
    action_group_id: &str,
) -> AppResult<GovernanceRequest> {
    let url = lock_deletion_alert_url(endpoint, subscription_id, resource_group_name)?;
    GovernanceRequest::put(
        url,
        &ActivityLogAlertBody::lock_deletion(subscription_id, action_group_id),
    )
}

/// Builds the PUT that applies a read-only lock to a resource group.
pub fn build_read_only_lock_request(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
    lock_name: &str,
) -> AppResult<GovernanceRequest> {
    let url = management_lock_url(endpoint, subscription_id, resource_group_name, lock_name)?;
    GovernanceRequest::put(url, &ManagementLockBody::read_only())
}

/// Returns the URL of the tags resource of a resource group.
pub fn resource_group_tags_url(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
) -> AppResult<String> {
    endpoint.resource_url(
        &[
            "subscriptions",
            subscription_id,
            "resourceGroups",
            resource_group_name,
            "providers",
            "Microsoft.Resources",
            "tags",
            "default",
        ],
        RESOURCE_TAGS_API_VERSION,
    )
}

/// Builds the PUT that replaces the stored tags of a resource group.
pub fn build_resource_group_tags_request(
    endpoint: &ControlPlaneEndpoint,
    subscription_id: &str,
    resource_group_name: &str,
    tags: &BTreeMap<String, String>,
) -> AppResult<GovernanceRequest> {
    let url = resource_group_tags_url(endpoint, subscription_id, resource_group_name)?;
    GovernanceRequest::put(
        url,
        &ResourceTagsBody {
            properties: ResourceTagsProperties { tags: tags.clone() },
        },
    )
}
