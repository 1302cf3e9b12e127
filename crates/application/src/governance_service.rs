use std::sync::Arc;

use soxguard_core::{AppError, AppResult, NonEmptyString, RemoteRequestFailure};
use soxguard_domain::{
    EventLog, GovernanceState, GovernanceStep, ResourceGroupRef, SoxTag,
    build_lock_deletion_alert_request, build_read_only_lock_request, lock_deletion_alert_url,
    management_lock_url,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{ControlPlaneClient, ResourceGroupTagStore};

/// Lock name used when the policy does not override it.
pub const DEFAULT_LOCK_NAME: &str = "AutoSoxLock";

/// Tunables of the SOX baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernancePolicy {
    sox_tag: SoxTag,
    lock_name: String,
    default_action_group_id: Option<String>,
}

impl GovernancePolicy {
    /// Creates the default policy: default tag, `AutoSoxLock`, no action group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sox_tag: SoxTag::default(),
            lock_name: DEFAULT_LOCK_NAME.to_owned(),
            default_action_group_id: None,
        }
    }

    /// Overrides the compliance tag.
    #[must_use]
    pub fn with_sox_tag(mut self, sox_tag: SoxTag) -> Self {
        self.sox_tag = sox_tag;
        self
    }

    /// Overrides the read-only lock name.
    #[must_use]
    pub fn with_lock_name(mut self, lock_name: NonEmptyString) -> Self {
        self.lock_name = lock_name.into();
        self
    }

    /// Sets the action group used by [`SoxGovernanceService::apply_default_sox_governance`].
    #[must_use]
    pub fn with_default_action_group_id(mut self, action_group_id: impl Into<String>) -> Self {
        self.default_action_group_id = Some(action_group_id.into());
        self
    }

    /// Returns the compliance tag.
    #[must_use]
    pub fn sox_tag(&self) -> &SoxTag {
        &self.sox_tag
    }

    /// Returns the read-only lock name.
    #[must_use]
    pub fn lock_name(&self) -> &str {
        self.lock_name.as_str()
    }

    /// Returns the configured default action group.
    #[must_use]
    pub fn default_action_group_id(&self) -> Option<&str> {
        self.default_action_group_id.as_deref()
    }
}

impl Default for GovernancePolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a completed governance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceReport {
    /// Subscription the requests targeted.
    pub subscription_id: String,
    /// Governed resource group name.
    pub resource_group_name: String,
    /// Final state, always `Locked`.
    pub state: GovernanceState,
    /// Steps that completed, in order.
    pub completed_steps: Vec<GovernanceStep>,
}

/// Governance run that stopped at a failing step.
///
/// Earlier steps are not rolled back; `reached` tells the caller where to resume.
#[derive(Debug, Error)]
#[error(
    "governance step '{}' failed for resource group '{resource_group_name}' after reaching '{}': {error}",
    .step.as_str(),
    .reached.as_str()
)]
pub struct GovernanceFailure {
    /// Step that failed.
    pub step: GovernanceStep,
    /// Last state reached before the failure.
    pub reached: GovernanceState,
    /// Resource group name.
    pub resource_group_name: String,
    /// Underlying error with request and response diagnostics.
    #[source]
    pub error: AppError,
}

impl GovernanceFailure {
    /// Returns the terminal state of the run.
    #[must_use]
    pub fn state(&self) -> GovernanceState {
        GovernanceState::Failed { at: self.step }
    }
}

/// Governance artifacts found on the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteGovernanceState {
    /// Whether the lock-deletion alert rule exists.
    pub alert_present: bool,
    /// Whether the read-only lock exists.
    pub lock_present: bool,
}

impl RemoteGovernanceState {
    /// Returns whether both remote artifacts exist.
    #[must_use]
    pub fn is_fully_governed(&self) -> bool {
        self.alert_present && self.lock_present
    }
}

/// Applies the SOX baseline (alert, tag, lock) to resource groups.
///
/// Without a tag store the tag step only changes the local handle.
#[derive(Clone)]
pub struct SoxGovernanceService {
    control_plane: ControlPlaneClient,
    policy: GovernancePolicy,
    tag_store: Option<Arc<dyn ResourceGroupTagStore>>,
}

impl SoxGovernanceService {
    /// Creates a governance service.
    #[must_use]
    pub fn new(control_plane: ControlPlaneClient, policy: GovernancePolicy) -> Self {
        Self {
            control_plane,
            policy,
            tag_store: None,
        }
    }

    /// Persists the tag set through `tag_store` before the lock is applied.
    #[must_use]
    pub fn with_tag_store(mut self, tag_store: Arc<dyn ResourceGroupTagStore>) -> Self {
        self.tag_store = Some(tag_store);
        self
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> &GovernancePolicy {
        &self.policy
    }

    /// Runs alert, tag and lock steps in order, stopping at the first failure.
    ///
    /// Each step is appended to `event_log` before it runs.
    pub async fn apply_sox_governance(
        &self,
        event_log: &mut EventLog,
        subscription_id: &str,
        resource_group: &mut ResourceGroupRef,
        action_group_id: &str,
    ) -> Result<GovernanceReport, GovernanceFailure> {
        let mut state = GovernanceState::NotStarted;
        let mut completed_steps = Vec::with_capacity(GovernanceStep::all().len());

        while let Some(step) = state.next_step() {
            event_log.record(step.event_message());
            info!(
                subscription_id = subscription_id,
                resource_group = resource_group.name(),
                step = step.as_str(),
                "governance step started"
            );

            let result = match step {
                GovernanceStep::LockDeletionAlert => {
                    self.set_lock_deletion_alert(
                        subscription_id,
                        resource_group.name(),
                        action_group_id,
                    )
                    .await
                }
                GovernanceStep::SoxTags => {
                    self.set_sox_tags(resource_group);
                    self.save_tags(resource_group).await
                }
                GovernanceStep::ReadOnlyLock => {
                    self.set_read_only_lock(
                        subscription_id,
                        resource_group.name(),
                        self.policy.lock_name(),
                    )
                    .await
                }
            };

            if let Err(error) = result {
                warn!(
                    subscription_id = subscription_id,
                    resource_group = resource_group.name(),
                    step = step.as_str(),
                    reached = state.as_str(),
                    error = %error,
                    "governance step failed"
                );

                return Err(GovernanceFailure {
                    step,
                    reached: state,
                    resource_group_name: resource_group.name().to_owned(),
                    error,
                });
            }

            completed_steps.push(step);
            state = step.completed_state();
        }

        info!(
            subscription_id = subscription_id,
            resource_group = resource_group.name(),
            "governance baseline applied"
        );

        Ok(GovernanceReport {
            subscription_id: subscription_id.to_owned(),
            resource_group_name: resource_group.name().to_owned(),
            state,
            completed_steps,
        })
    }

    /// Runs [`Self::apply_sox_governance`] with the policy's default action group.
    pub async fn apply_default_sox_governance(
        &self,
        event_log: &mut EventLog,
        subscription_id: &str,
        resource_group: &mut ResourceGroupRef,
    ) -> Result<GovernanceReport, GovernanceFailure> {
        let Some(action_group_id) = self.policy.default_action_group_id() else {
            return Err(GovernanceFailure {
                step: GovernanceStep::LockDeletionAlert,
                reached: GovernanceState::NotStarted,
                resource_group_name: resource_group.name().to_owned(),
                error: AppError::Validation(
                    "no default action group is configured for the lock deletion alert".to_owned(),
                ),
            });
        };

        self.apply_sox_governance(event_log, subscription_id, resource_group, action_group_id)
            .await
    }

    /// Creates or replaces the alert rule that fires when a lock is deleted.
    pub async fn set_lock_deletion_alert(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
        action_group_id: &str,
    ) -> AppResult<()> {
        let request = build_lock_deletion_alert_request(
            self.control_plane.endpoint(),
            subscription_id,
            resource_group_name,
            action_group_id,
        )?;

        self.control_plane.send_expecting_success(&request).await?;
        Ok(())
    }

    /// Adds the policy's compliance tag to the local tag set.
    pub fn set_sox_tags(&self, resource_group: &mut ResourceGroupRef) {
        let tag = self.policy.sox_tag();
        self.set_resource_group_tag(resource_group, tag.key(), tag.value());
    }

    /// Adds one tag to the local tag set.
    pub fn set_resource_group_tag(
        &self,
        resource_group: &mut ResourceGroupRef,
        key: &str,
        value: &str,
    ) {
        resource_group.add_tag(key, value);
    }

    async fn save_tags(&self, resource_group: &ResourceGroupRef) -> AppResult<()> {
        match &self.tag_store {
            Some(tag_store) => tag_store.save_tags(resource_group).await,
            None => Ok(()),
        }
    }

    /// Creates or replaces a read-only lock on the resource group.
    pub async fn set_read_only_lock(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
        lock_name: &str,
    ) -> AppResult<()> {
        let request = build_read_only_lock_request(
            self.control_plane.endpoint(),
            subscription_id,
            resource_group_name,
            lock_name,
        )?;

        self.control_plane.send_expecting_success(&request).await?;
        Ok(())
    }

    /// Probes the control plane for the alert rule and the read-only lock.
    pub async fn inspect_governance(
        &self,
        subscription_id: &str,
        resource_group_name: &str,
    ) -> AppResult<RemoteGovernanceState> {
        let endpoint = self.control_plane.endpoint();
        let alert_url = lock_deletion_alert_url(endpoint, subscription_id, resource_group_name)?;
        let lock_url = management_lock_url(
            endpoint,
            subscription_id,
            resource_group_name,
            self.policy.lock_name(),
        )?;

        Ok(RemoteGovernanceState {
            alert_present: self.resource_exists(alert_url.as_str()).await?,
            lock_present: self.resource_exists(lock_url.as_str()).await?,
        })
    }

    async fn resource_exists(&self, url: &str) -> AppResult<bool> {
        let response = self.control_plane.get(url).await?;
        match response.status {
            404 => Ok(false),
            _ if response.is_success() => Ok(true),
            status => {
                Err(RemoteRequestFailure::new("GET", url, status, response.body, None).into())
            }
        }
    }
}
