use soxguard_domain::{EventLog, ResourceGroupRef};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::SoxGovernanceService;

/// Totals of one batch governance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernanceBatchSummary {
    /// Resource groups handed to the batch.
    pub total: usize,
    /// Runs that reached `Locked`.
    pub governed: usize,
    /// Runs that failed or did not complete.
    pub failed: usize,
}

/// Governs many resource groups with a bounded number of concurrent runs.
#[derive(Clone)]
pub struct GovernanceBatchRunner {
    governance_service: SoxGovernanceService,
    max_concurrency: usize,
}

impl GovernanceBatchRunner {
    /// Creates a runner. A concurrency of zero is treated as one.
    #[must_use]
    pub fn new(governance_service: SoxGovernanceService, max_concurrency: usize) -> Self {
        Self {
            governance_service,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Returns the effective concurrency bound.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Applies the default baseline to every target.
    ///
    /// A task that panics counts as a failed run.
    pub async fn govern_all(&self, targets: Vec<ResourceGroupRef>) -> GovernanceBatchSummary {
        let total = targets.len();
        let mut pending = targets.into_iter();
        let mut tasks = JoinSet::new();
        let mut governed = 0_usize;
        let mut failed = 0_usize;

        loop {
            while tasks.len() < self.max_concurrency {
                let Some(resource_group) = pending.next() else {
                    break;
                };
                let governance_service = self.governance_service.clone();
                tasks.spawn(async move { govern_one(&governance_service, resource_group).await });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok(true) => governed = governed.saturating_add(1),
                Ok(false) => failed = failed.saturating_add(1),
                Err(error) => {
                    failed = failed.saturating_add(1);
                    warn!(error = %error, "governance task did not complete");
                }
            }
        }

        GovernanceBatchSummary {
            total,
            governed,
            failed,
        }
    }
}

async fn govern_one(
    governance_service: &SoxGovernanceService,
    mut resource_group: ResourceGroupRef,
) -> bool {
    let subscription_id = resource_group.subscription_id().to_owned();
    let mut event_log = EventLog::new();

    match governance_service
        .apply_default_sox_governance(&mut event_log, subscription_id.as_str(), &mut resource_group)
        .await
    {
        Ok(report) => {
            info!(
                subscription_id = %report.subscription_id,
                resource_group = %report.resource_group_name,
                state = report.state.as_str(),
                tags = ?resource_group.tags(),
                events = ?event_log.messages(),
                "resource group governed"
            );
            true
        }
        Err(failure) => {
            warn!(
                subscription_id = %subscription_id,
                resource_group = %failure.resource_group_name,
                failed_step = failure.step.as_str(),
                reached = failure.reached.as_str(),
                events = ?event_log.messages(),
                error = %failure.error,
                "resource group governance failed"
            );

            match governance_service
                .inspect_governance(subscription_id.as_str(), resource_group.name())
                .await
            {
                Ok(remote_state) => info!(
                    subscription_id = %subscription_id,
                    resource_group = %resource_group.name(),
                    alert_present = remote_state.alert_present,
                    lock_present = remote_state.lock_present,
                    "remote governance state after failure"
                ),
                Err(error) => warn!(
                    subscription_id = %subscription_id,
                    resource_group = %resource_group.name(),
                    error = %error,
                    "failed to probe remote governance state"
                ),
            }

            false
        }
    }
}

#[cfg(test)]
mod tests;
