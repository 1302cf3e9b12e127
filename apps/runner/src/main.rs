//! soxguard runner: applies the SOX governance baseline to resource groups.

#![forbid(unsafe_code)]

mod runner_config;

use std::sync::Arc;

use soxguard_application::{
    ControlPlaneClient, GovernanceBatchRunner, GovernancePolicy, ResourceGroupService,
    SoxGovernanceService, TokenProvider,
};
use soxguard_core::{AppError, AppResult};
use soxguard_domain::{ControlPlaneEndpoint, ResourceGroupRef};
use soxguard_infrastructure::{
    ArmResourceGroupDirectory, ClientCredentialsTokenProvider, ReqwestHttpSender,
    StaticTokenProvider,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::runner_config::{CredentialConfig, RunnerConfig, TargetConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = RunnerConfig::load()?;
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let endpoint = ControlPlaneEndpoint::new(
        config.arm_endpoint.as_str(),
        config.arm_audience.as_deref(),
    )?;
    let token_provider = build_token_provider(&config.credential, http_client.clone())?;
    let control_plane = ControlPlaneClient::new(
        endpoint,
        token_provider,
        Arc::new(ReqwestHttpSender::new(http_client)),
    );

    let directory = Arc::new(ArmResourceGroupDirectory::new(control_plane.clone()));
    let resource_group_service = ResourceGroupService::new(directory.clone());
    let governance_service = SoxGovernanceService::new(
        control_plane,
        GovernancePolicy::new()
            .with_sox_tag(config.sox_tag.clone())
            .with_lock_name(config.lock_name.clone())
            .with_default_action_group_id(config.action_group_id.as_str()),
    )
    .with_tag_store(directory);

    info!(
        arm_endpoint = %config.arm_endpoint,
        target = ?config.target,
        lock_name = config.lock_name.as_str(),
        max_concurrency = config.max_concurrency,
        "soxguard-runner started"
    );

    let targets = resolve_targets(&resource_group_service, &config.target).await?;
    let summary = GovernanceBatchRunner::new(governance_service, config.max_concurrency)
        .govern_all(targets)
        .await;

    if summary.failed > 0 {
        return Err(AppError::Internal(format!(
            "{} of {} resource groups could not be governed",
            summary.failed, summary.total
        )));
    }

    info!(resource_groups = summary.total, "governance run finished");
    Ok(())
}

fn build_token_provider(
    credential: &CredentialConfig,
    http_client: reqwest::Client,
) -> AppResult<Arc<dyn TokenProvider>> {
    match credential {
        CredentialConfig::StaticToken(token) => {
            Ok(Arc::new(StaticTokenProvider::new(token.as_str())?))
        }
        CredentialConfig::ClientCredentials {
            authority_host,
            tenant_id,
            client_id,
            client_secret,
        } => Ok(Arc::new(ClientCredentialsTokenProvider::new(
            http_client,
            authority_host.as_str(),
            tenant_id.as_str(),
            client_id.as_str(),
            client_secret.as_str(),
        )?)),
    }
}

async fn resolve_targets(
    resource_group_service: &ResourceGroupService,
    target: &TargetConfig,
) -> AppResult<Vec<ResourceGroupRef>> {
    match target {
        TargetConfig::AllResourceGroups => resource_group_service.get_resource_groups().await,
        TargetConfig::ResourceGroup {
            subscription_id,
            resource_group_name,
        } => Ok(vec![
            resource_group_service
                .get_resource_group_by_name(subscription_id, resource_group_name)
                .await?,
        ]),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
