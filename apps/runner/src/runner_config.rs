use std::env;

use soxguard_application::DEFAULT_LOCK_NAME;
use soxguard_core::{AppError, AppResult, NonEmptyString};
use soxguard_domain::{AZURE_PUBLIC_ENDPOINT, SoxTag};
use soxguard_infrastructure::AZURE_PUBLIC_AUTHORITY_HOST;

#[derive(Debug, Clone)]
pub enum CredentialConfig {
    StaticToken(String),
    ClientCredentials {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetConfig {
    AllResourceGroups,
    ResourceGroup {
        subscription_id: String,
        resource_group_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub arm_endpoint: String,
    pub arm_audience: Option<String>,
    pub credential: CredentialConfig,
    pub action_group_id: String,
    pub sox_tag: SoxTag,
    pub lock_name: NonEmptyString,
    pub target: TargetConfig,
    pub max_concurrency: usize,
}

impl RunnerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let arm_endpoint =
            optional("ARM_ENDPOINT").unwrap_or_else(|| AZURE_PUBLIC_ENDPOINT.to_owned());
        let arm_audience = optional("ARM_AUDIENCE");

        let credential = match optional("ARM_ACCESS_TOKEN") {
            Some(token) => CredentialConfig::StaticToken(token),
            None => CredentialConfig::ClientCredentials {
                authority_host: optional("AZURE_AUTHORITY_HOST")
                    .unwrap_or_else(|| AZURE_PUBLIC_AUTHORITY_HOST.to_owned()),
                tenant_id: required("AZURE_TENANT_ID")?,
                client_id: required("AZURE_CLIENT_ID")?,
                client_secret: required("AZURE_CLIENT_SECRET")?,
            },
        };

        let action_group_id = required("SOX_ACTION_GROUP_ID")?;
        let sox_tag = SoxTag::new(
            NonEmptyString::new(
                optional("SOX_TAG_KEY").unwrap_or_else(|| SoxTag::DEFAULT_KEY.to_owned()),
            )?,
            optional("SOX_TAG_VALUE").unwrap_or_else(|| SoxTag::DEFAULT_VALUE.to_owned()),
        );
        let lock_name = NonEmptyString::new(
            optional("SOX_LOCK_NAME").unwrap_or_else(|| DEFAULT_LOCK_NAME.to_owned()),
        )?;

        let target = match (
            optional("SOX_SUBSCRIPTION_ID"),
            optional("SOX_RESOURCE_GROUP"),
        ) {
            (Some(subscription_id), Some(resource_group_name)) => TargetConfig::ResourceGroup {
                subscription_id,
                resource_group_name,
            },
            (None, None) => TargetConfig::AllResourceGroups,
            _ => {
                return Err(AppError::Validation(
                    "SOX_SUBSCRIPTION_ID and SOX_RESOURCE_GROUP must be set together".to_owned(),
                ));
            }
        };

        let max_concurrency = match optional("SOX_MAX_CONCURRENCY") {
            Some(value) => value.parse::<usize>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid SOX_MAX_CONCURRENCY value '{value}': {error}"
                ))
            })?,
            None => 4,
        };

        if max_concurrency == 0 {
            return Err(AppError::Validation(
                "SOX_MAX_CONCURRENCY must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            arm_endpoint,
            arm_audience,
            credential,
            action_group_id,
            sox_tag,
            lock_name,
            target,
            max_concurrency,
        })
    }
}
