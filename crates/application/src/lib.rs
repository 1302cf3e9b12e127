//! Application services and ports.

#![forbid(unsafe_code)]

mod control_plane_client;
mod control_plane_ports;
mod directory_ports;
mod governance_batch;
mod governance_service;
mod resource_group_service;

#[cfg(test)]
mod test_support;

pub use control_plane_client::ControlPlaneClient;
pub use control_plane_ports::{
    AccessToken, HttpResponse, HttpSender, OutboundRequest, TokenProvider,
};
pub use directory_ports::{ResourceGroupDirectory, ResourceGroupTagStore};
pub use governance_batch::{GovernanceBatchRunner, GovernanceBatchSummary};
pub use governance_service::{
    DEFAULT_LOCK_NAME, GovernanceFailure, GovernancePolicy, GovernanceReport,
    RemoteGovernanceState, SoxGovernanceService,
};
pub use resource_group_service::ResourceGroupService;
