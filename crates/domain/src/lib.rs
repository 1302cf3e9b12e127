//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod control_plane;
mod event_log;
mod governance;
mod requests;
mod resource_group;

pub use control_plane::{AZURE_PUBLIC_ENDPOINT, ControlPlaneEndpoint};
pub use event_log::{EventLog, EventLogEntry};
pub use governance::{GovernanceState, GovernanceStep, SoxTag};
pub use requests::{
    ACTIVITY_LOG_ALERT_API_VERSION, ActionGroupReference, ActivityLogAlertBody,
    ActivityLogAlertProperties, AlertActionList, AlertRuleAllOfCondition, AlertRuleLeafCondition,
    GovernanceRequest, HttpMethod, MANAGEMENT_LOCK_API_VERSION, ManagementLockBody,
    ManagementLockProperties, RESOURCE_TAGS_API_VERSION, ResourceTagsBody,
    ResourceTagsProperties, build_lock_deletion_alert_request, build_read_only_lock_request,
    build_resource_group_tags_request, lock_deletion_alert_rule_name, lock_deletion_alert_url,
    management_lock_url, resource_group_tags_url,
};
pub use resource_group::{ResourceGroupRef, Subscription};
