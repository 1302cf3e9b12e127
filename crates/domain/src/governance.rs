use serde::{Deserialize, Serialize};
use soxguard_core::NonEmptyString;

/// One step of the SOX governance baseline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceStep {
    /// Activity-log alert that fires when a lock is deleted.
    LockDeletionAlert,
    /// Local compliance tag on the resource group.
    SoxTags,
    /// Read-only management lock on the resource group.
    ReadOnlyLock,
}

impl GovernanceStep {
    /// Returns all steps in execution order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[GovernanceStep] = &[
            GovernanceStep::LockDeletionAlert,
            GovernanceStep::SoxTags,
            GovernanceStep::ReadOnlyLock,
        ];

        ALL
    }

    /// Returns a stable identifier for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockDeletionAlert => "lock_deletion_alert",
            Self::SoxTags => "sox_tags",
            Self::ReadOnlyLock => "read_only_lock",
        }
    }

    /// Returns the event log entry written before the step runs.
    #[must_use]
    pub fn event_message(&self) -> &'static str {
        match self {
            Self::LockDeletionAlert => "Setting Lock deletion Alert",
            Self::SoxTags => "Setting Sox Tags",
            Self::ReadOnlyLock => "Setting Read Only Lock",
        }
    }

    /// Returns the state reached once this step succeeds.
    #[must_use]
    pub fn completed_state(&self) -> GovernanceState {
        match self {
            Self::LockDeletionAlert => GovernanceState::AlertSet,
            Self::SoxTags => GovernanceState::TagsSet,
            Self::ReadOnlyLock => GovernanceState::Locked,
        }
    }
}

/// Progress of one governance invocation.
///
/// `NotStarted -> AlertSet -> TagsSet -> Locked`; any failure moves to
/// `Failed` with the step that failed. Both `Locked` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GovernanceState {
    /// No step has completed.
    NotStarted,
    /// Lock-deletion alert rule exists.
    AlertSet,
    /// Compliance tag applied.
    TagsSet,
    /// Read-only lock applied; governance is complete.
    Locked,
    /// A step failed and nothing after it ran.
    Failed {
        /// Step that failed.
        at: GovernanceStep,
    },
}

impl GovernanceState {
    /// Returns the next step to run, or `None` for terminal states.
    #[must_use]
    pub fn next_step(&self) -> Option<GovernanceStep> {
        match self {
            Self::NotStarted => Some(GovernanceStep::LockDeletionAlert),
            Self::AlertSet => Some(GovernanceStep::SoxTags),
            Self::TagsSet => Some(GovernanceStep::ReadOnlyLock),
            Self::Locked | Self::Failed { .. } => None,
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next_step().is_none()
    }

    /// Returns a stable identifier for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AlertSet => "alert_set",
            Self::TagsSet => "tags_set",
            Self::Locked => "locked",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Compliance tag written on governed resource groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoxTag {
    key: String,
    value: String,
}

impl SoxTag {
    /// Default tag key.
    pub const DEFAULT_KEY: &'static str = "compliance";
    /// Default tag value.
    pub const DEFAULT_VALUE: &'static str = "sox";

    /// Creates a compliance tag. The value may be empty; the key may not.
    #[must_use]
    pub fn new(key: NonEmptyString, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the tag key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl Default for SoxTag {
    fn default() -> Self {
        Self {
            key: Self::DEFAULT_KEY.to_owned(),
            value: Self::DEFAULT_VALUE.to_owned(),
        }
    }
}
