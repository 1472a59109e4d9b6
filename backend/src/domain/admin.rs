//! Administrative identities and the append-only activity log.
//!
//! Admin permissions are a typed capability set rather than a free-form
//! permission mapping, so authorisation checks are exhaustive at the type
//! level and a typo cannot silently grant or deny access.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::user::UserId;

/// Maximum length for an activity action label.
pub const ACTION_MAX: usize = 100;

/// Validation errors for administrative records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminValidationError {
    EmptyAction,
    ActionTooLong { max: usize },
    UnknownCapability,
}

impl fmt::Display for AdminValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAction => write!(f, "action must not be empty"),
            Self::ActionTooLong { max } => write!(f, "action must be at most {max} characters"),
            Self::UnknownCapability => write!(f, "unknown capability"),
        }
    }
}

impl std::error::Error for AdminValidationError {}

/// Stable administrator identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AdminId(Uuid);

impl AdminId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single administrative capability.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Delete user accounts (cascading to their rooms and things).
    ManageUsers,
    /// Read the admin activity log.
    ViewActivity,
    /// Create and run export jobs.
    RunExports,
}

impl Capability {
    /// Stable string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ViewActivity => "view_activity",
            Self::RunExports => "run_exports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = AdminValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage_users" => Ok(Self::ManageUsers),
            "view_activity" => Ok(Self::ViewActivity),
            "run_exports" => Ok(Self::RunExports),
            _ => Err(AdminValidationError::UnknownCapability),
        }
    }
}

/// Set of capabilities granted to an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set granting every capability.
    pub fn all() -> Self {
        [
            Capability::ManageUsers,
            Capability::ViewActivity,
            Capability::RunExports,
        ]
        .into_iter()
        .collect()
    }

    /// Whether the set grants the given capability.
    pub fn grants(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Iterate over the granted capabilities in stable order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Privileged identity wrapping a user 1:1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    id: AdminId,
    user_id: UserId,
    role: String,
    capabilities: CapabilitySet,
}

impl AdminUser {
    /// Rehydrate an administrator from validated components.
    pub fn new(
        id: AdminId,
        user_id: UserId,
        role: impl Into<String>,
        capabilities: CapabilitySet,
    ) -> Self {
        Self {
            id,
            user_id,
            role: role.into(),
            capabilities,
        }
    }

    /// Stable administrator identifier.
    pub fn id(&self) -> &AdminId {
        &self.id
    }

    /// The wrapped user account.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role label, informational only.
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Granted capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// Validated activity action label.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionLabel(String);

impl ActionLabel {
    /// Validate and construct an [`ActionLabel`].
    pub fn new(action: impl Into<String>) -> Result<Self, AdminValidationError> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(AdminValidationError::EmptyAction);
        }
        if action.chars().count() > ACTION_MAX {
            return Err(AdminValidationError::ActionTooLong { max: ACTION_MAX });
        }
        Ok(Self(action))
    }
}

impl AsRef<str> for ActionLabel {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ActionLabel> for String {
    fn from(value: ActionLabel) -> Self {
        value.0
    }
}

impl TryFrom<String> for ActionLabel {
    type Error = AdminValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Append-only log entry for an administrative action.
///
/// `details` is stored as an opaque JSON value; the layer never inspects
/// it. Callers must not place end-user personal data in it — that is a
/// policy invariant this type cannot enforce.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminActivity {
    id: Uuid,
    admin_id: AdminId,
    action: ActionLabel,
    details: Value,
    created_at: DateTime<Utc>,
}

impl AdminActivity {
    /// Rehydrate an activity entry from stored components.
    pub fn new(
        id: Uuid,
        admin_id: AdminId,
        action: ActionLabel,
        details: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            admin_id,
            action,
            details,
            created_at,
        }
    }

    /// Build a brand-new activity entry, timestamped now.
    pub fn record(admin_id: AdminId, action: ActionLabel, details: Value) -> Self {
        Self::new(Uuid::new_v4(), admin_id, action, details, Utc::now())
    }

    /// Entry identifier.
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// The acting administrator.
    pub fn admin_id(&self) -> &AdminId {
        &self.admin_id
    }

    /// Action label.
    pub fn action(&self) -> &ActionLabel {
        &self.action
    }

    /// Opaque metadata attached at record time.
    pub fn details(&self) -> &Value {
        &self.details
    }

    /// Timestamp assigned at creation; immutable thereafter.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
