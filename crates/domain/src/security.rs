use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rentops_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Delimiter between action and resource in stored permission names.
pub const PERMISSION_DELIMITER: char = '.';

/// Stored name of the global wildcard permission.
pub const WILDCARD_PERMISSION: &str = "*";

/// Verbs that permissions grant on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new records.
    Create,
    /// Read records.
    Read,
    /// Update existing records.
    Update,
    /// Delete records.
    Delete,
    /// Every action on the resource.
    Manage,
    /// Approve pending records.
    Approve,
    /// Reject pending records.
    Reject,
    /// Export records.
    Export,
    /// Import records.
    Import,
    /// Synchronize records with an external system.
    Sync,
    /// Reset state.
    Reset,
}

impl Action {
    /// Returns the stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Export => "export",
            Self::Import => "import",
            Self::Sync => "sync",
            Self::Reset => "reset",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Manage,
            Action::Approve,
            Action::Reject,
            Action::Export,
            Action::Import,
            Action::Sync,
            Action::Reset,
        ];

        ALL
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action '{value}'")))
    }
}

/// Entity name an action applies to, such as `Employee` or `Rental`.
///
/// Resource names are case-sensitive. Besides ASCII letters and digits they
/// may contain `_`, `-` and `.`, so hyphenated names (`advance-payment`) and
/// stage-qualified names (`Timesheet.Foreman`) are valid. A `.` may not start
/// or end the name or appear twice in a row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resource(Cow<'static, str>);

impl Resource {
    /// Sentinel resource used by the `manage.all` wildcard.
    pub const ALL: Self = Self::from_static("all");
    /// Employee records.
    pub const EMPLOYEE: Self = Self::from_static("Employee");
    /// Equipment records.
    pub const EQUIPMENT: Self = Self::from_static("Equipment");
    /// Rental contracts.
    pub const RENTAL: Self = Self::from_static("Rental");
    /// Permission definitions.
    pub const PERMISSION: Self = Self::from_static("Permission");
    /// Role definitions and grants.
    pub const ROLE: Self = Self::from_static("Role");
    /// Application settings.
    pub const SETTINGS: Self = Self::from_static("Settings");
    /// User accounts.
    pub const USER: Self = Self::from_static("User");

    /// Creates a validated resource name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "resource must not be empty".to_owned(),
            ));
        }

        if let Some(invalid) = value.chars().find(|character| {
            !(character.is_ascii_alphanumeric() || matches!(character, '_' | '-' | '.'))
        }) {
            return Err(AppError::Validation(format!(
                "resource '{value}' contains invalid character '{invalid}'"
            )));
        }

        if value.split(PERMISSION_DELIMITER).any(str::is_empty) {
            return Err(AppError::Validation(format!(
                "resource '{value}' contains an empty '{PERMISSION_DELIMITER}' segment"
            )));
        }

        Ok(Self(Cow::Owned(value)))
    }

    pub(crate) const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Returns the resource name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Resource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for Resource {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Resource> for String {
    fn from(value: Resource) -> Self {
        value.0.into_owned()
    }
}

/// A single `(action, resource)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Granted action.
    pub action: Action,
    /// Resource the action applies to.
    pub resource: Resource,
}

impl PermissionGrant {
    /// Creates a grant.
    #[must_use]
    pub const fn new(action: Action, resource: Resource) -> Self {
        Self { action, resource }
    }

    /// Returns the stored permission name for this grant.
    #[must_use]
    pub fn permission_name(&self) -> PermissionName {
        PermissionName::Scoped(self.clone())
    }
}

impl Display for PermissionGrant {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}{PERMISSION_DELIMITER}{}",
            self.action, self.resource
        )
    }
}

/// Permission as stored in the `permissions.name` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PermissionName {
    /// The `*` sentinel granting everything.
    Wildcard,
    /// An `<action>.<resource>` permission.
    Scoped(PermissionGrant),
}

impl PermissionName {
    /// Returns whether this permission grants every action on every resource.
    ///
    /// Both `*` and `manage.all` count as global wildcards.
    #[must_use]
    pub fn is_global_wildcard(&self) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Scoped(grant) => grant.action == Action::Manage && grant.resource == Resource::ALL,
        }
    }

    /// Returns whether this permission covers the requested action on the resource.
    #[must_use]
    pub fn covers(&self, action: Action, resource: &Resource) -> bool {
        if self.is_global_wildcard() {
            return true;
        }

        match self {
            Self::Wildcard => true,
            Self::Scoped(grant) => {
                &grant.resource == resource
                    && (grant.action == action || grant.action == Action::Manage)
            }
        }
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wildcard => formatter.write_str(WILDCARD_PERMISSION),
            Self::Scoped(grant) => grant.fmt(formatter),
        }
    }
}

impl FromStr for PermissionName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == WILDCARD_PERMISSION {
            return Ok(Self::Wildcard);
        }

        let Some((action, resource)) = value.split_once(PERMISSION_DELIMITER) else {
            return Err(AppError::Validation(format!(
                "permission '{value}' must use the '<action>{PERMISSION_DELIMITER}<resource>' form"
            )));
        };

        Ok(Self::Scoped(PermissionGrant::new(
            Action::from_str(action)?,
            Resource::new(resource)?,
        )))
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.to_string()
    }
}
