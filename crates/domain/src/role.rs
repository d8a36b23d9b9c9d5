use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rentops_core::AppError;
use serde::{Deserialize, Serialize};

use crate::security::{Action, PermissionGrant, PermissionName, Resource};

/// Numeric identifier of a row in the `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from a raw database value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw database value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Numeric identifier of a row in the `permissions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from a raw database value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw database value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Persisted role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: String,
}

/// Persisted permission row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    /// Permission identifier.
    pub id: PermissionId,
    /// Unique permission name.
    pub name: PermissionName,
}

/// Roles shipped with the application.
///
/// Role names are matched exactly as stored; there is no case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Unrestricted access.
    SuperAdmin,
    /// Branch and depot administration.
    Admin,
    /// Operations management.
    Manager,
    /// Field and shift supervision.
    Supervisor,
    /// Equipment operators.
    Operator,
    /// Employee self service.
    Employee,
    /// Baseline authenticated user.
    User,
}

impl SystemRole {
    /// Returns the stored role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Supervisor => "supervisor",
            Self::Operator => "operator",
            Self::Employee => "employee",
            Self::User => "user",
        }
    }

    /// Returns all system roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SuperAdmin,
            SystemRole::Admin,
            SystemRole::Manager,
            SystemRole::Supervisor,
            SystemRole::Operator,
            SystemRole::Employee,
            SystemRole::User,
        ];

        ALL
    }

    /// Returns the permissions this role receives when roles are seeded.
    #[must_use]
    pub fn default_permissions(&self) -> Vec<PermissionName> {
        let grants: &[(Action, &str)] = match self {
            Self::SuperAdmin => return vec![PermissionName::Wildcard],
            Self::Admin => &[
                (Action::Manage, "Employee"),
                (Action::Manage, "Equipment"),
                (Action::Manage, "Rental"),
                (Action::Manage, "Customer"),
                (Action::Manage, "Timesheet"),
                (Action::Manage, "Payroll"),
                (Action::Manage, "Leave"),
                (Action::Manage, "Project"),
                (Action::Manage, "Report"),
                (Action::Manage, "User"),
                (Action::Manage, "Role"),
                (Action::Manage, "Settings"),
                (Action::Read, "Permission"),
            ],
            Self::Manager => &[
                (Action::Read, "Employee"),
                (Action::Update, "Employee"),
                (Action::Read, "Equipment"),
                (Action::Update, "Equipment"),
                (Action::Read, "Rental"),
                (Action::Create, "Rental"),
                (Action::Update, "Rental"),
                (Action::Approve, "Rental"),
                (Action::Read, "Customer"),
                (Action::Read, "Timesheet"),
                (Action::Approve, "Timesheet"),
                (Action::Read, "Leave"),
                (Action::Approve, "Leave"),
                (Action::Read, "Project"),
                (Action::Read, "Payroll"),
                (Action::Read, "Report"),
                (Action::Read, "Permission"),
            ],
            Self::Supervisor => &[
                (Action::Read, "Employee"),
                (Action::Read, "Equipment"),
                (Action::Read, "Rental"),
                (Action::Read, "Customer"),
                (Action::Read, "Timesheet"),
                (Action::Approve, "Timesheet"),
                (Action::Read, "Leave"),
                (Action::Approve, "Leave"),
                (Action::Read, "Project"),
                (Action::Read, "Report"),
            ],
            Self::Operator => &[
                (Action::Read, "Equipment"),
                (Action::Update, "Equipment"),
                (Action::Read, "Maintenance"),
                (Action::Create, "Maintenance"),
                (Action::Read, "Rental"),
            ],
            Self::Employee => &[
                (Action::Read, "Employee"),
                (Action::Read, "Timesheet"),
                (Action::Create, "Timesheet"),
                (Action::Read, "Leave"),
                (Action::Create, "Leave"),
            ],
            Self::User => &[(Action::Read, "Settings")],
        };

        grants
            .iter()
            .filter_map(|(action, resource)| {
                Resource::new(*resource)
                    .ok()
                    .map(|resource| PermissionGrant::new(*action, resource).permission_name())
            })
            .collect()
    }
}

impl Display for SystemRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown system role '{value}'")))
    }
}
