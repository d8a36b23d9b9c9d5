use crate::role::SystemRole;
use crate::security::{Action, PermissionGrant, Resource};

/// Static access policy for one protected route.
///
/// `grant` is the requirement used when the database holds no override for
/// the route. `fallback_roles` is the allow-list consulted only when the
/// route mapping cannot be loaded at all.
#[derive(Debug)]
pub struct RoutePolicy {
    key: &'static str,
    grant: PermissionGrant,
    fallback_roles: &'static [SystemRole],
}

impl RoutePolicy {
    const fn new(
        key: &'static str,
        action: Action,
        resource: Resource,
        fallback_roles: &'static [SystemRole],
    ) -> Self {
        Self {
            key,
            grant: PermissionGrant::new(action, resource),
            fallback_roles,
        }
    }

    /// Returns the stable route key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the statically declared requirement.
    #[must_use]
    pub fn grant(&self) -> &PermissionGrant {
        &self.grant
    }

    /// Returns the degraded-mode role allow-list.
    #[must_use]
    pub fn fallback_roles(&self) -> &'static [SystemRole] {
        self.fallback_roles
    }

    /// Returns whether a role may use the route while the mapping is unavailable.
    #[must_use]
    pub fn allows_fallback_role(&self, role: SystemRole) -> bool {
        self.fallback_roles.contains(&role)
    }

    /// Returns every declared route policy.
    #[must_use]
    pub fn all() -> &'static [Self] {
        ROUTE_POLICIES
    }

    /// Finds the policy declared for a route key.
    #[must_use]
    pub fn find(key: &str) -> Option<&'static Self> {
        ROUTE_POLICIES.iter().find(|policy| policy.key == key)
    }
}

use SystemRole::{Admin, Employee, Manager, SuperAdmin, Supervisor};

const ADMINS: &[SystemRole] = &[SuperAdmin, Admin];
const SUPERVISORS: &[SystemRole] = &[SuperAdmin, Admin, Manager, Supervisor];
const STAFF: &[SystemRole] = &[SuperAdmin, Admin, Manager, Supervisor, Employee];

static ROUTE_POLICIES: &[RoutePolicy] = &[
    RoutePolicy::new(
        "permissions.check",
        Action::Read,
        Resource::PERMISSION,
        &[SuperAdmin, Admin, Manager],
    ),
    RoutePolicy::new("roles.read", Action::Read, Resource::ROLE, ADMINS),
    RoutePolicy::new("roles.create", Action::Create, Resource::ROLE, ADMINS),
    RoutePolicy::new("grants.create", Action::Manage, Resource::ROLE, &[SuperAdmin]),
    RoutePolicy::new("grants.delete", Action::Manage, Resource::ROLE, &[SuperAdmin]),
    RoutePolicy::new("users.assign_role", Action::Update, Resource::USER, ADMINS),
    RoutePolicy::new("users.update_status", Action::Update, Resource::USER, ADMINS),
    RoutePolicy::new("cache.invalidate", Action::Manage, Resource::SETTINGS, ADMINS),
    RoutePolicy::new("routes.read", Action::Read, Resource::SETTINGS, ADMINS),
    RoutePolicy::new("routes.update", Action::Manage, Resource::SETTINGS, &[SuperAdmin]),
    RoutePolicy::new("employees.read", Action::Read, Resource::EMPLOYEE, STAFF),
    RoutePolicy::new(
        "customers.read",
        Action::Read,
        Resource::from_static("Customer"),
        STAFF,
    ),
    RoutePolicy::new("equipment.read", Action::Read, Resource::EQUIPMENT, STAFF),
    RoutePolicy::new(
        "maintenance.read",
        Action::Read,
        Resource::from_static("Maintenance"),
        SUPERVISORS,
    ),
    RoutePolicy::new(
        "company.manage",
        Action::Manage,
        Resource::from_static("Company"),
        ADMINS,
    ),
    RoutePolicy::new("rentals.read", Action::Read, Resource::RENTAL, STAFF),
    RoutePolicy::new(
        "quotations.read",
        Action::Read,
        Resource::from_static("Quotation"),
        STAFF,
    ),
    RoutePolicy::new(
        "payroll.read",
        Action::Read,
        Resource::from_static("Payroll"),
        SUPERVISORS,
    ),
    RoutePolicy::new(
        "timesheets.read",
        Action::Read,
        Resource::from_static("Timesheet"),
        STAFF,
    ),
    RoutePolicy::new(
        "projects.read",
        Action::Read,
        Resource::from_static("Project"),
        STAFF,
    ),
    RoutePolicy::new(
        "leave.read",
        Action::Read,
        Resource::from_static("Leave"),
        STAFF,
    ),
    RoutePolicy::new("users.read", Action::Read, Resource::USER, ADMINS),
    RoutePolicy::new(
        "safety.read",
        Action::Read,
        Resource::from_static("Safety"),
        SUPERVISORS,
    ),
    RoutePolicy::new(
        "salary_increments.read",
        Action::Read,
        Resource::from_static("SalaryIncrement"),
        STAFF,
    ),
    RoutePolicy::new(
        "reports.read",
        Action::Read,
        Resource::from_static("Report"),
        SUPERVISORS,
    ),
    RoutePolicy::new("settings.read", Action::Read, Resource::SETTINGS, STAFF),
];
