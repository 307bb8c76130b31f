//! Authorization module - permission catalog and access evaluation
//!
//! Every check here is a client-side visibility decision only. The remote
//! API is the authority and must enforce the same permissions itself.
//!
//! - Closed permission catalog grouped by resource
//! - Comma-joined grant parsing and building
//! - Admin bypass and any-of evaluation

mod evaluator;
mod grant;

pub use evaluator::{has_access, DefaultPolicyEvaluator, PolicyEvaluator};
pub use grant::{PermissionGrant, PermissionPicker};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Well-known role tags
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// Resource a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Task,
    Role,
}

impl Resource {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Resource::User => USER_PERMISSIONS,
            Resource::Task => TASK_PERMISSIONS,
            Resource::Role => ROLE_PERMISSIONS,
        }
    }
}

/// Permission identifiers known to the dashboard.
///
/// The set is fixed at build time. None of the identifiers contains a comma,
/// so any grant built from them splits back unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "user.view")]
    UserView,
    #[serde(rename = "user.create")]
    UserCreate,
    #[serde(rename = "user.update")]
    UserUpdate,
    #[serde(rename = "task.view")]
    TaskView,
    #[serde(rename = "task.create")]
    TaskCreate,
    #[serde(rename = "roles.create")]
    RolesCreate,
    #[serde(rename = "roles.view")]
    RolesView,
}

pub const USER_PERMISSIONS: &[Permission] = &[
    Permission::UserView,
    Permission::UserCreate,
    Permission::UserUpdate,
];

pub const TASK_PERMISSIONS: &[Permission] = &[Permission::TaskView, Permission::TaskCreate];

pub const ROLE_PERMISSIONS: &[Permission] = &[Permission::RolesCreate, Permission::RolesView];

/// Catalog order: users, tasks, roles.
pub const ALL_PERMISSIONS: &[Permission] = &[
    Permission::UserView,
    Permission::UserCreate,
    Permission::UserUpdate,
    Permission::TaskView,
    Permission::TaskCreate,
    Permission::RolesCreate,
    Permission::RolesView,
];

/// Holding any one of these is enough to enter the dashboard.
pub const DASHBOARD_PERMISSIONS: &[Permission] = &[
    Permission::UserView,
    Permission::UserCreate,
    Permission::UserUpdate,
    Permission::RolesCreate,
    Permission::RolesView,
    Permission::TaskCreate,
    Permission::TaskView,
];

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserView => "user.view",
            Permission::UserCreate => "user.create",
            Permission::UserUpdate => "user.update",
            Permission::TaskView => "task.view",
            Permission::TaskCreate => "task.create",
            Permission::RolesCreate => "roles.create",
            Permission::RolesView => "roles.view",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Permission::UserView | Permission::UserCreate | Permission::UserUpdate => {
                Resource::User
            }
            Permission::TaskView | Permission::TaskCreate => Resource::Task,
            Permission::RolesCreate | Permission::RolesView => Resource::Role,
        }
    }

    /// Exact-match lookup; unknown or misspelled identifiers yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_PERMISSIONS
            .iter()
            .copied()
            .find(|permission| permission.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::parse(s).ok_or_else(|| format!("unknown permission: {s}"))
    }
}
