use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::PermissionGrant;
use crate::errors::{AppResult, ValidationErrors};

// =============================================================================
// ACCESS PROFILE
// =============================================================================

/// Named bundle of permissions assignable to a user (shown as a "role").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProfile {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Comma-joined permission identifiers.
    #[serde(default)]
    pub has_permission: String,
}

impl AccessProfile {
    pub fn grant(&self) -> PermissionGrant<'_> {
        PermissionGrant::parse(&self.has_permission)
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreateRequest {
    pub name: String,
    pub has_permission: String,
}

impl RoleCreateRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        if self.name.is_empty() {
            errors.push("name", "Role name is required");
        }
        if self.has_permission.is_empty() {
            errors.push("hasPermission", "Permission is required");
        }
        errors.into_result()
    }
}
