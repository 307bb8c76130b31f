//! Access profile ("role") listing and creation.

use crate::app::AppState;
use crate::authz::{Permission, PermissionPicker};
use crate::errors::AppResult;
use crate::models::rbac::{AccessProfile, RoleCreateRequest};

use super::{can, require, Notice, Submitted};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRow {
    pub name: String,
    pub permissions: String,
}

impl From<&AccessProfile> for RoleRow {
    fn from(profile: &AccessProfile) -> Self {
        Self {
            name: profile.name.clone(),
            permissions: profile.has_permission.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolesView {
    pub can_view: bool,
    pub can_create: bool,
    pub rows: Vec<RoleRow>,
}

/// Loads the role list when permitted; otherwise renders nothing.
pub async fn mount(state: &AppState) -> AppResult<RolesView> {
    let can_view = can(state, &[Permission::RolesView]);
    if can_view {
        let roles = state.client.list_roles().await?;
        state.cache.set_roles(roles).await;
    }
    render(state, can_view).await
}

async fn render(state: &AppState, can_view: bool) -> AppResult<RolesView> {
    let rows = if can_view {
        state.cache.roles().await.iter().map(RoleRow::from).collect()
    } else {
        Vec::new()
    };

    Ok(RolesView {
        can_view,
        can_create: can_view && can(state, &[Permission::RolesCreate]),
        rows,
    })
}

pub async fn create(
    state: &AppState,
    name: impl Into<String>,
    picker: &PermissionPicker,
) -> AppResult<Submitted<AccessProfile>> {
    require(state, &[Permission::RolesCreate])?;

    let request = RoleCreateRequest {
        name: name.into(),
        has_permission: picker.grant(),
    };
    request.validate()?;

    let role = state.client.create_role(&request).await?;
    tracing::info!(role_id = %role.id, grant = %role.has_permission, "role created");
    state.cache.push_role(role.clone()).await;

    Ok(Submitted {
        value: role,
        notice: Notice::success("New Role Created"),
    })
}
