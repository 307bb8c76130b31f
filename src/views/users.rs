//! User listing, creation and update.

use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Permission;
use crate::errors::{AppError, AppResult};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User};
use crate::utils::short_id;

use super::{can, require, Notice, Submitted};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: Uuid,
    pub short_id: String,
    pub name: String,
    pub mobile: String,
    pub profile: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            short_id: short_id(&user.id),
            name: user.name.clone().unwrap_or_default(),
            mobile: user.mobile.clone(),
            profile: user.profile_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersView {
    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub rows: Vec<UserRow>,
}

pub async fn mount(state: &AppState) -> AppResult<UsersView> {
    let can_view = can(state, &[Permission::UserView]);
    if !can_view {
        return Ok(UsersView {
            can_view,
            can_create: false,
            can_update: false,
            rows: Vec::new(),
        });
    }

    let users = state.client.list_users().await?;
    state.cache.set_users(users).await;

    Ok(UsersView {
        can_view,
        can_create: can(state, &[Permission::UserCreate]),
        can_update: can(state, &[Permission::UserUpdate]),
        rows: state.cache.users().await.iter().map(UserRow::from).collect(),
    })
}

pub async fn create(state: &AppState, request: CreateUserRequest) -> AppResult<Submitted<User>> {
    require(state, &[Permission::UserCreate])?;
    request.validate()?;

    let user = state.client.create_user(&request).await?;
    tracing::info!(user_id = %user.id, "user created");
    state.cache.push_user(user.clone()).await;

    Ok(Submitted {
        value: user,
        notice: Notice::success("New User Created"),
    })
}

/// Update form for a cached user, prefilled from its current values.
pub async fn edit_form(state: &AppState, id: Uuid) -> AppResult<UpdateUserRequest> {
    require(state, &[Permission::UserUpdate])?;
    state
        .cache
        .users()
        .await
        .iter()
        .find(|user| user.id == id)
        .map(UpdateUserRequest::from_user)
        .ok_or_else(|| AppError::internal(format!("user {id} is not loaded")))
}

pub async fn update(
    state: &AppState,
    id: Uuid,
    mut request: UpdateUserRequest,
) -> AppResult<Submitted<User>> {
    require(state, &[Permission::UserUpdate])?;
    if request.password.as_deref() == Some("") {
        request.password = None;
    }
    request.validate()?;

    let user = state.client.update_user(id, &request).await?;
    tracing::info!(user_id = %user.id, "user updated");
    if !state.cache.replace_user(user.clone()).await {
        tracing::debug!(user_id = %user.id, "updated user was not cached");
    }

    Ok(Submitted {
        value: user,
        notice: Notice::success("User Updated"),
    })
}
