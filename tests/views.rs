mod common;

use anyhow::Result;

use admin_console::authz::{Permission, PermissionPicker, Resource};
use admin_console::config::AuthHeaderPolicy;
use admin_console::errors::AppError;
use admin_console::models::user::{CreateUserRequest, LoginRequest};
use admin_console::views;
use admin_console::views::NoticeKind;
use admin_console::AppState;

use common::{
    memory_app, spawn_mock_api, test_config, MockApi, ADMIN_MOBILE, CLERK_MOBILE, PASSWORD,
};

async fn signed_in(api: &MockApi, mobile: &str) -> Result<AppState> {
    let (state, _navigator) = memory_app(test_config(api))?;
    views::auth::login(
        &state,
        LoginRequest {
            mobile: mobile.to_string(),
            password: PASSWORD.to_string(),
        },
    )
    .await?;
    Ok(state)
}

#[tokio::test]
async fn admin_manages_roles_users_and_tasks() -> Result<()> {
    let api = spawn_mock_api().await?;
    let state = signed_in(&api, ADMIN_MOBILE).await?;

    // 1. Roles list loads and a new role is created from the picker
    let roles = views::roles::mount(&state).await?;
    assert!(roles.can_view && roles.can_create);
    assert_eq!(roles.rows.len(), 1);
    assert_eq!(roles.rows[0].permissions, "task.view,task.create");

    let mut picker = PermissionPicker::new();
    picker.toggle_all(Resource::User);
    picker.toggle(Permission::UserUpdate);
    picker.select(Permission::TaskView);
    let submitted = views::roles::create(&state, "Support", &picker).await?;
    assert_eq!(submitted.notice.kind, NoticeKind::Success);
    assert_eq!(submitted.notice.message, "New Role Created");
    assert_eq!(submitted.value.has_permission, "user.view,user.create,task.view");
    assert_eq!(state.cache.roles().await.len(), 2);
    let support_id = submitted.value.id;

    // 2. Users list loads, then a user is created under the new role
    let users = views::users::mount(&state).await?;
    assert!(users.can_view && users.can_create && users.can_update);
    assert_eq!(users.rows.len(), 3);
    assert!(users.rows.iter().all(|row| row.short_id.ends_with("...")));

    let created = views::users::create(
        &state,
        CreateUserRequest {
            mobile: "01900000042".to_string(),
            password: "welcome1".to_string(),
            name: Some("Support Agent".to_string()),
            role_id: support_id.to_string(),
        },
    )
    .await?;
    assert_eq!(created.notice.message, "New User Created");
    assert_eq!(created.value.profile_name(), "Support");
    assert_eq!(state.cache.users().await.len(), 4);

    // 3. Edit form is prefilled from the cache; an empty password is dropped
    let mut form = views::users::edit_form(&state, created.value.id).await?;
    assert_eq!(form.mobile, "01900000042");
    assert_eq!(form.role_id, support_id.to_string());
    form.name = Some("Senior Agent".to_string());
    form.password = Some(String::new());
    let updated = views::users::update(&state, created.value.id, form).await?;
    assert_eq!(updated.notice.message, "User Updated");
    let cached = state.cache.users().await;
    let cached = cached
        .iter()
        .find(|user| user.id == created.value.id)
        .expect("updated user cached");
    assert_eq!(cached.name.as_deref(), Some("Senior Agent"));

    // 4. Tasks list loads and a task is appended
    let tasks = views::tasks::mount(&state).await?;
    assert_eq!(tasks.tasks.len(), 1);
    let task = views::tasks::create(&state, "Quarterly audit").await?;
    assert_eq!(task.notice.message, "New Task Created");
    assert_eq!(task.value.name, "Quarterly audit");
    assert_eq!(state.cache.tasks().await.len(), 2);

    Ok(())
}

#[tokio::test]
async fn clerk_only_reaches_tasks() -> Result<()> {
    let api = spawn_mock_api().await?;
    let state = signed_in(&api, CLERK_MOBILE).await?;
    let before = api.request_count();

    // Hidden views render nothing and make no requests
    let roles = views::roles::mount(&state).await?;
    assert!(!roles.can_view && !roles.can_create && roles.rows.is_empty());
    let users = views::users::mount(&state).await?;
    assert!(!users.can_view && users.rows.is_empty());
    assert_eq!(api.request_count(), before);

    // Direct submissions are refused before reaching the server
    let err = views::roles::create(&state, "Sneaky", &PermissionPicker::new())
        .await
        .expect_err("clerk cannot create roles");
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(api.request_count(), before);

    // Tasks are visible and creatable
    let tasks = views::tasks::mount(&state).await?;
    assert!(tasks.can_view && tasks.can_create);
    views::tasks::create(&state, "Clerk task").await?;
    assert_eq!(
        api.requests()[before..],
        ["GET /tasks".to_string(), "POST /tasks".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn invalid_forms_are_rejected_locally() -> Result<()> {
    let api = spawn_mock_api().await?;
    let state = signed_in(&api, ADMIN_MOBILE).await?;
    let before = api.request_count();

    let err = views::roles::create(&state, "", &PermissionPicker::new())
        .await
        .expect_err("empty role");
    let AppError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.get("name"), Some("Role name is required"));
    assert_eq!(errors.get("hasPermission"), Some("Permission is required"));

    let err = views::users::create(
        &state,
        CreateUserRequest {
            mobile: "01900000043".to_string(),
            password: "welcome1".to_string(),
            name: None,
            role_id: "not-a-role".to_string(),
        },
    )
    .await
    .expect_err("bad role id");
    let AppError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.get("roleId"), Some("Must be a valid role"));

    let err = views::tasks::create(&state, "").await.expect_err("empty task");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(api.request_count(), before);

    Ok(())
}

#[tokio::test]
async fn duplicate_role_surfaces_server_message() -> Result<()> {
    let api = spawn_mock_api().await?;
    let state = signed_in(&api, ADMIN_MOBILE).await?;

    let mut picker = PermissionPicker::new();
    picker.select(Permission::TaskView);
    let err = views::roles::create(&state, "Clerk", &picker)
        .await
        .expect_err("role name taken");
    let notice = views::Notice::from_error(&err);
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Role already exists");
    assert_eq!(state.cache.roles().await.len(), 0);

    Ok(())
}

#[tokio::test]
async fn bearer_token_is_attached_after_sign_in() -> Result<()> {
    let api = spawn_mock_api().await?;
    let state = signed_in(&api, ADMIN_MOBILE).await?;

    views::tasks::mount(&state).await?;
    let token = state.session.token().await?.expect("token stored");
    assert_eq!(api.last_auth_header(), Some(Some(format!("Bearer {token}"))));

    Ok(())
}

#[tokio::test]
async fn missing_token_header_follows_policy() -> Result<()> {
    let api = spawn_mock_api().await?;
    let request = LoginRequest {
        mobile: ADMIN_MOBILE.to_string(),
        password: "not-the-password".to_string(),
    };

    // Default: no header at all
    let (state, _navigator) = memory_app(test_config(&api))?;
    let _ = views::auth::login(&state, request.clone()).await;
    assert_eq!(api.last_auth_header(), Some(None));

    // Legacy: the literal `Bearer null`
    let config = test_config(&api).with_auth_header_policy(AuthHeaderPolicy::Always);
    let (state, _navigator) = memory_app(config)?;
    let _ = views::auth::login(&state, request).await;
    assert_eq!(api.last_auth_header(), Some(Some("Bearer null".to_string())));

    Ok(())
}
