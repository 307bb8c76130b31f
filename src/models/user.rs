use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppResult, ValidationErrors};
use crate::models::rbac::AccessProfile;

const MIN_MOBILE_LENGTH: usize = 11;
const MIN_PASSWORD_LENGTH: usize = 4;
const MIN_OTP_LENGTH: usize = 4;

/// Coarse role tag carried on every user.
///
/// `admin` bypasses every permission check. Anything the server sends that
/// is not `admin` or `user` is kept as `Other` and treated like `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
    #[serde(other)]
    Other,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_controller: Option<AccessProfile>,
}

impl User {
    /// The comma-joined grant of the user's access profile, if any.
    pub fn grant(&self) -> Option<&str> {
        self.access_controller
            .as_ref()
            .map(|profile| profile.has_permission.as_str())
    }

    /// Name of the assigned access profile, `Default` when none is set.
    pub fn profile_name(&self) -> &str {
        self.access_controller
            .as_ref()
            .map(|profile| profile.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Default")
    }
}

fn check_mobile(errors: &mut ValidationErrors, mobile: &str) {
    if mobile.chars().count() < MIN_MOBILE_LENGTH {
        errors.push("mobile", "Enter a valid mobile number");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            "password",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

fn check_role_id(errors: &mut ValidationErrors, role_id: &str) {
    if Uuid::parse_str(role_id).is_err() {
        errors.push("roleId", "Must be a valid role");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub mobile: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        check_mobile(&mut errors, &self.mobile);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub mobile: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        check_mobile(&mut errors, &self.mobile);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: Uuid,
    pub otp: String,
}

impl VerifyOtpRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        if self.otp.chars().count() < MIN_OTP_LENGTH {
            errors.push("otp", "Enter a valid otp");
        }
        errors.into_result()
    }
}

/// Admin-side user creation (`POST /users/new`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub mobile: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role_id: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        check_mobile(&mut errors, &self.mobile);
        check_password(&mut errors, &self.password);
        check_role_id(&mut errors, &self.role_id);
        errors.into_result()
    }
}

/// `PATCH /users/:id`. An absent or empty password leaves it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role_id: String,
}

impl UpdateUserRequest {
    /// Prefills the update form from an existing user.
    pub fn from_user(user: &User) -> Self {
        Self {
            mobile: user.mobile.clone(),
            password: None,
            name: user.name.clone(),
            role_id: user
                .access_controller
                .as_ref()
                .map(|profile| profile.id.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        check_mobile(&mut errors, &self.mobile);
        check_role_id(&mut errors, &self.role_id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: RegisteredUser,
    #[serde(default)]
    pub otp_send: bool,
}
