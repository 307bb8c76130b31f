use super::{Permission, PermissionGrant};
use crate::models::user::User;

/// Policy evaluator trait for pluggable access checks
pub trait PolicyEvaluator: Send + Sync {
    /// Check if the user may act given ANY of the required permissions
    fn can(&self, user: Option<&User>, required: &[Permission]) -> bool;
}

/// Default access evaluation
///
/// Evaluation order:
/// 1. no user -> deny
/// 2. admin role tag -> allow
/// 3. any required permission in the profile grant -> allow
/// 4. deny
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn can(&self, user: Option<&User>, required: &[Permission]) -> bool {
        has_access(user, required)
    }
}

/// Whether `user` holds at least one of `required`.
///
/// Pure and total. An empty `required` list denies every non-admin.
pub fn has_access(user: Option<&User>, required: &[Permission]) -> bool {
    // 1. No session subject
    let Some(user) = user else {
        return false;
    };

    // 2. Admin bypasses all checks
    if user.role.is_admin() {
        tracing::debug!(user_id = %user.id, "admin bypass");
        return true;
    }

    // 3. Profile grant
    let grant = PermissionGrant::parse(user.grant().unwrap_or_default());
    if grant.is_empty() {
        tracing::debug!(user_id = %user.id, "empty grant");
        return false;
    }

    let allowed = grant.contains_any(required);
    tracing::debug!(
        user_id = %user.id,
        required = ?required,
        allowed,
        "grant evaluated"
    );
    allowed
}
