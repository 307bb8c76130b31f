//! Screens of the admin console.
//!
//! Each view decides what to show with the access evaluator, calls the
//! remote client, and writes results into the entity cache. The checks
//! only hide what the server would reject anyway.

pub mod auth;
pub mod dashboard;
pub mod roles;
pub mod tasks;
pub mod users;

use crate::app::AppState;
use crate::authz::Permission;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient notification shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        Self::error(err.user_message())
    }
}

/// Result of a successful form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted<T> {
    pub value: T,
    pub notice: Notice,
}

/// Whether the session subject holds any of `required`.
pub fn can(state: &AppState, required: &[Permission]) -> bool {
    state
        .evaluator
        .can(state.session.current_user().as_ref(), required)
}

/// The session subject, if it holds any of `required`.
pub fn require(state: &AppState, required: &[Permission]) -> AppResult<User> {
    let Some(user) = state.session.current_user() else {
        return Err(AppError::unauthorized("not signed in"));
    };
    if !state.evaluator.can(Some(&user), required) {
        let names = required
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(AppError::forbidden(format!("requires {names}")));
    }
    Ok(user)
}
