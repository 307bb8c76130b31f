use crate::app::AppState;
use crate::authz::{Permission, PolicyEvaluator};
use crate::errors::{AppError, AppResult};
use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Roles,
    Users,
    Tasks,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Roles, Tab::Users, Tab::Tasks];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Roles => "Roles",
            Tab::Users => "Manage Users",
            Tab::Tasks => "Tasks",
        }
    }

    /// Any one of these makes the tab visible.
    pub fn required(&self) -> &'static [Permission] {
        match self {
            Tab::Roles => &[Permission::RolesView],
            Tab::Users => &[
                Permission::UserView,
                Permission::UserCreate,
                Permission::UserUpdate,
            ],
            Tab::Tasks => &[Permission::TaskView, Permission::TaskCreate],
        }
    }

    /// Permission that selects this tab as the landing tab.
    fn landing(&self) -> Permission {
        match self {
            Tab::Roles => Permission::RolesView,
            Tab::Users => Permission::UserView,
            Tab::Tasks => Permission::TaskView,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub user: User,
    pub tabs: Vec<Tab>,
    pub active: Option<Tab>,
}

pub fn visible_tabs(evaluator: &dyn PolicyEvaluator, user: &User) -> Vec<Tab> {
    Tab::ALL
        .into_iter()
        .filter(|tab| evaluator.can(Some(user), tab.required()))
        .collect()
}

/// First of roles, users, tasks whose view permission the user holds.
pub fn default_tab(evaluator: &dyn PolicyEvaluator, user: &User) -> Option<Tab> {
    Tab::ALL
        .into_iter()
        .find(|tab| evaluator.can(Some(user), &[tab.landing()]))
}

pub fn mount(state: &AppState) -> AppResult<DashboardView> {
    let user = state
        .session
        .current_user()
        .ok_or_else(|| AppError::unauthorized("not signed in"))?;
    let evaluator = state.evaluator.as_ref();

    Ok(DashboardView {
        tabs: visible_tabs(evaluator, &user),
        active: default_tab(evaluator, &user),
        user,
    })
}
