//! In-memory entity cache shared by the views.
//!
//! Lists are replaced wholesale on load and appended to on create; the last
//! server response wins. Nothing here is persisted.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::rbac::AccessProfile;
use crate::models::task::Task;
use crate::models::user::User;

#[derive(Debug, Clone, Default)]
struct Entities {
    users: Vec<User>,
    roles: Vec<AccessProfile>,
    tasks: Vec<Task>,
}

/// Cloneable handle; all clones share one set of lists.
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    inner: Arc<RwLock<Entities>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn users(&self) -> Vec<User> {
        self.inner.read().await.users.clone()
    }

    pub async fn set_users(&self, users: Vec<User>) {
        self.inner.write().await.users = users;
    }

    pub async fn push_user(&self, user: User) {
        self.inner.write().await.users.push(user);
    }

    /// Replaces the user with the same id. Returns false if none matched.
    pub async fn replace_user(&self, user: User) -> bool {
        let mut entities = self.inner.write().await;
        match entities.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user;
                true
            }
            None => false,
        }
    }

    pub async fn roles(&self) -> Vec<AccessProfile> {
        self.inner.read().await.roles.clone()
    }

    pub async fn set_roles(&self, roles: Vec<AccessProfile>) {
        self.inner.write().await.roles = roles;
    }

    pub async fn push_role(&self, role: AccessProfile) {
        self.inner.write().await.roles.push(role);
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.read().await.tasks.clone()
    }

    pub async fn set_tasks(&self, tasks: Vec<Task>) {
        self.inner.write().await.tasks = tasks;
    }

    pub async fn push_task(&self, task: Task) {
        self.inner.write().await.tasks.push(task);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = Entities::default();
    }
}
