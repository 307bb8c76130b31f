use crate::app::AppState;
use crate::authz::Permission;
use crate::errors::AppResult;
use crate::models::task::{Task, TaskCreateRequest};

use super::{can, require, Notice, Submitted};

#[derive(Debug, Clone, PartialEq)]
pub struct TasksView {
    pub can_view: bool,
    pub can_create: bool,
    pub tasks: Vec<Task>,
}

pub async fn mount(state: &AppState) -> AppResult<TasksView> {
    let can_view = can(state, &[Permission::TaskView]);
    if can_view {
        let tasks = state.client.list_tasks().await?;
        state.cache.set_tasks(tasks).await;
    }

    Ok(TasksView {
        can_view,
        can_create: can(state, &[Permission::TaskCreate]),
        tasks: if can_view {
            state.cache.tasks().await
        } else {
            Vec::new()
        },
    })
}

pub async fn create(state: &AppState, name: impl Into<String>) -> AppResult<Submitted<Task>> {
    require(state, &[Permission::TaskCreate])?;

    let request = TaskCreateRequest { name: name.into() };
    request.validate()?;

    let task = state.client.create_task(&request).await?;
    tracing::info!(task_id = %task.id, "task created");
    state.cache.push_task(task.clone()).await;

    Ok(Submitted {
        value: task,
        notice: Notice::success("New Task Created"),
    })
}
