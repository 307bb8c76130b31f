use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppResult, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    pub name: String,
}

impl TaskCreateRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = ValidationErrors::default();
        if self.name.is_empty() {
            errors.push("name", "Task name is required");
        }
        errors.into_result()
    }
}
