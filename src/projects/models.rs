use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// How often a task repeats; stored as SMALLINT (-1, 0, 1)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Never = -1,
    EveryDay = 0,
    EveryWeek = 1,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        *self != Recurrence::Never
    }
}

/// Project owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    pub id: i32,
    #[serde(skip)]
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Named group of tasks inside a project
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Section {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    pub id: i32,
    pub section_id: i32,
    pub name: String,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    pub recurrence: Recurrence,
}

/// Body of project create and update
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProjectRequest {
    #[schema(example = "Home")]
    pub name: Option<String>,
}

/// Body of section create and update
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SectionRequest {
    #[schema(example = "Groceries")]
    pub name: Option<String>,
}

/// Body of task create and update (full replacement)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TaskRequest {
    #[schema(example = "Buy milk")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub recurrence: Option<Recurrence>,
}

/// Normalized project fields, ready to store
#[derive(Debug, Clone, Validate)]
pub struct ProjectDraft {
    #[validate(length(max = 25, code = "NAME_LENGTH_MISMATCH"))]
    pub name: String,
}

/// Normalized section fields, ready to store
#[derive(Debug, Clone, Validate)]
pub struct SectionDraft {
    #[validate(length(max = 25, code = "NAME_LENGTH_MISMATCH"))]
    pub name: String,
}

/// Normalized task fields, ready to store
#[derive(Debug, Clone, Validate)]
pub struct TaskDraft {
    #[validate(length(max = 200, code = "NAME_LENGTH_MISMATCH"))]
    pub name: String,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    pub recurrence: Recurrence,
}
