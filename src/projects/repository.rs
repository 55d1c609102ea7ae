use sqlx::PgPool;

use crate::projects::{
    Project, ProjectDraft, ProjectError, Section, SectionDraft, Task, TaskDraft,
};

const TASK_COLUMNS: &str = "t.id, t.section_id, t.name, t.description, t.due_at, t.recurrence";

/// Repository for projects, sections and tasks
///
/// Every lookup by id is scoped to the owning user, so rows belonging to
/// someone else behave exactly like missing rows.
#[derive(Clone)]
pub struct ProjectsRepository {
    pool: PgPool,
}

impl ProjectsRepository {
    /// Create a new ProjectsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ----- projects -----

    pub async fn list_projects(&self, user_id: i32) -> Result<Vec<Project>, ProjectError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, user_id, name, created_at FROM projects WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    pub async fn create_project(
        &self,
        user_id: i32,
        draft: &ProjectDraft,
    ) -> Result<Project, ProjectError> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(&draft.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::ProjectAlreadyExists))
    }

    pub async fn find_project(
        &self,
        user_id: i32,
        project_id: i32,
    ) -> Result<Option<Project>, ProjectError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, user_id, name, created_at FROM projects WHERE id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn update_project(
        &self,
        user_id: i32,
        project_id: i32,
        draft: &ProjectDraft,
    ) -> Result<Option<Project>, ProjectError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET name = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(&draft.name)
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::ProjectAlreadyExists))
    }

    /// Sections and tasks go with the project (ON DELETE CASCADE)
    pub async fn delete_project(
        &self,
        user_id: i32,
        project_id: i32,
    ) -> Result<bool, ProjectError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ----- sections -----

    pub async fn list_sections(&self, project_id: i32) -> Result<Vec<Section>, ProjectError> {
        let sections = sqlx::query_as::<_, Section>(
            "SELECT id, project_id, name FROM sections WHERE project_id = $1 ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    pub async fn create_section(
        &self,
        project_id: i32,
        draft: &SectionDraft,
    ) -> Result<Section, ProjectError> {
        sqlx::query_as::<_, Section>(
            "INSERT INTO sections (project_id, name) VALUES ($1, $2)
             RETURNING id, project_id, name",
        )
        .bind(project_id)
        .bind(&draft.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::SectionAlreadyExists))
    }

    pub async fn find_section(
        &self,
        user_id: i32,
        section_id: i32,
    ) -> Result<Option<Section>, ProjectError> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            SELECT s.id, s.project_id, s.name
            FROM sections s
            JOIN projects p ON p.id = s.project_id
            WHERE s.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(section_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    pub async fn update_section(
        &self,
        user_id: i32,
        section_id: i32,
        draft: &SectionDraft,
    ) -> Result<Option<Section>, ProjectError> {
        sqlx::query_as::<_, Section>(
            r#"
            UPDATE sections s SET name = $1
            FROM projects p
            WHERE s.id = $2 AND p.id = s.project_id AND p.user_id = $3
            RETURNING s.id, s.project_id, s.name
            "#,
        )
        .bind(&draft.name)
        .bind(section_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::SectionAlreadyExists))
    }

    pub async fn delete_section(
        &self,
        user_id: i32,
        section_id: i32,
    ) -> Result<bool, ProjectError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sections s
            USING projects p
            WHERE s.id = $1 AND p.id = s.project_id AND p.user_id = $2
            "#,
        )
        .bind(section_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ----- tasks -----

    pub async fn list_tasks(&self, section_id: i32) -> Result<Vec<Task>, ProjectError> {
        let sql =
            format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.section_id = $1 ORDER BY t.id");

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(section_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    pub async fn create_task(
        &self,
        section_id: i32,
        draft: &TaskDraft,
    ) -> Result<Task, ProjectError> {
        let sql = format!(
            "INSERT INTO tasks AS t (section_id, name, description, due_at, recurrence)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(section_id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.due_at)
            .bind(draft.recurrence)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::TaskAlreadyExists))
    }

    pub async fn find_task(
        &self,
        user_id: i32,
        task_id: i32,
    ) -> Result<Option<Task>, ProjectError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks t
             JOIN sections s ON s.id = t.section_id
             JOIN projects p ON p.id = s.project_id
             WHERE t.id = $1 AND p.user_id = $2"
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    pub async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        draft: &TaskDraft,
    ) -> Result<Option<Task>, ProjectError> {
        let sql = format!(
            "UPDATE tasks t
             SET name = $1, description = $2, due_at = $3, recurrence = $4
             FROM sections s, projects p
             WHERE t.id = $5 AND s.id = t.section_id AND p.id = s.project_id AND p.user_id = $6
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.due_at)
            .bind(draft.recurrence)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ProjectError::on_unique_violation(e, ProjectError::TaskAlreadyExists))
    }

    pub async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<bool, ProjectError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks t
            USING sections s, projects p
            WHERE t.id = $1 AND s.id = t.section_id AND p.id = s.project_id AND p.user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
