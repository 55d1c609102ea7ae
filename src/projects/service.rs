use validator::{Validate, ValidationErrors};

use crate::error::ErrorCode;
use crate::projects::{
    Project, ProjectDraft, ProjectError, ProjectRequest, ProjectsRepository, Section,
    SectionDraft, SectionRequest, Task, TaskDraft, TaskRequest,
};

/// Service for project, section and task business logic
///
/// All operations act on behalf of `user_id` and never see other users' rows.
#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectsRepository,
}

impl ProjectService {
    /// Create a new ProjectService
    pub fn new(repo: ProjectsRepository) -> Self {
        Self { repo }
    }

    pub async fn list_projects(&self, user_id: i32) -> Result<Vec<Project>, ProjectError> {
        self.repo.list_projects(user_id).await
    }

    pub async fn create_project(
        &self,
        user_id: i32,
        request: ProjectRequest,
    ) -> Result<Project, ProjectError> {
        let draft = validate_project(&request)?;
        let project = self.repo.create_project(user_id, &draft).await?;

        tracing::info!("Created project {} for user_id={}", project.id, user_id);
        Ok(project)
    }

    pub async fn get_project(
        &self,
        user_id: i32,
        project_id: i32,
    ) -> Result<Project, ProjectError> {
        self.repo
            .find_project(user_id, project_id)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn update_project(
        &self,
        user_id: i32,
        project_id: i32,
        request: ProjectRequest,
    ) -> Result<Project, ProjectError> {
        let draft = validate_project(&request)?;
        self.repo
            .update_project(user_id, project_id, &draft)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn delete_project(&self, user_id: i32, project_id: i32) -> Result<(), ProjectError> {
        if !self.repo.delete_project(user_id, project_id).await? {
            return Err(ProjectError::NotFound);
        }

        tracing::info!("Deleted project {} for user_id={}", project_id, user_id);
        Ok(())
    }

    pub async fn list_sections(
        &self,
        user_id: i32,
        project_id: i32,
    ) -> Result<Vec<Section>, ProjectError> {
        let project = self.get_project(user_id, project_id).await?;
        self.repo.list_sections(project.id).await
    }

    pub async fn create_section(
        &self,
        user_id: i32,
        project_id: i32,
        request: SectionRequest,
    ) -> Result<Section, ProjectError> {
        let draft = validate_section(&request)?;
        let project = self.get_project(user_id, project_id).await?;
        let section = self.repo.create_section(project.id, &draft).await?;

        tracing::debug!("Created section {} in project {}", section.id, project.id);
        Ok(section)
    }

    pub async fn update_section(
        &self,
        user_id: i32,
        section_id: i32,
        request: SectionRequest,
    ) -> Result<Section, ProjectError> {
        let draft = validate_section(&request)?;
        self.repo
            .update_section(user_id, section_id, &draft)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn delete_section(&self, user_id: i32, section_id: i32) -> Result<(), ProjectError> {
        if !self.repo.delete_section(user_id, section_id).await? {
            return Err(ProjectError::NotFound);
        }
        Ok(())
    }

    pub async fn list_tasks(
        &self,
        user_id: i32,
        section_id: i32,
    ) -> Result<Vec<Task>, ProjectError> {
        let section = self
            .repo
            .find_section(user_id, section_id)
            .await?
            .ok_or(ProjectError::NotFound)?;
        self.repo.list_tasks(section.id).await
    }

    pub async fn create_task(
        &self,
        user_id: i32,
        section_id: i32,
        request: TaskRequest,
    ) -> Result<Task, ProjectError> {
        let draft = validate_task(request)?;
        let section = self
            .repo
            .find_section(user_id, section_id)
            .await?
            .ok_or(ProjectError::NotFound)?;
        let task = self.repo.create_task(section.id, &draft).await?;

        tracing::debug!("Created task {} in section {}", task.id, section.id);
        Ok(task)
    }

    pub async fn get_task(&self, user_id: i32, task_id: i32) -> Result<Task, ProjectError> {
        self.repo
            .find_task(user_id, task_id)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        request: TaskRequest,
    ) -> Result<Task, ProjectError> {
        let draft = validate_task(request)?;
        self.repo
            .update_task(user_id, task_id, &draft)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<(), ProjectError> {
        if !self.repo.delete_task(user_id, task_id).await? {
            return Err(ProjectError::NotFound);
        }
        Ok(())
    }
}

fn trimmed_name(name: Option<&str>) -> String {
    name.map(str::trim).unwrap_or_default().to_string()
}

/// Codes for the `name` field: empty is NAME_REQUIRED, then the derived rules
fn name_codes(name: &str, draft: &impl Validate) -> Vec<ErrorCode> {
    if name.is_empty() {
        return vec![ErrorCode::NameRequired];
    }
    match draft.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => codes_from(&errors),
    }
}

fn codes_from(errors: &ValidationErrors) -> Vec<ErrorCode> {
    errors
        .field_errors()
        .into_values()
        .flatten()
        .map(|error| match &*error.code {
            "NAME_LENGTH_MISMATCH" => ErrorCode::NameLengthMismatch,
            _ => ErrorCode::UnexpectedError,
        })
        .collect()
}

fn into_result<T>(draft: T, codes: Vec<ErrorCode>) -> Result<T, ProjectError> {
    if codes.is_empty() {
        Ok(draft)
    } else {
        Err(ProjectError::ValidationError(codes))
    }
}

pub fn validate_project(request: &ProjectRequest) -> Result<ProjectDraft, ProjectError> {
    let draft = ProjectDraft {
        name: trimmed_name(request.name.as_deref()),
    };
    let codes = name_codes(&draft.name, &draft);
    into_result(draft, codes)
}

pub fn validate_section(request: &SectionRequest) -> Result<SectionDraft, ProjectError> {
    let draft = SectionDraft {
        name: trimmed_name(request.name.as_deref()),
    };
    let codes = name_codes(&draft.name, &draft);
    into_result(draft, codes)
}

pub fn validate_task(request: TaskRequest) -> Result<TaskDraft, ProjectError> {
    let draft = TaskDraft {
        name: trimmed_name(request.name.as_deref()),
        description: request.description.unwrap_or_default(),
        due_at: request.due_at,
        recurrence: request.recurrence.unwrap_or_default(),
    };

    let mut codes = name_codes(&draft.name, &draft);
    if draft.recurrence.is_recurring() && draft.due_at.is_none() {
        codes.push(ErrorCode::RecurrenceRequiresDueDate);
    }
    into_result(draft, codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::Recurrence;
    use chrono::Utc;

    fn validation_codes<T: std::fmt::Debug>(result: Result<T, ProjectError>) -> Vec<ErrorCode> {
        match result {
            Err(ProjectError::ValidationError(codes)) => codes,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_project_name_is_trimmed() {
        let draft = validate_project(&ProjectRequest {
            name: Some("  Home  ".to_string()),
        })
        .unwrap();
        assert_eq!(draft.name, "Home");
    }

    #[test]
    fn test_project_name_required() {
        for name in [None, Some(String::new()), Some("   ".to_string())] {
            let result = validate_project(&ProjectRequest { name });
            assert_eq!(validation_codes(result), vec![ErrorCode::NameRequired]);
        }
    }

    #[test]
    fn test_name_length_limits() {
        assert!(validate_project(&ProjectRequest { name: Some("a".repeat(25)) }).is_ok());
        assert_eq!(
            validation_codes(validate_project(&ProjectRequest { name: Some("a".repeat(26)) })),
            vec![ErrorCode::NameLengthMismatch]
        );
        assert_eq!(
            validation_codes(validate_section(&SectionRequest { name: Some("b".repeat(26)) })),
            vec![ErrorCode::NameLengthMismatch]
        );

        let long_task = TaskRequest {
            name: Some("c".repeat(200)),
            ..Default::default()
        };
        assert!(validate_task(long_task).is_ok());
        let too_long_task = TaskRequest {
            name: Some("c".repeat(201)),
            ..Default::default()
        };
        assert_eq!(
            validation_codes(validate_task(too_long_task)),
            vec![ErrorCode::NameLengthMismatch]
        );
    }

    #[test]
    fn test_task_defaults() {
        let draft = validate_task(TaskRequest {
            name: Some("Buy milk".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(draft.description, "");
        assert_eq!(draft.recurrence, Recurrence::Never);
        assert!(draft.due_at.is_none());
    }

    #[test]
    fn test_recurring_task_requires_due_date() {
        let result = validate_task(TaskRequest {
            name: Some("Water plants".to_string()),
            recurrence: Some(Recurrence::EveryWeek),
            ..Default::default()
        });
        assert_eq!(
            validation_codes(result),
            vec![ErrorCode::RecurrenceRequiresDueDate]
        );

        let ok = validate_task(TaskRequest {
            name: Some("Water plants".to_string()),
            recurrence: Some(Recurrence::EveryWeek),
            due_at: Some(Utc::now()),
            ..Default::default()
        });
        assert!(ok.is_ok());
    }

    #[test]
    fn test_task_errors_are_collected() {
        let result = validate_task(TaskRequest {
            recurrence: Some(Recurrence::EveryDay),
            ..Default::default()
        });
        assert_eq!(
            validation_codes(result),
            vec![ErrorCode::NameRequired, ErrorCode::RecurrenceRequiresDueDate]
        );
    }

    #[test]
    fn test_recurrence_wire_names() {
        assert_eq!(
            serde_json::to_value(Recurrence::EveryDay).unwrap(),
            serde_json::json!("every_day")
        );
        let parsed: Recurrence = serde_json::from_value(serde_json::json!("every_week")).unwrap();
        assert_eq!(parsed, Recurrence::EveryWeek);
    }
}
