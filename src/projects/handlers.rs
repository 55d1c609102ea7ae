// HTTP handlers for project, section and task endpoints

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::middleware::AuthenticatedUser;
use crate::projects::{
    extract::{ProjectJson, ResourceId},
    Project, ProjectError, ProjectRequest, ProjectService, Section, SectionRequest, Task,
    TaskRequest,
};

/// Handler for GET /projects/
#[utoipa::path(
    get,
    path = "/projects/",
    responses(
        (status = 200, description = "Projects of the caller", body = Vec<Project>),
        (status = 401, description = "No valid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_projects_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Project>>, ProjectError> {
    Ok(Json(service.list_projects(user.user_id).await?))
}

/// Handler for POST /projects/
#[utoipa::path(
    post,
    path = "/projects/",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid name or duplicate", body = crate::error::ErrorBody,
            example = json!({"errors": ["PROJECT_ALREADY_EXISTS"]})),
        (status = 401, description = "No valid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_project_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ProjectJson(request): ProjectJson<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ProjectError> {
    let project = service.create_project(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Handler for GET /projects/{id}/
#[utoipa::path(
    get,
    path = "/projects/{id}/",
    params(("id" = i32, Path, description = "Project id")),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 404, description = "No such project", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn get_project_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(project_id): ResourceId,
) -> Result<Json<Project>, ProjectError> {
    Ok(Json(service.get_project(user.user_id, project_id).await?))
}

/// Handler for PUT /projects/{id}/
#[utoipa::path(
    put,
    path = "/projects/{id}/",
    params(("id" = i32, Path, description = "Project id")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project renamed", body = Project),
        (status = 400, description = "Invalid name or duplicate", body = crate::error::ErrorBody),
        (status = 404, description = "No such project", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_project_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(project_id): ResourceId,
    ProjectJson(request): ProjectJson<ProjectRequest>,
) -> Result<Json<Project>, ProjectError> {
    Ok(Json(
        service
            .update_project(user.user_id, project_id, request)
            .await?,
    ))
}

/// Handler for DELETE /projects/{id}/
#[utoipa::path(
    delete,
    path = "/projects/{id}/",
    params(("id" = i32, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project and its sections and tasks deleted"),
        (status = 404, description = "No such project", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_project_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(project_id): ResourceId,
) -> Result<StatusCode, ProjectError> {
    service.delete_project(user.user_id, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /projects/{id}/sections/
#[utoipa::path(
    get,
    path = "/projects/{id}/sections/",
    params(("id" = i32, Path, description = "Project id")),
    responses(
        (status = 200, description = "Sections of the project", body = Vec<Section>),
        (status = 404, description = "No such project", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_sections_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(project_id): ResourceId,
) -> Result<Json<Vec<Section>>, ProjectError> {
    Ok(Json(service.list_sections(user.user_id, project_id).await?))
}

/// Handler for POST /projects/{id}/sections/
#[utoipa::path(
    post,
    path = "/projects/{id}/sections/",
    params(("id" = i32, Path, description = "Project id")),
    request_body = SectionRequest,
    responses(
        (status = 201, description = "Section created", body = Section),
        (status = 400, description = "Invalid name or duplicate", body = crate::error::ErrorBody),
        (status = 404, description = "No such project", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_section_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(project_id): ResourceId,
    ProjectJson(request): ProjectJson<SectionRequest>,
) -> Result<(StatusCode, Json<Section>), ProjectError> {
    let section = service
        .create_section(user.user_id, project_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(section)))
}

/// Handler for PUT /sections/{id}/
#[utoipa::path(
    put,
    path = "/sections/{id}/",
    params(("id" = i32, Path, description = "Section id")),
    request_body = SectionRequest,
    responses(
        (status = 200, description = "Section renamed", body = Section),
        (status = 400, description = "Invalid name or duplicate", body = crate::error::ErrorBody),
        (status = 404, description = "No such section", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_section_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(section_id): ResourceId,
    ProjectJson(request): ProjectJson<SectionRequest>,
) -> Result<Json<Section>, ProjectError> {
    Ok(Json(
        service
            .update_section(user.user_id, section_id, request)
            .await?,
    ))
}

/// Handler for DELETE /sections/{id}/
#[utoipa::path(
    delete,
    path = "/sections/{id}/",
    params(("id" = i32, Path, description = "Section id")),
    responses(
        (status = 204, description = "Section and its tasks deleted"),
        (status = 404, description = "No such section", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_section_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(section_id): ResourceId,
) -> Result<StatusCode, ProjectError> {
    service.delete_section(user.user_id, section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /sections/{id}/tasks/
#[utoipa::path(
    get,
    path = "/sections/{id}/tasks/",
    params(("id" = i32, Path, description = "Section id")),
    responses(
        (status = 200, description = "Tasks of the section", body = Vec<Task>),
        (status = 404, description = "No such section", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_tasks_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(section_id): ResourceId,
) -> Result<Json<Vec<Task>>, ProjectError> {
    Ok(Json(service.list_tasks(user.user_id, section_id).await?))
}

/// Handler for POST /sections/{id}/tasks/
#[utoipa::path(
    post,
    path = "/sections/{id}/tasks/",
    params(("id" = i32, Path, description = "Section id")),
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid task or duplicate name",
            body = crate::error::ErrorBody,
            example = json!({"errors": ["RECURRENCE_REQUIRES_DUE_DATE"]})),
        (status = 404, description = "No such section", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_task_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(section_id): ResourceId,
    ProjectJson(request): ProjectJson<TaskRequest>,
) -> Result<(StatusCode, Json<Task>), ProjectError> {
    let task = service.create_task(user.user_id, section_id, request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for GET /tasks/{id}/
#[utoipa::path(
    get,
    path = "/tasks/{id}/",
    params(("id" = i32, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "No such task", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn get_task_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(task_id): ResourceId,
) -> Result<Json<Task>, ProjectError> {
    Ok(Json(service.get_task(user.user_id, task_id).await?))
}

/// Handler for PUT /tasks/{id}/
#[utoipa::path(
    put,
    path = "/tasks/{id}/",
    params(("id" = i32, Path, description = "Task id")),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task replaced", body = Task),
        (status = 400, description = "Invalid task or duplicate name",
            body = crate::error::ErrorBody),
        (status = 404, description = "No such task", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_task_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(task_id): ResourceId,
    ProjectJson(request): ProjectJson<TaskRequest>,
) -> Result<Json<Task>, ProjectError> {
    Ok(Json(service.update_task(user.user_id, task_id, request).await?))
}

/// Handler for DELETE /tasks/{id}/
#[utoipa::path(
    delete,
    path = "/tasks/{id}/",
    params(("id" = i32, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "No such task", body = crate::error::ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_task_handler(
    State(service): State<Arc<ProjectService>>,
    user: AuthenticatedUser,
    ResourceId(task_id): ResourceId,
) -> Result<StatusCode, ProjectError> {
    service.delete_task(user.user_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
