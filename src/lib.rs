pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod projects;
pub mod validation;

use axum::{extract::FromRef, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, PgTokenLedger, PgUserRepository};
use config::AuthConfig;
use projects::{ProjectService, ProjectsRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::password_requirements_handler,
        auth::handlers::login_handler,
        auth::handlers::renew_handler,
        auth::handlers::logout_handler,
        auth::handlers::logout_all_handler,
        projects::handlers::list_projects_handler,
        projects::handlers::create_project_handler,
        projects::handlers::get_project_handler,
        projects::handlers::update_project_handler,
        projects::handlers::delete_project_handler,
        projects::handlers::list_sections_handler,
        projects::handlers::create_section_handler,
        projects::handlers::update_section_handler,
        projects::handlers::delete_section_handler,
        projects::handlers::list_tasks_handler,
        projects::handlers::create_task_handler,
        projects::handlers::get_task_handler,
        projects::handlers::update_task_handler,
        projects::handlers::delete_task_handler,
    ),
    components(
        schemas(
            error::ErrorBody,
            error::ErrorCode,
            auth::models::SignupRequest,
            auth::models::LoginRequest,
            auth::models::RefreshTokenRequest,
            auth::models::SessionResponse,
            auth::models::RenewResponse,
            auth::models::PasswordRequirementsResponse,
            auth::models::EmptyResponse,
            projects::Project,
            projects::Section,
            projects::Task,
            projects::Recurrence,
            projects::ProjectRequest,
            projects::SectionRequest,
            projects::TaskRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Signup, login, token renewal and logout"),
        (name = "projects", description = "Projects, sections and tasks of the caller")
    ),
    info(
        title = "Spellblade API",
        version = "0.1.0",
        description = "Account and session management with a small task tracker"
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub projects: Arc<ProjectService>,
}

impl AppState {
    /// Wire the PostgreSQL-backed stores into the services
    pub fn new(pool: PgPool, config: &AuthConfig) -> Self {
        let auth = AuthService::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTokenLedger::new(pool.clone())),
            config,
        );
        let projects = ProjectService::new(ProjectsRepository::new(pool));

        Self {
            auth: Arc::new(auth),
            projects: Arc::new(projects),
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<ProjectService> {
    fn from_ref(state: &AppState) -> Self {
        state.projects.clone()
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(auth::router())
        .merge(projects::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
