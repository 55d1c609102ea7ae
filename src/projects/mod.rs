// Projects module
// Per-user projects, their sections and the tasks inside them

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::*;
pub use models::*;
pub use repository::*;
pub use service::*;

use axum::{
    extract::FromRef,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::auth::AuthService;

/// Routes for projects, sections and tasks; all require a bearer token
pub fn router<S>() -> Router<S>
where
    Arc<ProjectService>: FromRef<S>,
    Arc<AuthService>: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/projects/",
            get(handlers::list_projects_handler).post(handlers::create_project_handler),
        )
        .route(
            "/projects/:id/",
            get(handlers::get_project_handler)
                .put(handlers::update_project_handler)
                .delete(handlers::delete_project_handler),
        )
        .route(
            "/projects/:id/sections/",
            get(handlers::list_sections_handler).post(handlers::create_section_handler),
        )
        .route(
            "/sections/:id/",
            put(handlers::update_section_handler)
                .delete(handlers::delete_section_handler),
        )
        .route(
            "/sections/:id/tasks/",
            get(handlers::list_tasks_handler).post(handlers::create_task_handler),
        )
        .route(
            "/tasks/:id/",
            get(handlers::get_task_handler)
                .put(handlers::update_task_handler)
                .delete(handlers::delete_task_handler),
        )
}
