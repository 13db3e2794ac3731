pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::students;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/profile", get(auth::handle_profile))
        // Jobs
        .route(
            "/jobs",
            get(jobs::handle_list_own_jobs).post(jobs::handle_create_job),
        )
        .route("/jobs/all", get(jobs::handle_list_all_jobs))
        .route("/jobs/apply/:job_id", post(jobs::handle_apply))
        // Students
        .route("/students", get(students::handle_list_students))
        // Resume ingestion
        .route(
            "/upload",
            post(resume::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
