//! Axum route handlers for job postings and applications.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::extractors::{ApiJson, ApiPath};
use crate::models::job::{JobListing, JobRow, JobWithRecruiterRow};
use crate::models::user::Role;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills_required: Vec<String>,
}

impl CreateJobRequest {
    fn validate(mut self) -> Result<Self, AppError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        if self.title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        if self.description.is_empty() {
            return Err(AppError::Validation("description cannot be empty".to_string()));
        }
        self.skills_required = self
            .skills_required
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub message: String,
    pub job: JobRow,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /jobs
///
/// Jobs posted by the calling recruiter, newest first.
pub async fn handle_list_own_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<JobRow>>, AppError> {
    user.require_role(
        Role::Recruiter,
        "Access denied. Only recruiters can view jobs.",
    )?;

    let jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs))
}

/// GET /jobs/all
///
/// Every job with its recruiter's public fields. No authentication.
pub async fn handle_list_all_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobListing>>, AppError> {
    let rows = sqlx::query_as::<_, JobWithRecruiterRow>(
        r#"
        SELECT j.id, j.title, j.description, j.skills_required, j.recruiter_id,
               u.full_name AS recruiter_full_name, u.email AS recruiter_email,
               j.created_at, j.updated_at
        FROM jobs j
        JOIN users u ON u.id = j.recruiter_id
        ORDER BY j.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(JobListing::from).collect()))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    user.require_role(
        Role::Recruiter,
        "Access denied. Only recruiters can create jobs.",
    )?;
    let request = request.validate()?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (id, title, description, skills_required, recruiter_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.skills_required)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    info!("Recruiter {} created job {}", user.id, job.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            message: "Job created successfully.".to_string(),
            job,
        }),
    ))
}

/// POST /jobs/apply/:jobId
///
/// Applying twice is a no-op.
pub async fn handle_apply(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(job_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    user.require_role(Role::Candidate, "Only candidates can apply for jobs.")?;

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    sqlx::query(
        r#"
        INSERT INTO applications (user_id, job_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, job_id) DO NOTHING
        "#,
    )
    .bind(user.id)
    .bind(job_id)
    .execute(&state.db)
    .await?;

    Ok(Json(json!({ "message": "Applied for the job successfully!" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;
    use crate::testing::{bearer, test_state, FakeLlm};

    fn app(role: Option<Role>) -> (axum::Router, Option<String>) {
        let dir = std::env::temp_dir();
        let state = test_state(Arc::new(FakeLlm::reply("{}")), &dir);
        let token = role.map(|r| bearer(&state, r));
        (build_router(state), token)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(body).unwrap()
    }

    #[tokio::test]
    async fn test_list_own_jobs_without_token_is_unauthorized() {
        let (app, _) = app(None);
        let response = app
            .oneshot(request("GET", "/jobs", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_forbidden() {
        let (app, _) = app(None);
        let response = app
            .oneshot(request("GET", "/jobs", Some("Bearer not-a-jwt"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_candidate_cannot_list_or_create_jobs() {
        let (app, token) = app(Some(Role::Candidate));
        let response = app
            .clone()
            .oneshot(request("GET", "/jobs", token.as_deref(), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = Body::from(r#"{"title":"Rustacean","description":"Write Rust","skillsRequired":["rust"]}"#);
        let response = app
            .oneshot(request("POST", "/jobs", token.as_deref(), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_recruiter_cannot_apply() {
        let (app, token) = app(Some(Role::Recruiter));
        let uri = format!("/jobs/apply/{}", Uuid::new_v4());
        let response = app
            .oneshot(request("POST", &uri, token.as_deref(), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_job_without_title_is_validation_error() {
        let (app, token) = app(Some(Role::Recruiter));
        let body = Body::from(r#"{"description":"Write Rust"}"#);
        let response = app
            .oneshot(request("POST", "/jobs", token.as_deref(), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn test_apply_with_malformed_job_id_is_validation_error() {
        let (app, token) = app(Some(Role::Candidate));
        let response = app
            .oneshot(request("POST", "/jobs/apply/not-a-uuid", token.as_deref(), Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateJobRequest {
            title: "  Backend Engineer ".to_string(),
            description: "Build APIs".to_string(),
            skills_required: vec!["rust".to_string(), " ".to_string()],
        }
        .validate()
        .unwrap();
        assert_eq!(ok.title, "Backend Engineer");
        assert_eq!(ok.skills_required, vec!["rust".to_string()]);

        let blank = CreateJobRequest {
            title: " ".to_string(),
            description: "Build APIs".to_string(),
            skills_required: vec![],
        };
        assert!(blank.validate().is_err());
    }
}
