//! Axum route handler for resume upload.
//!
//! RECEIVED → EXTRACTED → QUERIED → NORMALIZED → RESPONDED, with the uploaded
//! file released on every path once a file exists.

use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::llm_client::{CompletionClient, LlmError};
use crate::resume::document::ResumeDocument;
use crate::resume::extractor::extract;
use crate::resume::models::{ParsedResume, UploadResponse};
use crate::resume::normalizer::normalize;
use crate::resume::profiles::apply_profiles;
use crate::resume::prompts::{build_resume_prompt, RESUME_PROMPT_VERSION};
use crate::state::AppState;

/// Multipart field carrying the PDF.
const RESUME_FIELD: &str = "resume";

/// POST /upload
///
/// Extracts text and links from the uploaded PDF, asks the model for a
/// structured record and returns it.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_resume_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded.".to_string()))?;

    let document = ResumeDocument::create(&state.config.upload_dir, upload).await?;
    info!(
        "Received resume from {} ({} bytes)",
        user.email,
        document.size()
    );

    let outcome = run_pipeline(state.llm.as_ref(), state.config.ai_timeout, &document).await;
    document.release();
    let parsed = outcome?;

    if let Err(e) = store_parsed_resume(&state.db, user.id, &parsed).await {
        warn!("Could not store parsed resume for user {}: {e}", user.id);
    }

    Ok(Json(UploadResponse {
        success: true,
        message: "Resume processed successfully.".to_string(),
        data: parsed,
    }))
}

/// Returns the bytes of the first `resume` file part, if any.
async fn read_resume_field(multipart: &mut Multipart) -> Result<Option<Bytes>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) || field.file_name().is_none() {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty.".to_string()));
        }
        return Ok(Some(bytes));
    }
    Ok(None)
}

/// Body-limit overruns surface as 413, everything else as a bad request.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large.".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

async fn run_pipeline(
    llm: &dyn CompletionClient,
    ai_timeout: Duration,
    document: &ResumeDocument,
) -> Result<ParsedResume, AppError> {
    let bytes = document.read().await?;

    let extracted = tokio::task::spawn_blocking(move || extract(&bytes))
        .await
        .context("PDF extraction task failed")??;
    info!(
        "Extracted {} page(s) and {} link(s)",
        extracted.pages,
        extracted.links.len()
    );
    debug!("Extracted PDF text: {}", extracted.text);

    let prompt = build_resume_prompt(&extracted.text, &extracted.links);
    debug!("Prompting with template {RESUME_PROMPT_VERSION}");

    let raw = tokio::time::timeout(ai_timeout, llm.complete(&prompt))
        .await
        .map_err(|_| LlmError::Timeout(ai_timeout))??;

    let mut parsed = normalize(&raw)?;
    apply_profiles(&mut parsed, &extracted.links);
    Ok(parsed)
}

async fn store_parsed_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume: &ParsedResume,
) -> Result<(), AppError> {
    let data = serde_json::to_value(resume).context("failed to encode parsed resume")?;
    sqlx::query("UPDATE users SET resume = $1, updated_at = now() WHERE id = $2")
        .bind(data)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::models::user::Role;
    use crate::routes::build_router;
    use crate::testing::{bearer, build_pdf, multipart_body, test_state, FakeLlm, BOUNDARY};

    fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::AUTHORIZATION, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upload_dir_is_empty(dir: &std::path::Path) -> bool {
        match std::fs::read_dir(dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_upload_parses_resume_and_recognizes_github() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply(
            "```json\n{\"name\": \"John Doe\", \"email\": \"john@x.com\", \"phone\": \"not found\", \
             \"links\": [\"https://github.com/johndoe\"], \"github\": \"https://github.com/johndoe\"}\n```",
        ));
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);

        let pdf = build_pdf(&[("John Doe john@x.com", &["https://github.com/johndoe"])]);
        let response = build_router(state)
            .oneshot(upload_request(&token, multipart_body("resume", Some("cv.pdf"), &pdf)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Resume processed successfully.");
        assert_eq!(body["data"]["name"], "John Doe");
        assert_eq!(body["data"]["email"], "john@x.com");
        assert_eq!(body["data"]["phone"], "not found");
        assert_eq!(
            body["data"]["links"],
            serde_json::json!(["https://github.com/johndoe"])
        );
        assert_eq!(body["data"]["github"], "https://github.com/johndoe");
        assert_eq!(body["data"]["linkedIn"], "not found");

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("John Doe john@x.com"));
        assert!(prompts[0].contains("https://github.com/johndoe"));
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply("{}"));
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);

        let body = multipart_body("comment", None, b"hello");
        let response = build_router(state)
            .oneshot(upload_request(&token, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls(), 0);
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_ai_failure_is_server_error_and_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::failing());
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);

        let pdf = build_pdf(&[("Jane Roe", &[])]);
        let response = build_router(state)
            .oneshot(upload_request(&token, multipart_body("resume", Some("cv.pdf"), &pdf)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert_eq!(llm.calls(), 1);
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_ai_timeout_is_server_error_and_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::hanging());
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);

        let pdf = build_pdf(&[("Jane Roe", &[])]);
        let response = build_router(state)
            .oneshot(upload_request(&token, multipart_body("resume", Some("cv.pdf"), &pdf)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_unparseable_ai_output_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply("I could not read this resume, sorry."));
        let state = test_state(llm, dir.path());
        let token = bearer(&state, Role::Candidate);

        let pdf = build_pdf(&[("Jane Roe", &[])]);
        let response = build_router(state)
            .oneshot(upload_request(&token, multipart_body("resume", Some("cv.pdf"), &pdf)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MALFORMED_AI_RESPONSE");
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_fails_before_ai_call() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply("{}"));
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);

        let body = multipart_body("resume", Some("cv.pdf"), b"plain text, not a pdf");
        let response = build_router(state)
            .oneshot(upload_request(&token, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNREADABLE_PDF");
        assert_eq!(llm.calls(), 0);
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply("{}"));
        let state = test_state(llm.clone(), dir.path());
        let token = bearer(&state, Role::Candidate);
        let oversized = vec![b'x'; state.config.max_upload_bytes + 1];

        let response = build_router(state)
            .oneshot(upload_request(
                &token,
                multipart_body("resume", Some("cv.pdf"), &oversized),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(llm.calls(), 0);
        assert!(upload_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::reply("{}"));
        let state = test_state(llm.clone(), dir.path());

        let pdf = build_pdf(&[("Jane Roe", &[])]);
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body("resume", Some("cv.pdf"), &pdf)))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(llm.calls(), 0);
    }
}
