//! Axum route handlers for registration, login and profile.

use anyhow::Context;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::extractors::ApiJson;
use crate::models::user::{Role, UserProfile, UserRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

/// Fields of a registration that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let email = required(self.email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation("email is not a valid address".to_string()));
        }
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("password is required".to_string()))?;
        let full_name = required(self.full_name, "fullName")?;
        let role = required(self.role, "role")?
            .parse::<Role>()
            .map_err(AppError::Validation)?;
        Ok(NewUser {
            email,
            password,
            full_name,
            role,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let new_user = request.validate()?;

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&new_user.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("User already exists.".to_string()));
    }

    let password_hash = hash_password(new_user.password).await?;
    let id = Uuid::new_v4();

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, full_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(&new_user.full_name)
    .bind(&new_user.email)
    .bind(&password_hash)
    .bind(new_user.role)
    .execute(&state.db)
    .await;

    match inserted {
        Ok(_) => {}
        // Lost a race with a concurrent registration for the same email.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::Validation("User already exists.".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    info!("Registered {} user {id}", new_user.role);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully." })),
    ))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError::Validation("Invalid email or password.".to_string());

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(request.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let token = state
        .tokens
        .issue(user.id, &user.email, user.role)
        .context("failed to sign session token")?;

    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            full_name: user.full_name,
            role: user.role,
        },
    }))
}

/// GET /auth/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let applied_jobs: Vec<Uuid> = sqlx::query_scalar(
        "SELECT job_id FROM applications WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(UserProfile::from_row(row, applied_jobs)))
}
