//! Recruiter-facing candidate directory.

use axum::{extract::State, Json};

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::user::{Role, StudentRow};
use crate::state::AppState;

/// GET /students
///
/// Every candidate with the last resume they uploaded.
pub async fn handle_list_students(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<StudentRow>>, AppError> {
    user.require_role(Role::Recruiter, "Access denied.")?;

    let students = sqlx::query_as::<_, StudentRow>(
        "SELECT id, full_name, email, resume FROM users WHERE role = $1 ORDER BY full_name",
    )
    .bind(Role::Candidate)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(students))
}
