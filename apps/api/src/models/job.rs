use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: Vec<String>,
    #[serde(rename = "recruiter")]
    pub recruiter_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job joined with its recruiter's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct JobWithRecruiterRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: Vec<String>,
    pub recruiter_id: Uuid,
    pub recruiter_full_name: String,
    pub recruiter_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: Vec<String>,
    pub recruiter: RecruiterSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobWithRecruiterRow> for JobListing {
    fn from(row: JobWithRecruiterRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            skills_required: row.skills_required,
            recruiter: RecruiterSummary {
                id: row.recruiter_id,
                full_name: row.recruiter_full_name,
                email: row.recruiter_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
