use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::util::{compute_profit, release_status};
use crate::storage::Storage;

/// A movie row joined with its owner's public columns.
#[derive(Debug, sqlx::FromRow)]
pub struct MovieRecord {
    pub id: Uuid,
    pub title: String,
    pub original_title: String,
    pub release_date: NaiveDate,
    pub description: String,
    pub budget: Option<i64>,
    pub duration: i32,
    pub poster_url: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub votes: Option<i32>,
    pub score: Option<f64>,
    pub language: Option<String>,
    pub revenue: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub original_title: String,
    pub release_date: NaiveDate,
    pub description: String,
    pub budget: Option<i64>,
    pub duration: i32,
    pub poster_url: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub votes: Option<i32>,
    pub score: Option<f64>,
    pub language: Option<String>,
    pub revenue: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: OwnerSummary,
    pub profit: Option<i64>,
    pub status: String,
}

impl MovieResponse {
    /// Serializes a record with its derived fields. The stored poster key is
    /// passed through untouched.
    pub fn new(record: MovieRecord) -> MovieResponse {
        let profit = compute_profit(record.budget, record.revenue);
        let status = release_status(record.release_date).to_string();
        MovieResponse {
            id: record.id,
            title: record.title,
            original_title: record.original_title,
            release_date: record.release_date,
            description: record.description,
            budget: record.budget,
            duration: record.duration,
            poster_url: record.poster_url,
            genre: record.genre,
            rating: record.rating,
            votes: record.votes,
            score: record.score,
            language: record.language,
            revenue: record.revenue,
            deleted_at: record.deleted_at,
            user_id: record.user_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user: OwnerSummary {
                id: record.user_id,
                name: record.owner_name,
                email: record.owner_email,
            },
            profit,
            status,
        }
    }

    /// Same as [`MovieResponse::new`] but resolves the stored poster key into
    /// a time-limited signed URL. The key itself is never mutated.
    pub async fn with_signed_poster(
        record: MovieRecord,
        storage: &Storage,
    ) -> Result<MovieResponse, String> {
        let mut response = MovieResponse::new(record);
        if let Some(key) = response.poster_url.take() {
            response.poster_url = Some(storage.presign_get(key.as_str()).await?);
        }
        Ok(response)
    }
}
