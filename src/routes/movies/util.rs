use std::borrow::Cow;

use actix_web::{
    dev::HttpServiceFactory,
    web::{self, delete, get, patch, post},
    HttpResponse,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use tracing::{Instrument, Span};
use uuid::Uuid;
use validator::ValidationError;

use super::types::MovieRecord;
use super::{
    create_movie, delete_movie, get_movie, list_movies, update_movie, upload_poster,
};
use crate::middleware::{Authentication, TokenIssuer};

pub fn movie_source(db_pool: &PgPool, token_issuer: &TokenIssuer) -> impl HttpServiceFactory {
    web::scope("/movies")
        .wrap(Authentication::new(db_pool.clone(), token_issuer.clone()))
        .route("/upload-poster", post().to(upload_poster))
        .route("", get().to(list_movies))
        .route("", post().to(create_movie))
        .route("/{id}", get().to(get_movie))
        .route("/{id}", patch().to(update_movie))
        .route("/{id}", delete().to(delete_movie))
}

const ALLOWED_RATINGS: &[&str] = &["L", "10", "12", "14", "16", "18"];

pub fn validate_rating(rating: &str) -> Result<(), ValidationError> {
    if !ALLOWED_RATINGS.contains(&rating) {
        return Err(ValidationError::new("Invalid rating")
            .with_message(Cow::from("Rating must be one of: L, 10, 12, 14, 16 or 18")));
    }
    Ok(())
}

pub fn compute_profit(budget: Option<i64>, revenue: Option<i64>) -> Option<i64> {
    match (budget, revenue) {
        (Some(budget), Some(revenue)) => Some(revenue - budget),
        _ => None,
    }
}

pub fn release_status(release_date: NaiveDate) -> &'static str {
    if release_date <= Utc::now().date_naive() {
        "Released"
    } else {
        "Upcoming"
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// The soft-delete guard. Every read and write path appends this condition
/// instead of restating it, so a movie with a `deleted_at` marker is invisible
/// everywhere at once.
pub const ACTIVE_MOVIE_CONDITION: &str = "deleted_at IS NULL";

pub async fn fetch_active_movie(
    db_pool: &PgPool,
    movie_id: Uuid,
    query_span: Span,
) -> Result<Option<MovieRecord>, sqlx::Error> {
    let query = format!(
        r#"
            SELECT m.*, u.name AS owner_name, u.email AS owner_email
            FROM movies m
            JOIN users u ON u.id = m.user_id
            WHERE m.id = $1 AND {}
        "#,
        ACTIVE_MOVIE_CONDITION
    );
    sqlx::query_as::<_, MovieRecord>(query.as_str())
        .bind(movie_id)
        .fetch_optional(db_pool)
        .instrument(query_span)
        .await
}

/// Classifies a conditional write that matched no row: the movie is either
/// gone (absent or soft-deleted) or owned by someone else.
pub async fn ownership_failure_response(
    db_pool: &PgPool,
    movie_id: Uuid,
    requester_id: Uuid,
    query_span: Span,
) -> HttpResponse {
    let query = format!(
        "SELECT user_id FROM movies WHERE id = $1 AND {}",
        ACTIVE_MOVIE_CONDITION
    );
    let owner = sqlx::query_scalar::<_, Uuid>(query.as_str())
        .bind(movie_id)
        .fetch_optional(db_pool)
        .instrument(query_span)
        .await;

    match owner {
        Ok(Some(owner_id)) if owner_id != requester_id => {
            tracing::error!("User {} does not own movie {}", requester_id, movie_id);
            HttpResponse::Forbidden().json(json!({
                "error": "You do not have permission to perform this action"
            }))
        }
        Ok(_) => {
            tracing::error!("Movie {} not found", movie_id);
            HttpResponse::NotFound().json(json!({
                "error": "Movie not found"
            }))
        }
        Err(err) => {
            tracing::error!("Database error {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn profit_requires_both_budget_and_revenue() {
        assert_eq!(compute_profit(Some(1_000_000), Some(2_500_000)), Some(1_500_000));
        assert_eq!(compute_profit(None, Some(2_500_000)), None);
        assert_eq!(compute_profit(Some(1_000_000), None), None);
    }

    #[test]
    fn release_status_splits_on_today() {
        let today = Utc::now().date_naive();
        assert_eq!(release_status(today), "Released");
        assert_eq!(release_status(today - Duration::days(365)), "Released");
        assert_eq!(release_status(today + Duration::days(1)), "Upcoming");
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn rating_must_come_from_the_fixed_set() {
        for rating in ["L", "10", "12", "14", "16", "18"] {
            assert!(validate_rating(rating).is_ok());
        }
        assert!(validate_rating("PG-13").is_err());
        assert!(validate_rating("l").is_err());
    }
}
