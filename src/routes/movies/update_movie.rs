use super::types::MovieResponse;
use super::util::{
    fetch_active_movie, ownership_failure_response, validate_rating, ACTIVE_MOVIE_CONDITION,
};
use crate::middleware::AuthenticatedUser;
use actix_web::{
    web::{Data, Json, Path},
    HttpMessage, HttpRequest, HttpResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::rc::Rc;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

/// Partial patch. Owner and soft-delete marker are deliberately absent.
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Original title is required"))]
    pub original_title: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Budget cannot be negative"))]
    pub budget: Option<i64>,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration: Option<i32>,
    pub poster_url: Option<String>,
    pub genre: Option<String>,
    #[validate(custom(function = "validate_rating"))]
    pub rating: Option<String>,
    #[validate(range(min = 0, message = "Votes cannot be negative"))]
    pub votes: Option<i32>,
    #[validate(range(min = 0.0, max = 10.0, message = "Score must be between 0 and 10"))]
    pub score: Option<f64>,
    pub language: Option<String>,
    #[validate(range(min = 0, message = "Revenue cannot be negative"))]
    pub revenue: Option<i64>,
}

pub async fn update_movie(
    path: Path<Uuid>,
    body: Json<UpdateMovieRequest>,
    connection: Data<PgPool>,
    req: HttpRequest,
) -> HttpResponse {
    let movie_id = path.into_inner();
    let query_span = tracing::info_span!("Updating movie", %movie_id);

    let is_valid = body.validate();
    if let Err(error) = is_valid {
        let source = error.field_errors();
        for i in source.iter() {
            for err in i.1.iter() {
                if let Some(message) = err.message.as_ref() {
                    tracing::error!("Error: {}", message.as_ref());
                    return HttpResponse::BadRequest().json(json!({
                        "error" : message.as_ref()
                    }));
                }
            }
        }
        return HttpResponse::BadRequest().finish();
    }

    let user = {
        let extension = req.extensions();
        match extension.get::<Rc<AuthenticatedUser>>() {
            Some(user) => user.clone(),
            None => {
                tracing::error!("User field not found in req object");
                return HttpResponse::NotFound().json(json!({
                    "error": "user not found"
                }));
            }
        }
    };

    // Ownership is part of the write predicate, so the check and the mutation
    // cannot be separated by a concurrent delete.
    let update_query = format!(
        r#"
            UPDATE movies SET
                title = COALESCE($1, title),
                original_title = COALESCE($2, original_title),
                release_date = COALESCE($3, release_date),
                description = COALESCE($4, description),
                budget = COALESCE($5, budget),
                duration = COALESCE($6, duration),
                poster_url = COALESCE($7, poster_url),
                genre = COALESCE($8, genre),
                rating = COALESCE($9, rating),
                votes = COALESCE($10, votes),
                score = COALESCE($11, score),
                language = COALESCE($12, language),
                revenue = COALESCE($13, revenue),
                updated_at = $14
            WHERE id = $15 AND user_id = $16 AND {}
            RETURNING id
        "#,
        ACTIVE_MOVIE_CONDITION
    );

    let update_result = sqlx::query_scalar::<_, Uuid>(update_query.as_str())
        .bind(body.title.as_deref())
        .bind(body.original_title.as_deref())
        .bind(body.release_date)
        .bind(body.description.as_deref())
        .bind(body.budget)
        .bind(body.duration)
        .bind(body.poster_url.as_deref())
        .bind(body.genre.as_deref())
        .bind(body.rating.as_deref())
        .bind(body.votes)
        .bind(body.score)
        .bind(body.language.as_deref())
        .bind(body.revenue)
        .bind(Utc::now())
        .bind(movie_id)
        .bind(user.id)
        .fetch_optional(connection.get_ref())
        .instrument(query_span.clone())
        .await;

    match update_result {
        Ok(Some(_)) => {}
        Ok(None) => {
            return ownership_failure_response(
                connection.get_ref(),
                movie_id,
                user.id,
                query_span,
            )
            .await;
        }
        Err(err) => {
            tracing::error!("Database error {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }));
        }
    }
    tracing::info!("Movie updated successfully");

    match fetch_active_movie(connection.get_ref(), movie_id, query_span).await {
        Ok(Some(record)) => HttpResponse::Ok().json(MovieResponse::new(record)),
        Ok(None) => {
            tracing::error!("Movie {} not found after update", movie_id);
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
