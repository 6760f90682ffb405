use super::types::{MovieRecord, MovieResponse};
use super::util::validate_rating;
use crate::middleware::AuthenticatedUser;
use crate::storage::Storage;
use actix_web::{
    web::{Data, Json},
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

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Original title is required"))]
    pub original_title: String,
    pub release_date: NaiveDate,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0, message = "Budget cannot be negative"))]
    pub budget: Option<i64>,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration: i32,
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

pub async fn create_movie(
    body: Json<CreateMovieRequest>,
    connection: Data<PgPool>,
    storage: Data<Storage>,
    req: HttpRequest,
) -> HttpResponse {
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

    let query_span = tracing::info_span!("Saving new movie in the database");
    let body = body.into_inner();
    let movie_id = Uuid::new_v4();
    let now = Utc::now();

    let result = sqlx::query(
        r#"
            INSERT INTO movies (id, title, original_title, release_date, description, budget,
                duration, poster_url, genre, rating, votes, score, language, revenue,
                user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(movie_id)
    .bind(body.title.as_str())
    .bind(body.original_title.as_str())
    .bind(body.release_date)
    .bind(body.description.as_str())
    .bind(body.budget)
    .bind(body.duration)
    .bind(body.poster_url.as_deref())
    .bind(body.genre.as_deref())
    .bind(body.rating.as_deref())
    .bind(body.votes)
    .bind(body.score)
    .bind(body.language.as_deref())
    .bind(body.revenue)
    .bind(user.id)
    .bind(now)
    .bind(now)
    .execute(connection.get_ref())
    .instrument(query_span)
    .await;

    if let Err(err) = result {
        tracing::error!("Failed to create movie {:?}", err);
        return HttpResponse::InternalServerError().json(json!({
            "error": "Failed to create movie"
        }));
    }
    tracing::info!("Movie created successfully");

    let record = MovieRecord {
        id: movie_id,
        title: body.title,
        original_title: body.original_title,
        release_date: body.release_date,
        description: body.description,
        budget: body.budget,
        duration: body.duration,
        poster_url: body.poster_url,
        genre: body.genre,
        rating: body.rating,
        votes: body.votes,
        score: body.score,
        language: body.language,
        revenue: body.revenue,
        deleted_at: None,
        user_id: user.id,
        created_at: now,
        updated_at: now,
        owner_name: user.name.clone(),
        owner_email: user.email.clone(),
    };

    match MovieResponse::with_signed_poster(record, storage.get_ref()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(err) => {
            tracing::error!("Failed to sign poster url {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }))
        }
    }
}
