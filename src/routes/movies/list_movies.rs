use super::types::{MovieRecord, MovieResponse};
use super::util::{total_pages, ACTIVE_MOVIE_CONDITION};
use crate::storage::Storage;
use actix_web::{
    web::{Data, Query},
    HttpResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;
use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieFilters {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, message = "Limit must be at least 1"))]
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[validate(range(min = 1, message = "Minimum duration must be at least 1"))]
    pub min_duration: Option<i32>,
    #[validate(range(min = 1, message = "Maximum duration must be at least 1"))]
    pub max_duration: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub genre: Option<String>,
}

fn movie_filter_condition() -> String {
    format!(
        r#"{}
            AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR original_title ILIKE '%' || $1 || '%')
            AND ($2::int IS NULL OR duration >= $2)
            AND ($3::int IS NULL OR duration <= $3)
            AND ($4::date IS NULL OR release_date >= $4)
            AND ($5::date IS NULL OR release_date <= $5)
            AND ($6::text IS NULL OR genre ILIKE '%' || $6 || '%')"#,
        ACTIVE_MOVIE_CONDITION
    )
}

pub async fn list_movies(
    info: Query<MovieFilters>,
    connection: Data<PgPool>,
    storage: Data<Storage>,
) -> HttpResponse {
    let query_span = tracing::info_span!("Listing movies");

    let is_valid = info.validate();
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

    let page = info.page.unwrap_or(1);
    let limit = info.limit.unwrap_or(10);
    let skip = (page - 1) * limit;
    let condition = movie_filter_condition();

    let count_query = format!("SELECT COUNT(*) FROM movies WHERE {}", condition);
    let total_result = sqlx::query_scalar::<_, i64>(count_query.as_str())
        .bind(info.search.as_deref())
        .bind(info.min_duration)
        .bind(info.max_duration)
        .bind(info.start_date)
        .bind(info.end_date)
        .bind(info.genre.as_deref())
        .fetch_one(connection.get_ref())
        .instrument(query_span.clone())
        .await;

    let total = match total_result {
        Ok(total) => total,
        Err(err) => {
            tracing::error!("Database error {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }));
        }
    };

    let select_query = format!(
        r#"
            SELECT m.*, u.name AS owner_name, u.email AS owner_email
            FROM movies m
            JOIN users u ON u.id = m.user_id
            WHERE {}
            ORDER BY m.created_at DESC
            LIMIT $7 OFFSET $8
        "#,
        condition
    );
    let rows_result = sqlx::query_as::<_, MovieRecord>(select_query.as_str())
        .bind(info.search.as_deref())
        .bind(info.min_duration)
        .bind(info.max_duration)
        .bind(info.start_date)
        .bind(info.end_date)
        .bind(info.genre.as_deref())
        .bind(limit)
        .bind(skip)
        .fetch_all(connection.get_ref())
        .instrument(query_span)
        .await;

    let records = match rows_result {
        Ok(records) => records,
        Err(err) => {
            tracing::error!("Database error {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }));
        }
    };

    let mut movies = Vec::with_capacity(records.len());
    for record in records {
        match MovieResponse::with_signed_poster(record, storage.get_ref()).await {
            Ok(response) => movies.push(response),
            Err(err) => {
                tracing::error!("Failed to sign poster url {}", err);
                return HttpResponse::InternalServerError().json(json!({
                    "error": "Something went wrong"
                }));
            }
        }
    }

    HttpResponse::Ok().json(json!({
        "movies": movies,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": total_pages(total, limit)
        }
    }))
}
