use super::util::{ownership_failure_response, ACTIVE_MOVIE_CONDITION};
use crate::middleware::AuthenticatedUser;
use actix_web::{
    web::{Data, Path},
    HttpMessage, HttpRequest, HttpResponse,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::rc::Rc;
use tracing::Instrument;
use uuid::Uuid;

pub async fn delete_movie(
    path: Path<Uuid>,
    connection: Data<PgPool>,
    req: HttpRequest,
) -> HttpResponse {
    let movie_id = path.into_inner();
    let query_span = tracing::info_span!("Soft deleting movie", %movie_id);

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

    // A movie that is already soft-deleted fails the predicate and surfaces
    // as a 404, same as a missing one.
    let delete_query = format!(
        r#"
            UPDATE movies SET deleted_at = $1, updated_at = $1
            WHERE id = $2 AND user_id = $3 AND {}
            RETURNING deleted_at
        "#,
        ACTIVE_MOVIE_CONDITION
    );

    let delete_result = sqlx::query_scalar::<_, DateTime<Utc>>(delete_query.as_str())
        .bind(Utc::now())
        .bind(movie_id)
        .bind(user.id)
        .fetch_optional(connection.get_ref())
        .instrument(query_span.clone())
        .await;

    match delete_result {
        Ok(Some(deleted_at)) => {
            tracing::info!("Movie soft deleted successfully");
            HttpResponse::Ok().json(json!({
                "message": "Movie deleted successfully",
                "deletedAt": deleted_at
            }))
        }
        Ok(None) => {
            ownership_failure_response(connection.get_ref(), movie_id, user.id, query_span).await
        }
        Err(err) => {
            tracing::error!("Database error {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }))
        }
    }
}
