use super::types::MovieResponse;
use super::util::fetch_active_movie;
use crate::middleware::AuthenticatedUser;
use crate::storage::Storage;
use actix_web::{
    web::{Data, Path},
    HttpMessage, HttpRequest, HttpResponse,
};
use serde_json::json;
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

pub async fn get_movie(
    path: Path<Uuid>,
    connection: Data<PgPool>,
    storage: Data<Storage>,
    req: HttpRequest,
) -> HttpResponse {
    let movie_id = path.into_inner();
    let query_span = tracing::info_span!("Fetching movie", %movie_id);

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

    let record = match fetch_active_movie(connection.get_ref(), movie_id, query_span).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::error!("Movie {} not found", movie_id);
            return HttpResponse::NotFound().json(json!({
                "error": "Movie not found"
            }));
        }
        Err(err) => {
            tracing::error!("Database error {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }));
        }
    };

    if record.user_id != user.id {
        tracing::error!("User {} does not own movie {}", user.id, movie_id);
        return HttpResponse::Forbidden().json(json!({
            "error": "You do not have permission to perform this action"
        }));
    }

    match MovieResponse::with_signed_poster(record, storage.get_ref()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => {
            tracing::error!("Failed to sign poster url {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }))
        }
    }
}
