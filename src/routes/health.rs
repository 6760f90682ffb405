use actix_web::{web::Data, HttpResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn health_check(connection: Data<PgPool>) -> HttpResponse {
    let query_span = tracing::info_span!("Health check");
    let result = sqlx::query("SELECT 1")
        .execute(connection.get_ref())
        .instrument(query_span)
        .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "OK",
            "database": "Connected",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            tracing::error!("Database unreachable {}", err);
            HttpResponse::Ok().json(json!({
                "status": "Error",
                "database": "Disconnected",
                "error": err.to_string(),
                "timestamp": Utc::now()
            }))
        }
    }
}
