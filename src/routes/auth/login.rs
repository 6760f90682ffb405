use super::util::validate_password;
use crate::middleware::TokenIssuer;
use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

#[derive(sqlx::FromRow)]
struct UserCredentials {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

pub async fn login_user(
    body: Json<LoginRequest>,
    connection: Data<PgPool>,
    token_issuer: Data<TokenIssuer>,
) -> HttpResponse {
    let query_span = tracing::info_span!("Handle user login");

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

    let result = sqlx::query_as::<_, UserCredentials>(
        r#"
            SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1
        "#,
    )
    .bind(body.email.as_str())
    .fetch_one(connection.get_ref())
    .instrument(query_span)
    .await;

    // Unknown email and wrong password produce the same response on purpose.
    let user = match result {
        Ok(user) => user,
        Err(err) => {
            tracing::error!("Error getting user from database {}", err);
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid email or password"
            }));
        }
    };

    let result = PasswordHash::new(user.password_hash.as_str());
    let parsed_hash = match result {
        Ok(hash) => hash,
        Err(_) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }));
        }
    };
    let result = Argon2::default()
        .verify_password(body.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !result {
        tracing::error!("Wrong Password");
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid email or password"
        }));
    }
    tracing::info!("Password is correct");

    let token_result = token_issuer.sign(user.id, user.email.as_str());
    match token_result {
        Ok(token) => {
            tracing::info!("successful Login");
            HttpResponse::Ok().json(json!({
                "user": {
                    "id": user.id,
                    "name": user.name,
                    "email": user.email,
                    "createdAt": user.created_at
                },
                "token": token
            }))
        }
        Err(_) => {
            tracing::error!("Error Generating token");
            HttpResponse::InternalServerError().json(json!({
                "error": "Something went wrong"
            }))
        }
    }
}
