use super::util::{validate_name, validate_password};
use crate::middleware::TokenIssuer;
use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Uuid;
use sqlx::Error::Database;
use sqlx::PgPool;
use tracing::Instrument;
use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_name"))]
    name: String,
    #[validate(email(message = "Not a valid email"))]
    email: String,
    #[validate(custom(function = "validate_password"))]
    password: String,
    #[serde(rename = "confirmPassword")]
    confirm_password: String,
}

pub async fn register_user(
    body: Json<RegisterRequest>,
    connection: Data<PgPool>,
    token_issuer: Data<TokenIssuer>,
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

    if body.password != body.confirm_password {
        tracing::error!("Password confirmation mismatch");
        return HttpResponse::BadRequest().json(json!({
            "error": "Passwords do not match"
        }));
    }

    let query_span = tracing::info_span!("Saving new user details in the database");

    let existing_user = sqlx::query_scalar::<_, Uuid>(
        r#"
            SELECT id FROM users WHERE email = $1
        "#,
    )
    .bind(body.email.as_str())
    .fetch_optional(connection.get_ref())
    .instrument(query_span.clone())
    .await;

    match existing_user {
        Ok(Some(_)) => {
            tracing::error!("Email already exists in the database");
            return HttpResponse::Conflict().json(json!({
                "error": "User already exists"
            }));
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!("Database error {}", err);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Database Error"
            }));
        }
    }

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2.hash_password(body.password.as_bytes(), &salt);
    let password_hash = match password_hash {
        Ok(hash) => {
            tracing::info!("Password hashed successfully");
            hash.to_string()
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            }));
        }
    };

    let user_id = Uuid::new_v4();
    let created_at = Utc::now();
    let result = sqlx::query(
        r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(body.name.as_str())
    .bind(body.email.as_str())
    .bind(password_hash)
    .bind(created_at)
    .bind(created_at)
    .execute(connection.get_ref())
    .instrument(query_span)
    .await;

    match result {
        Ok(_res) => {
            tracing::info!("User created successfully");
            let token_result = token_issuer.sign(user_id, body.email.as_str());
            match token_result {
                Ok(token) => HttpResponse::Created().json(json!({
                    "user": {
                        "id": user_id,
                        "name": body.name.as_str(),
                        "email": body.email.as_str(),
                        "createdAt": created_at
                    },
                    "token": token
                })),
                Err(_) => {
                    tracing::error!("Error Generating token");
                    HttpResponse::InternalServerError().json(json!({
                        "error": "Something went wrong"
                    }))
                }
            }
        }
        Err(err) => match err {
            // The pre-check above admits a race with a concurrent
            // registration, the unique constraint settles it.
            Database(err)
                if err
                    .message()
                    .contains("duplicate key value violates unique constraint")
                    && err.message().contains("email") =>
            {
                tracing::error!("Email already exists in the database");
                HttpResponse::Conflict().json(json!({
                    "error": "User already exists"
                }))
            }
            _ => {
                tracing::error!("Failed to create user {:?}", err);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Failed to create user"
                }))
            }
        },
    }
}
