use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};

use chrono::{Duration, Utc};
use futures_util::{future::LocalBoxFuture, FutureExt};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Deserialize, Serialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Signs and verifies bearer tokens. Built once at startup from `JWT_SECRET`
/// and threaded through the app, so no handler reads the secret itself.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        TokenIssuer {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        TokenIssuer::new(secret.as_str())
    }

    pub fn sign(&self, user_id: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + Duration::days(1)).timestamp() as usize;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

pub struct Authentication {
    db_pool: PgPool,
    token_issuer: TokenIssuer,
}

impl Authentication {
    pub fn new(db_pool: PgPool, token_issuer: TokenIssuer) -> Self {
        Authentication {
            db_pool,
            token_issuer,
        }
    }
}

// https://imfeld.dev/writing/actix-web-middleware

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service: Rc::new(service),
            db_pool: self.db_pool.clone(),
            token_issuer: self.token_issuer.clone(),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: Rc<S>,
    db_pool: PgPool,
    token_issuer: TokenIssuer,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Error = Error;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let query_span = tracing::info_span!("Authentication middleware");

        let bearer_token: Result<String, &'static str> = {
            match req.headers().get(header::AUTHORIZATION) {
                None => Err("Missing Authorization header"),
                Some(value) => match value
                    .to_str()
                    .ok()
                    .and_then(|value| value.strip_prefix("Bearer "))
                {
                    Some(token) => Ok(token.to_string()),
                    None => Err("Invalid Authorization header"),
                },
            }
        };

        let token = match bearer_token {
            Ok(token) => token,
            Err(message) => {
                tracing::error!("{}", message);
                let http_res = HttpResponse::Unauthorized().json(json!({
                    "error": message
                }));
                let (http_req, _) = req.into_parts();
                let res = ServiceResponse::new(http_req, http_res);
                return (async move { Ok(res.map_into_right_body()) }).boxed_local();
            }
        };

        let claims = match self.token_issuer.verify(token.as_str()) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::error!("Token verification failed {}", err);
                let http_res = HttpResponse::Unauthorized().json(json!({
                    "error": "Invalid or expired token"
                }));
                let (http_req, _) = req.into_parts();
                let res = ServiceResponse::new(http_req, http_res);
                return (async move { Ok(res.map_into_right_body()) }).boxed_local();
            }
        };

        let db_connection = self.db_pool.clone();
        let service = self.service.clone();
        async move {
            let query_result = sqlx::query_as::<_, AuthenticatedUser>(
                r#"
                    SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1
                "#,
            )
            .bind(claims.sub)
            .fetch_one(&db_connection)
            .instrument(query_span)
            .await;

            let user = match query_result {
                Ok(user) => {
                    tracing::info!("Authenticated user {}", user.id);
                    user
                }
                Err(sqlx::Error::RowNotFound) => {
                    tracing::error!("Token subject not found in database");
                    let http_res = HttpResponse::Unauthorized().json(json!({
                        "error": "Invalid or expired token"
                    }));
                    let (http_req, _) = req.into_parts();
                    let response = ServiceResponse::new(http_req, http_res);
                    return Ok(response.map_into_right_body());
                }
                Err(err) => {
                    tracing::error!("Database error {}", err);
                    let http_res = HttpResponse::InternalServerError().json(json!({
                        "error": "Database Error"
                    }));
                    let (http_req, _) = req.into_parts();
                    let response = ServiceResponse::new(http_req, http_res);
                    return Ok(response.map_into_right_body());
                }
            };

            req.extensions_mut()
                .insert::<Rc<AuthenticatedUser>>(Rc::new(user));
            let fut = service.call(req);
            let res: ServiceResponse<B> = fut.await?;
            Ok(res.map_into_left_body())
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let issuer = TokenIssuer::new("test-secret");
        let user_id = Uuid::new_v4();
        let token = issuer.sign(user_id, "user@example.com").expect("sign token");
        let claims = issuer.verify(token.as_str()).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let issuer = TokenIssuer::new("test-secret");
        let other = TokenIssuer::new("other-secret");
        let token = issuer
            .sign(Uuid::new_v4(), "user@example.com")
            .expect("sign token");
        assert!(other.verify(token.as_str()).is_err());
    }
}
