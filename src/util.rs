use serde::{Deserialize, Serialize};
use std::env;

#[derive(Serialize, Deserialize)]
pub struct ResponseMessage {
    pub message: String,
}

impl ResponseMessage {
    pub fn new(message: &str) -> Self {
        ResponseMessage {
            message: message.to_string(),
        }
    }
}

pub fn check_for_necessary_env() {
    env::var("FRONTEND_URL").expect("FRONTEND_URL must be set");
    env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    env::var("S3_BUCKET_ACCESS_KEY").expect("S3_BUCKET_ACCESS_KEY must be set");
    env::var("S3_BUCKET_SECRET_KEY").expect("S3_BUCKET_SECRET_KEY must be set");
    env::var("S3_PROVIDER_URL").expect("S3_PROVIDER_URL must be set");
    env::var("S3_REGION").expect("S3_REGION must be set");
    env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME must be set");
}
