use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::{self, Credentials},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use std::env;
use std::time::Duration;
use uuid::Uuid;

const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Object storage handle shared across requests. The client is built once at
/// startup from the `S3_*` environment variables.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub fn from_env() -> Storage {
        let id = env::var("S3_BUCKET_ACCESS_KEY").expect("S3_BUCKET_ACCESS_KEY must be set");
        let secret = env::var("S3_BUCKET_SECRET_KEY").expect("S3_BUCKET_SECRET_KEY must be set");
        let provider = env::var("S3_PROVIDER_URL").expect("S3_PROVIDER_URL must be set");
        let region = env::var("S3_REGION").expect("S3_REGION must be set");
        let bucket = env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME must be set");

        let cred = Credentials::new(id, secret, None, None, "loaded up from env");
        let conf = config::Builder::new()
            .region(Region::new(region))
            .credentials_provider(cred)
            .endpoint_url(provider)
            .force_path_style(true)
            .behavior_version(BehaviorVersion::latest())
            .build();

        Storage {
            client: Client::from_conf(conf),
            bucket,
        }
    }

    pub async fn put_object(
        &self,
        key: &str,
        bytes: actix_web::web::Bytes,
        content_type: &str,
    ) -> Result<(), String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        Ok(())
    }

    /// Time-limited signed GET URL for a stored object. Signing is local, no
    /// round trip to the storage provider.
    pub async fn presign_get(&self, key: &str) -> Result<String, String> {
        let presigning_config =
            PresigningConfig::expires_in(SIGNED_URL_TTL).map_err(|err| err.to_string())?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|err| err.to_string())?;
        Ok(presigned.uri().to_string())
    }
}

pub fn generate_object_key(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), filename.replace(' ', "-"))
}

#[cfg(test)]
mod tests {
    use super::generate_object_key;

    #[test]
    fn object_keys_are_unique_per_upload() {
        let first = generate_object_key("poster.png");
        let second = generate_object_key("poster.png");
        assert_ne!(first, second);
        assert!(first.ends_with("-poster.png"));
    }

    #[test]
    fn object_keys_strip_whitespace_from_filenames() {
        let key = generate_object_key("my movie poster.jpg");
        assert!(key.ends_with("-my-movie-poster.jpg"));
        assert!(!key.contains(' '));
    }
}
