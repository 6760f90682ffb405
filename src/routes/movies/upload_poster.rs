use actix_multipart::Multipart;
use actix_web::{
    web::{self, Data},
    HttpRequest, HttpResponse,
};
use futures_util::TryStreamExt;
use mime::{IMAGE_JPEG, IMAGE_PNG};
use serde_json::json;

use crate::storage::{generate_object_key, Storage};

const MAX_FILE_SIZE: usize = 2_000_000; // 2 mb

pub async fn upload_poster(
    mut payload: Multipart,
    storage: Data<Storage>,
    req: HttpRequest,
) -> HttpResponse {
    let content_len = match req.headers().get("Content-Length") {
        Some(value) => {
            let len_res = value.to_str().unwrap_or("0").parse::<usize>();
            if len_res.is_err() {
                tracing::error!("Invalid Content-Length value");
                return HttpResponse::BadRequest().finish();
            }
            let len = len_res.unwrap();
            if len == 0 || len > MAX_FILE_SIZE {
                tracing::error!("Invalid Content-Length value [{}]", len);
                return HttpResponse::BadRequest().json(json!({
                    "error": "File is too large"
                }));
            }
            len
        }
        None => {
            tracing::error!("no Content-Length header found");
            return HttpResponse::BadRequest().finish();
        }
    };

    tracing::info!("Got Content-Length {}", content_len);

    let key = if let Ok(Some(mut field)) = payload.try_next().await {
        if field.name().is_none() || field.name().unwrap() != "poster" {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid field name"
            }));
        }

        let file_type = match field.content_type() {
            Some(extension) => {
                if *extension == IMAGE_JPEG {
                    "image/jpeg"
                } else if *extension == IMAGE_PNG {
                    "image/png"
                } else {
                    tracing::error!("Wrong file type");
                    return HttpResponse::BadRequest().json(json!({
                        "error": "Invalid file type"
                    }));
                }
            }
            None => {
                tracing::error!("Didn't get file type");
                return HttpResponse::BadRequest().json(json!({
                    "error": "Invalid file type"
                }));
            }
        };

        let filename = field
            .content_disposition()
            .and_then(|content_disposition| content_disposition.get_filename())
            .map(|filename| filename.to_string())
            .unwrap_or_else(|| format!("poster.{}", file_type.split('/').last().unwrap()));

        let mut file_bytes = web::BytesMut::new();
        while let Ok(Some(chunk)) = field.try_next().await {
            if file_bytes.len() + chunk.len() > MAX_FILE_SIZE {
                tracing::error!("File is too large");
                return HttpResponse::BadRequest().json(json!({
                    "error": "File is too large"
                }));
            }
            file_bytes.extend_from_slice(&chunk);
        }

        let key = generate_object_key(filename.as_str());
        match storage
            .put_object(key.as_str(), file_bytes.freeze(), file_type)
            .await
        {
            Ok(()) => {
                tracing::info!("File saved successfully");
                key
            }
            Err(err) => {
                tracing::error!("Failed to save file: {:?}", err);
                return HttpResponse::InternalServerError().json(json!({
                    "error": "Something went wrong"
                }));
            }
        }
    } else {
        tracing::error!("No file in request");
        return HttpResponse::BadRequest().json(json!({
            "error": "No file in request"
        }));
    };

    tracing::info!("File uploaded Successfully");

    // The client stores this key on the movie record, signed URLs are minted
    // at read time.
    HttpResponse::Ok().json(json!({
        "url": key
    }))
}
