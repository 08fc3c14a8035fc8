use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::services::ServiceError;

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

/// Maps a service failure onto the JSON error contract of the API.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::Forbidden => HttpResponse::Forbidden().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            bad_request(&message)
        }
        ServiceError::Internal(message) => {
            log::error!("Request failed: {message}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub(crate) fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "errors": message }))
}

/// JSON extractor settings that report unreadable bodies in the API's error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err.to_string());
        InternalError::from_response(err, response).into()
    })
}
