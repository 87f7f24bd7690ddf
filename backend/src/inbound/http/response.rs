//! Success envelope shared by every JSON endpoint.
//!
//! ```text
//! {"success": true, "message": "Course created", "course": {...}}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// `{success: true, message, ...payload}`; `payload` must serialise as a map.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    message: String,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }

    /// `200 OK` with the envelope as body.
    pub fn ok(message: impl Into<String>, payload: T) -> HttpResponse {
        Self::respond(StatusCode::OK, message, payload)
    }

    /// `201 Created` with the envelope as body.
    pub fn created(message: impl Into<String>, payload: T) -> HttpResponse {
        Self::respond(StatusCode::CREATED, message, payload)
    }

    fn respond(status: StatusCode, message: impl Into<String>, payload: T) -> HttpResponse {
        HttpResponse::build(status).json(Self::new(message, payload))
    }
}

/// Envelope carrying only a message.
pub fn message_only(message: impl Into<String>) -> HttpResponse {
    Envelope::ok(message, Value::Object(serde_json::Map::new()))
}
