//! HTTP error taxonomy: a domain error becomes a `400` with a structured
//! JSON `{"error": "..."}` body rather than a bare string.

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serialize;

use crate::error::ControlError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub struct ApiError(pub ControlError);

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        ApiError(e)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        Json(body).respond_to(req).map(|mut r| {
            r.set_status(Status::BadRequest);
            r
        })
    }
}
