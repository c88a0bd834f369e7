//! JSON envelope shared by every API route: `{ "success": true, "data": .. }` on success and
//! `{ "success": false, "message": .. }` on failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct FailureBody<'a> {
    success: bool,
    message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(SuccessBody {
            success: true,
            data,
        }),
    )
        .into_response()
}

pub fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(FailureBody {
            success: false,
            message,
        }),
    )
        .into_response()
}
