// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 500 carrying only `message`; `cause` goes to the log.
    pub fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a storage failure: constraint violations become 400, uniqueness
    /// clashes 409, missing rows 404 with `not_found`, anything else 500
    /// with `context`.
    pub fn from_store(err: StoreError, not_found: &str, context: &str) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(not_found),
            StoreError::Conflict { field } => Self::conflict(format!("{} is already taken", capitalize(field))),
            StoreError::Constraint { column, .. } => Self::bad_request(format!("Invalid {column}")),
            StoreError::InvalidUpdate(reason) => Self::bad_request(reason),
            other => Self::internal(context, other),
        }
    }
}

/// Longest upstream error body kept in errors and logs.
pub(crate) const UPSTREAM_BODY_LIMIT: usize = 1024;

/// Cut an upstream response body to [`UPSTREAM_BODY_LIMIT`] bytes on a char
/// boundary, marking the cut with `…`.
pub(crate) fn truncate_upstream_body(mut body: String) -> String {
    if body.len() <= UPSTREAM_BODY_LIMIT {
        return body;
    }
    let mut end = UPSTREAM_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push('…');
    body
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
