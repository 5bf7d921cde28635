// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Outbound HTTP representation of a domain outcome.
///
/// Implementors override what differs from a plain `200 OK` JSON response.
pub trait HttpResponse: Send + Sync {
    fn status_code(&self) -> u16 {
        200
    }

    fn body(&self) -> Value {
        json!({})
    }

    fn headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn charset(&self) -> &str {
        "utf-8"
    }
}

/// A response assembled from plain values.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status_code: u16,
    pub body: Value,
    pub headers: HashMap<String, String>,
}

impl JsonResponse {
    pub fn ok(body: Value) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            body,
            headers: HashMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl HttpResponse for JsonResponse {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn body(&self) -> Value {
        self.body.clone()
    }

    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }
}

/// Render an [`HttpResponse`] for axum.
pub fn into_response(response: &dyn HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = format!("{}; charset={}", response.mime_type(), response.charset());

    let mut rendered = (status, response.body().to_string()).into_response();
    let headers = rendered.headers_mut();

    match HeaderValue::from_str(&content_type) {
        Ok(value) => {
            headers.insert(header::CONTENT_TYPE, value);
        }
        Err(e) => warn!("Invalid content type '{}': {}", content_type, e),
    }

    for (name, value) in response.headers() {
        match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Dropping invalid response header '{}'", name),
        }
    }

    rendered
}
