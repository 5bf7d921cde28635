// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP Event
//!
//! Normalized view over one inbound HTTP request. The body may arrive as a
//! JSON object, as a JSON string, or as a base64-encoded JSON string; the
//! forms are tried in that order. A missing or empty body is an empty object.
//!
//! Parameters are looked up body first, then path parameters, then the query
//! string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;

use super::method::HttpMethod;
use crate::domain::event::Event;

pub const HTTP_EVENT: &str = "eda.infrastructure.http.HttpEvent";

#[derive(Debug, thiserror::Error)]
pub enum HttpEventError {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid body: {0}")]
    InvalidBody(String),
}

/// Wire shape of an inbound request. Null maps are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub http_method: String,

    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,

    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpEvent {
    http_method: HttpMethod,
    query_string_parameters: HashMap<String, String>,
    headers: HashMap<String, String>,
    path_parameters: HashMap<String, String>,
    body: Value,
}

impl HttpEvent {
    pub fn new(
        http_method: HttpMethod,
        query_string_parameters: HashMap<String, String>,
        headers: HashMap<String, String>,
        path_parameters: HashMap<String, String>,
        body: Value,
    ) -> Result<Self, HttpEventError> {
        Ok(Self {
            http_method,
            query_string_parameters,
            headers,
            path_parameters,
            body: decode_body(body)?,
        })
    }

    pub fn from_request(request: HttpRequest) -> Result<Self, HttpEventError> {
        let http_method = request
            .http_method
            .parse::<HttpMethod>()
            .map_err(|_| HttpEventError::InvalidMethod(request.http_method.clone()))?;

        Self::new(
            http_method,
            request.query_string_parameters.unwrap_or_default(),
            request.headers.unwrap_or_default(),
            request.path_parameters.unwrap_or_default(),
            request.body,
        )
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn query_string_parameters(&self) -> &HashMap<String, String> {
        &self.query_string_parameters
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn path_parameters(&self) -> &HashMap<String, String> {
        &self.path_parameters
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// First match in body, then path parameters, then query string.
    pub fn retrieve_param(&self, name: &str, default: Option<Value>) -> Option<Value> {
        if let Some(value) = self.body.get(name) {
            return Some(value.clone());
        }
        if let Some(value) = self.path_parameters.get(name) {
            return Some(Value::String(value.clone()));
        }
        if let Some(value) = self.query_string_parameters.get(name) {
            return Some(Value::String(value.clone()));
        }
        default
    }
}

impl Event for HttpEvent {
    fn event_type(&self) -> &str {
        HTTP_EVENT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn decode_body(body: Value) -> Result<Value, HttpEventError> {
    match body {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) | Value::Array(_) => Ok(body),
        Value::String(text) => {
            if text.trim().is_empty() {
                return Ok(Value::Object(Map::new()));
            }
            if let Some(value) = parse_structured(&text) {
                return Ok(value);
            }
            STANDARD
                .decode(text.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .and_then(|decoded| parse_structured(&decoded))
                .ok_or_else(|| HttpEventError::InvalidBody(text))
        }
        other => Err(HttpEventError::InvalidBody(other.to_string())),
    }
}

fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}
