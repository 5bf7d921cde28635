// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP API
//!
//! Every registered route turns its request into an [`HttpEvent`] and hands it
//! to the route's [`HttpEventHandler`]. Bodies that are neither JSON nor
//! base64-encoded JSON are answered with `400 Bad Request`.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::ports::Application;
use crate::infrastructure::http::{into_response, HttpEvent, HttpMethod, HttpResponse};

#[async_trait]
pub trait HttpEventHandler: Send + Sync {
    async fn handle(&self, app: Arc<dyn Application>, event: HttpEvent) -> anyhow::Result<Box<dyn HttpResponse>>;
}

#[derive(Clone)]
pub struct HttpRoute {
    pub method: HttpMethod,
    /// axum path syntax, e.g. `/orders/{id}`.
    pub path: String,
    pub handler: Arc<dyn HttpEventHandler>,
}

impl HttpRoute {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: Arc<dyn HttpEventHandler>) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
        }
    }
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
        HttpMethod::Trace => MethodFilter::TRACE,
        HttpMethod::Connect => MethodFilter::CONNECT,
    }
}

pub fn router(app: Arc<dyn Application>, routes: Vec<HttpRoute>) -> Router {
    routes.into_iter().fold(Router::new(), |router, route| {
        let app = app.clone();
        let handler = route.handler.clone();
        let method = route.method;
        debug!("Registering HTTP route {} {}", method, route.path);

        router.route(
            &route.path,
            on(
                method_filter(method),
                move |path: Option<Path<HashMap<String, String>>>,
                      Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      body: Bytes| {
                    let app = app.clone();
                    let handler = handler.clone();
                    async move {
                        let path_parameters = path.map(|Path(params)| params).unwrap_or_default();
                        dispatch(app, handler, method, query, &headers, path_parameters, body).await
                    }
                },
            ),
        )
    })
}

async fn dispatch(
    app: Arc<dyn Application>,
    handler: Arc<dyn HttpEventHandler>,
    method: HttpMethod,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    path_parameters: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let event = match HttpEvent::new(method, query, header_map(headers), path_parameters, raw_body(&body)) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejecting HTTP request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response();
        }
    };

    match handler.handle(app, event).await {
        Ok(response) => into_response(response.as_ref()),
        Err(e) => {
            error!("HTTP event handler failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect()
}

/// JSON documents pass through; anything else is kept as text for the
/// event to decode.
fn raw_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::JsonResponse;
    use crate::testing::RecordingApp;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl HttpEventHandler for Echo {
        async fn handle(&self, _app: Arc<dyn Application>, event: HttpEvent) -> anyhow::Result<Box<dyn HttpResponse>> {
            let body = json!({
                "id": event.retrieve_param("id", None),
                "name": event.retrieve_param("name", Some(json!("anonymous"))),
                "trace": event.header("x-trace"),
            });
            Ok(Box::new(JsonResponse::with_status(201, body)))
        }
    }

    struct Failing;

    #[async_trait]
    impl HttpEventHandler for Failing {
        async fn handle(&self, _app: Arc<dyn Application>, _event: HttpEvent) -> anyhow::Result<Box<dyn HttpResponse>> {
            anyhow::bail!("storage offline")
        }
    }

    fn api() -> Router {
        router(
            Arc::new(RecordingApp::default()),
            vec![
                HttpRoute::new(HttpMethod::Post, "/orders/{id}", Arc::new(Echo)),
                HttpRoute::new(HttpMethod::Get, "/orders", Arc::new(Echo)),
                HttpRoute::new(HttpMethod::Delete, "/orders/{id}", Arc::new(Failing)),
            ],
        )
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_request_becomes_http_event() {
        let request = Request::builder()
            .method("POST")
            .uri("/orders/42?name=query")
            .header("X-Trace", "abc")
            .body(Body::from(r#"{"name": "body"}"#))
            .unwrap();

        let response = api().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(json_body(response).await, json!({"id": "42", "name": "body", "trace": "abc"}));
    }

    #[tokio::test]
    async fn test_base64_body_and_no_path_parameters() {
        let request = Request::builder()
            .method("GET")
            .uri("/orders")
            .body(Body::from("eyJpZCI6MX0="))
            .unwrap();

        let response = api().oneshot(request).await.unwrap();

        assert_eq!(json_body(response).await, json!({"id": 1, "name": "anonymous", "trace": null}));
    }

    #[tokio::test]
    async fn test_invalid_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/orders/42")
            .body(Body::from("definitely not json"))
            .unwrap();

        let response = api().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].as_str().unwrap().starts_with("Invalid body"));
    }

    #[tokio::test]
    async fn test_handler_failure_is_server_error() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/orders/42")
            .body(Body::empty())
            .unwrap();

        let response = api().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
