// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP event adapters
//!
//! Normalizes serverless-style HTTP requests (`{httpMethod,
//! queryStringParameters, headers, pathParameters, body}`) into
//! [`HttpEvent`]s and renders [`HttpResponse`]s back to the transport.

pub mod event;
pub mod method;
pub mod response;

pub use event::{HttpEvent, HttpEventError, HttpRequest, HTTP_EVENT};
pub use method::HttpMethod;
pub use response::{into_response, HttpResponse, JsonResponse};
