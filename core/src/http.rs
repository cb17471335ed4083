//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The geocoding client describes its request as plain data and parses a
//! response handed back as plain data. Who executes the round-trip is up to
//! the caller: the mobile host through the FFI, or an [`HttpTransport`]
//! implementation when the core is driven from async Rust.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::future::Future;

use crate::error::TransportError;

/// HTTP method for a request. The geocoding endpoint is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Executes an [`HttpRequest`] on behalf of an async caller.
///
/// Non-2xx statuses are data, not errors: implementations return them as
/// an `HttpResponse` and leave interpretation to the parser. Only failures
/// to reach the server at all become a [`TransportError`].
pub trait HttpTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
