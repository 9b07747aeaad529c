//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The core describes the exchange-rate call as plain data and parses the
//! reply from plain data; whoever embeds the controller (a UI shell, the C
//! wrapper, a test) performs the round-trip. All fields are owned so values
//! can be handed across the FFI boundary without lifetimes.

/// HTTP method for a request. The exchange-rate endpoint is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RateClient::build_pair_request`. `timeout_ms` is a hint for the
/// executor; the core itself never waits on anything.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout_ms: Option<u64>,
}

/// An HTTP response described as plain data, handed back to
/// `RateClient::parse_pair_response`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Response with no headers, the common case for executors that only
    /// forward status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
