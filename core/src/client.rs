//! Stateless request builder and response parser for the pair-conversion
//! endpoint of the exchange-rate service.
//!
//! # Design
//! `RateClient` holds only its configuration. `build_pair_request` produces
//! an `HttpRequest` and `parse_pair_response` consumes an `HttpResponse`; the
//! caller executes the round-trip in between, so this module stays
//! deterministic and free of I/O.

use tracing::debug;

use crate::currency::CurrencyCode;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ConvertRequest, PairConversion, PairResponse, RESULT_SUCCESS};

pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_BASE_URL: &str = "FX_API_BASE_URL";
pub const ENV_API_KEY: &str = "FX_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "FX_API_TIMEOUT_MS";

/// Synchronous, stateless client for the exchange-rate service.
#[derive(Debug, Clone)]
pub struct RateClient {
    base_url: String,
    api_key: String,
    timeout_ms: Option<u64>,
}

impl RateClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the timeout hint attached to built requests; `None` disables it.
    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Build a client from `FX_API_BASE_URL`, `FX_API_KEY` and
    /// `FX_API_TIMEOUT_MS`. Only the key is mandatory.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_API_KEY} is not set")))?;
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms = match lookup(ENV_TIMEOUT_MS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                ApiError::Config(format!("{ENV_TIMEOUT_MS}={raw:?}: {e}"))
            })?),
            None => Some(DEFAULT_TIMEOUT_MS),
        };
        Ok(Self::new(&base_url, api_key.trim()).with_timeout(timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_pair_request(&self, request: &ConvertRequest) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!(
                "{}/{}/pair/{}/{}/{}",
                self.base_url, self.api_key, request.base, request.target, request.amount
            ),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            timeout_ms: self.timeout_ms,
        }
    }

    /// Validate a pair reply.
    ///
    /// Anything short of HTTP 200 with `result == "success"` and a numeric
    /// `conversion_result` is an error.
    pub fn parse_pair_response(&self, response: HttpResponse) -> Result<PairConversion, ApiError> {
        check_status(&response)?;
        let body: PairResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        if body.result.as_deref() != Some(RESULT_SUCCESS) {
            return Err(ApiError::Rejected {
                result: body.result,
                error_type: body.error_type,
            });
        }
        let converted_amount = body
            .conversion_result
            .ok_or(ApiError::MissingConversionResult)?;

        let base = body.base_code.as_deref().and_then(|c| CurrencyCode::from_code(c).ok());
        let target = body.target_code.as_deref().and_then(|c| CurrencyCode::from_code(c).ok());
        debug!(?base, ?target, converted_amount, "parsed pair conversion");

        Ok(PairConversion {
            base,
            target,
            conversion_rate: body.conversion_rate,
            converted_amount,
        })
    }
}

/// Map non-200 statuses to `ApiError::Http`, picking the service's
/// `error-type` out of the body when it is there.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    let error_type = serde_json::from_str::<PairResponse>(&response.body)
        .ok()
        .and_then(|b| b.error_type);
    Err(ApiError::Http {
        status: response.status,
        error_type,
    })
}
