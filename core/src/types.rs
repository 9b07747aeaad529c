//! Wire and domain types for the pair-conversion endpoint.
//!
//! # Design
//! `PairResponse` mirrors the JSON the exchange-rate service returns, with
//! every field optional so that a malformed or error payload still decodes
//! and can be classified. `PairConversion` is the validated domain value the
//! controller consumes. The mock server defines its own copy of the schema;
//! the integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

/// Value of `result` on a successful reply.
pub const RESULT_SUCCESS: &str = "success";

/// One conversion the controller wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    pub amount: f64,
}

/// Raw body of a pair-conversion reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "error-type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_update_unix: Option<u64>,
}

/// A successful conversion as returned by the service. Only the converted
/// amount is guaranteed; the echoed codes and the rate are informational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairConversion {
    pub base: Option<CurrencyCode>,
    pub target: Option<CurrencyCode>,
    pub conversion_rate: Option<f64>,
    pub converted_amount: f64,
}
