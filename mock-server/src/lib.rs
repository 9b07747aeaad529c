//! In-process stand-in for the exchange-rate service's pair endpoint.
//!
//! Serves `GET /v6/{key}/pair/{base}/{target}[/{amount}]` with the same JSON
//! shape and error types as the real service. Rates are USD-denominated and
//! can be changed at runtime through `PUT /admin/rates/{code}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const DEFAULT_API_KEY: &str = "test-key";

/// Fixed timestamp reported as the last rate update.
const LAST_UPDATE_UNIX: u64 = 1_700_000_000;

/// Units of each currency per US dollar.
pub fn default_rates() -> HashMap<String, f64> {
    [
        ("USD", 1.0),
        ("EUR", 0.92),
        ("GBP", 0.79),
        ("CAD", 1.36),
        ("JPY", 149.5),
        ("MXN", 17.1),
        ("COP", 3950.0),
        ("BRL", 4.95),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    pub per_usd: HashMap<String, f64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            per_usd: default_rates(),
        }
    }
}

impl MockConfig {
    /// Default rates, key from `FX_MOCK_API_KEY` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("FX_MOCK_API_KEY") {
            config.api_key = key;
        }
        config
    }
}

/// Body of every pair reply, success or error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PairReply {
    pub result: String,
    #[serde(rename = "error-type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_last_update_unix: Option<u64>,
}

impl PairReply {
    fn error(error_type: &str) -> Self {
        Self {
            result: "error".to_string(),
            error_type: Some(error_type.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
pub struct SetRate {
    pub per_usd: f64,
}

pub type Rates = Arc<RwLock<HashMap<String, f64>>>;

#[derive(Clone)]
struct AppState {
    api_key: Arc<str>,
    rates: Rates,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        api_key: config.api_key.into(),
        rates: Arc::new(RwLock::new(config.per_usd)),
    };
    Router::new()
        .route("/v6/{key}/pair/{base}/{target}", get(pair_rate))
        .route("/v6/{key}/pair/{base}/{target}/{amount}", get(pair_amount))
        .route("/admin/rates/{code}", put(set_rate))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn pair_rate(
    State(state): State<AppState>,
    Path((key, base, target)): Path<(String, String, String)>,
) -> (StatusCode, Json<PairReply>) {
    convert(&state, &key, &base, &target, None).await
}

async fn pair_amount(
    State(state): State<AppState>,
    Path((key, base, target, amount)): Path<(String, String, String, String)>,
) -> (StatusCode, Json<PairReply>) {
    convert(&state, &key, &base, &target, Some(&amount)).await
}

async fn convert(
    state: &AppState,
    key: &str,
    base: &str,
    target: &str,
    amount: Option<&str>,
) -> (StatusCode, Json<PairReply>) {
    info!(base, target, amount, "pair request");

    if key != &*state.api_key {
        warn!("rejecting unknown api key");
        return (StatusCode::FORBIDDEN, Json(PairReply::error("invalid-key")));
    }

    let amount = match amount.map(|a| a.parse::<f64>()) {
        None => None,
        Some(Ok(a)) if a.is_finite() && a >= 0.0 => Some(a),
        Some(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PairReply::error("malformed-request")),
            )
        }
    };

    let rates = state.rates.read().await;
    let (Some(base_rate), Some(target_rate)) = (rates.get(base), rates.get(target)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(PairReply::error("unsupported-code")),
        );
    };

    let rate = round4(target_rate / base_rate);
    let reply = PairReply {
        result: "success".to_string(),
        error_type: None,
        base_code: Some(base.to_string()),
        target_code: Some(target.to_string()),
        conversion_rate: Some(rate),
        conversion_result: amount.map(|a| round4(a * rate)),
        time_last_update_unix: Some(LAST_UPDATE_UNIX),
    };
    (StatusCode::OK, Json(reply))
}

async fn set_rate(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<SetRate>,
) -> StatusCode {
    if !input.per_usd.is_finite() || input.per_usd <= 0.0 {
        return StatusCode::BAD_REQUEST;
    }
    info!(code = %code, per_usd = input.per_usd, "rate updated");
    state
        .rates
        .write()
        .await
        .insert(code.to_ascii_uppercase(), input.per_usd);
    StatusCode::NO_CONTENT
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
