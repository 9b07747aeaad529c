//! Conversions against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the controller over
//! real HTTP using ureq. Validates that request building, response parsing
//! and the ticket protocol work end-to-end with the actual server.

use std::cell::RefCell;
use std::net::SocketAddr;
use std::time::Duration;

use mock_server::MockConfig;

use fx_core::{
    convert_with, ApiError, ClientFetcher, Completion, ConversionController, ConvertOutcome,
    CurrencyCode, FailureKind, HttpRequest, HttpResponse, Phase, RateClient, Transport,
};

const API_KEY: &str = mock_server::DEFAULT_API_KEY;

fn start_server() -> SocketAddr {
    start_server_with(MockConfig::default())
}

fn start_server_with(config: MockConfig) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, config).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr) -> RateClient {
    RateClient::new(&format!("http://{addr}/v6"), API_KEY)
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(req.timeout_ms.map(Duration::from_millis))
        .build()
        .new_agent();

    let mut builder = agent.get(&req.url);
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let mut response = builder
        .call()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse::new(status, body))
}

struct UreqTransport;

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        execute(request)
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn set_rate(addr: SocketAddr, code: &str, per_usd: f64) {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let body = format!(r#"{{"per_usd":{per_usd}}}"#);
    let response = agent
        .put(&format!("http://{addr}/admin/rates/{code}"))
        .content_type("application/json")
        .send(body.as_bytes())
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[test]
fn convert_usd_to_eur() {
    let addr = start_server();
    let client = client(addr);
    let mut controller = ConversionController::new();

    assert_eq!(controller.edit_amount("1000"), "1,000");
    let ticket = controller.trigger_convert().unwrap();
    assert_eq!(controller.phase(), Phase::Loading);
    assert_eq!(controller.display().as_deref(), Some("Converting..."));

    let outcome = execute(client.build_pair_request(&ticket.request))
        .and_then(|resp| client.parse_pair_response(resp));
    assert_eq!(controller.complete_convert(&ticket, outcome), Completion::Applied);

    assert_eq!(controller.phase(), Phase::Converted);
    assert_eq!(controller.state().last_result, Some(920.0));
    assert_eq!(controller.display().as_deref(), Some("$1,000 USD = €920 EUR"));
}

#[test]
fn flip_then_convert_back() {
    let addr = start_server();
    let fetcher = ClientFetcher::new(client(addr), UreqTransport);
    let controller = RefCell::new(ConversionController::new());

    controller.borrow_mut().flip();
    assert_eq!(controller.borrow().state().from, CurrencyCode::EUR);
    controller.borrow_mut().edit_amount("920");

    let outcome = block_on(convert_with(&controller, &fetcher));
    // 920 * round4(1 / 0.92)
    assert_eq!(outcome, ConvertOutcome::Converted(1000.04));
    assert_eq!(
        controller.borrow().display().as_deref(),
        Some("€920 EUR = $1,000.04 USD")
    );
}

#[test]
fn fractional_amount_round_trip() {
    let addr = start_server();
    let fetcher = ClientFetcher::new(client(addr), UreqTransport);
    let controller = RefCell::new(ConversionController::with_pair(
        CurrencyCode::USD,
        CurrencyCode::MXN,
    ));

    controller.borrow_mut().edit_amount("12.5");
    let outcome = block_on(convert_with(&controller, &fetcher));
    assert_eq!(outcome, ConvertOutcome::Converted(213.75));
    assert_eq!(
        controller.borrow().display().as_deref(),
        Some("$12.5 USD = Mex$213.75 MXN")
    );
}

#[test]
fn updated_rate_is_used() {
    let addr = start_server();
    set_rate(addr, "JPY", 150.0);

    let fetcher = ClientFetcher::new(client(addr), UreqTransport);
    let controller = RefCell::new(ConversionController::new());
    controller.borrow_mut().select_to(CurrencyCode::JPY);
    controller.borrow_mut().edit_amount("3");

    assert_eq!(
        block_on(convert_with(&controller, &fetcher)),
        ConvertOutcome::Converted(450.0)
    );
    assert_eq!(
        controller.borrow().display().as_deref(),
        Some("$3 USD = ¥450 JPY")
    );
}

#[test]
fn wrong_key_records_http_failure() {
    let addr = start_server();
    let client = RateClient::new(&format!("http://{addr}/v6"), "wrong-key");
    let mut controller = ConversionController::new();

    controller.edit_amount("10");
    let ticket = controller.trigger_convert().unwrap();
    let outcome = execute(client.build_pair_request(&ticket.request))
        .and_then(|resp| client.parse_pair_response(resp));
    assert_eq!(
        outcome,
        Err(ApiError::Http {
            status: 403,
            error_type: Some("invalid-key".to_string()),
        })
    );

    assert_eq!(controller.complete_convert(&ticket, outcome), Completion::Failed);
    assert_eq!(controller.phase(), Phase::Failed);
    let failure = controller.state().last_failure.clone().unwrap();
    assert_eq!(failure.kind, FailureKind::Http);
    assert!(failure.message.contains("invalid-key"));
    assert_eq!(controller.display(), None);

    // the amount survives a failure and can be retried
    assert_eq!(controller.state().raw_amount_text, "10");
    assert!(controller.trigger_convert().is_some());
}

#[test]
fn unsupported_code_records_http_failure() {
    let mut config = MockConfig::default();
    config.per_usd.remove("COP");
    let addr = start_server_with(config);
    let fetcher = ClientFetcher::new(client(addr), UreqTransport);
    let controller = RefCell::new(ConversionController::new());
    controller.borrow_mut().select_to(CurrencyCode::COP);
    controller.borrow_mut().edit_amount("1");

    assert_eq!(block_on(convert_with(&controller, &fetcher)), ConvertOutcome::Failed);
    let failure = controller.borrow().state().last_failure.clone().unwrap();
    assert_eq!(failure.kind, FailureKind::Http);
    assert!(failure.message.contains("unsupported-code"));
    assert_eq!(controller.borrow().display(), None);
}

#[test]
fn unreachable_server_is_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let fetcher = ClientFetcher::new(client(addr).with_timeout(Some(2_000)), UreqTransport);
    let controller = RefCell::new(ConversionController::new());
    controller.borrow_mut().edit_amount("5");

    assert_eq!(block_on(convert_with(&controller, &fetcher)), ConvertOutcome::Failed);
    let state = controller.borrow().state().clone();
    assert!(!state.is_loading);
    assert_eq!(state.last_failure.map(|f| f.kind), Some(FailureKind::Transport));
}

#[test]
fn late_reply_for_old_amount_is_dropped() {
    let addr = start_server();
    let client = client(addr);
    let mut controller = ConversionController::new();

    controller.edit_amount("1000");
    let first = controller.trigger_convert().unwrap();
    controller.edit_amount("2000");
    let second = controller.trigger_convert().unwrap();

    // replies arrive in reverse order
    let outcome = execute(client.build_pair_request(&second.request))
        .and_then(|resp| client.parse_pair_response(resp));
    assert_eq!(controller.complete_convert(&second, outcome), Completion::Applied);

    let outcome = execute(client.build_pair_request(&first.request))
        .and_then(|resp| client.parse_pair_response(resp));
    assert_eq!(controller.complete_convert(&first, outcome), Completion::Stale);

    assert_eq!(controller.state().last_result, Some(1840.0));
    assert_eq!(controller.display().as_deref(), Some("$2,000 USD = €1,840 EUR"));
}

#[test]
fn clear_during_fetch_drops_reply() {
    let addr = start_server();
    let client = client(addr);
    let mut controller = ConversionController::new();

    controller.edit_amount("50");
    let ticket = controller.trigger_convert().unwrap();
    controller.clear();

    let outcome = execute(client.build_pair_request(&ticket.request))
        .and_then(|resp| client.parse_pair_response(resp));
    assert_eq!(controller.complete_convert(&ticket, outcome), Completion::Stale);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.state().last_result, None);
    assert_eq!(controller.display(), None);
}
