//! Client-side core of a currency converter widget.
//!
//! # Overview
//! A [`ConversionController`] owns the converter's state: the selected pair,
//! the amount being typed, and the result of the last conversion. A
//! presentation layer forwards user events to it and renders
//! [`ConversionController::display`]; the exchange-rate service is reached
//! through plain-data requests the host executes (host-does-IO).
//!
//! # Design
//! - Every state change goes through one transition function
//!   ([`ConversionState::apply`]), so the pair swap is atomic.
//! - Amount text is normalized on every edit and always comma-grouped.
//! - Conversions are ticketed. Edits bump a generation counter and replies
//!   for an older generation are dropped, so a stale result is never shown.
//! - [`RateClient`] only builds and parses HTTP messages. [`fetch`] adds an
//!   awaitable driver for hosts with an async transport.

pub mod amount;
pub mod client;
pub mod controller;
pub mod currency;
pub mod error;
pub mod fetch;
pub mod http;
pub mod presenter;
pub mod state;
pub mod types;

pub use amount::{format_result, normalize_amount_input, parse_amount};
pub use client::RateClient;
pub use controller::{Completion, ConversionController, ConvertTicket};
pub use currency::{currency_table, CurrencyCode, CurrencyMeta, ParseCurrencyError};
pub use error::{ApiError, ConvertFailure, FailureKind};
pub use fetch::{convert_with, ClientFetcher, ConvertOutcome, RateFetcher, Transport};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use presenter::{render_result, ResultView, LOADING_INDICATOR};
pub use state::{ConversionState, Event, Phase};
pub use types::{ConvertRequest, PairConversion, PairResponse};
