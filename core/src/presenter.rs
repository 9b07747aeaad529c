//! Text shown in the result area.

use crate::amount::{format_result, parse_amount};
use crate::currency::CurrencyCode;
use crate::state::ConversionState;

/// Shown while a conversion is in flight.
pub const LOADING_INDICATOR: &str = "Converting...";

/// Inputs of [`render_result`], borrowed from a state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    pub is_loading: bool,
    pub has_converted: bool,
    pub numeric_amount: Option<f64>,
    pub raw_amount_text: &'a str,
    pub last_result: Option<f64>,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl<'a> ResultView<'a> {
    pub fn from_state(state: &'a ConversionState) -> Self {
        Self {
            is_loading: state.is_loading,
            has_converted: state.has_converted,
            numeric_amount: parse_amount(&state.raw_amount_text),
            raw_amount_text: &state.raw_amount_text,
            last_result: state.last_result,
            from: state.from,
            to: state.to,
        }
    }
}

/// Result line for `view`, or `None` when the result area stays empty.
///
/// `symbol_of` supplies the symbol printed before each amount.
pub fn render_result<'s>(
    view: &ResultView<'_>,
    symbol_of: impl Fn(CurrencyCode) -> &'s str,
) -> Option<String> {
    if view.is_loading {
        return Some(LOADING_INDICATOR.to_string());
    }
    if !view.has_converted || !view.numeric_amount.is_some_and(|a| a > 0.0) {
        return None;
    }
    let result = view.last_result?;
    Some(format!(
        "{}{} {} = {}{} {}",
        symbol_of(view.from),
        view.raw_amount_text,
        view.from,
        symbol_of(view.to),
        format_result(result),
        view.to,
    ))
}
