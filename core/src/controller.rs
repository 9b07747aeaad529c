//! The conversion controller: one owner for the converter's state.
//!
//! # Design
//! The controller never performs I/O. `trigger_convert` hands out a
//! [`ConvertTicket`] describing the fetch to run; the host runs it and passes
//! the outcome to `complete_convert` together with the ticket.
//!
//! Overlapping conversions follow a keep-latest policy. Every trigger and
//! every edit that invalidates the result moves the generation forward, and a
//! completion is applied only if its ticket carries the current generation.
//! A reply for an older input is dropped even if it arrives last.

use tracing::{debug, warn};

use crate::amount::{normalize_amount_input, parse_amount};
use crate::currency::CurrencyCode;
use crate::error::{ApiError, ConvertFailure};
use crate::presenter::{render_result, ResultView};
use crate::state::{ConversionState, Event, Phase};
use crate::types::{ConvertRequest, PairConversion};

/// Permission to run one fetch, issued by [`ConversionController::trigger_convert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertTicket {
    pub generation: u64,
    pub request: ConvertRequest,
}

/// What `complete_convert` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The converted value is now the displayed result.
    Applied,
    /// The failure was recorded for the current input.
    Failed,
    /// The input changed or a newer conversion started; nothing was touched.
    Stale,
}

#[derive(Debug, Default)]
pub struct ConversionController {
    state: ConversionState,
    generation: u64,
}

impl ConversionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given pair instead of USD → EUR.
    pub fn with_pair(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self {
            state: ConversionState {
                from,
                to,
                ..ConversionState::default()
            },
            generation: 0,
        }
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Value of the current amount text, if it parses.
    pub fn numeric_amount(&self) -> Option<f64> {
        parse_amount(&self.state.raw_amount_text)
    }

    /// Take the amount field's new content; returns the normalized text.
    pub fn edit_amount(&mut self, user_input: &str) -> &str {
        let normalized = normalize_amount_input(&self.state.raw_amount_text, user_input);
        if normalized != self.state.raw_amount_text {
            self.dispatch(Event::EditAmount(normalized));
        }
        &self.state.raw_amount_text
    }

    pub fn select_from(&mut self, code: CurrencyCode) {
        self.dispatch(Event::SelectFrom(code));
    }

    pub fn select_to(&mut self, code: CurrencyCode) {
        self.dispatch(Event::SelectTo(code));
    }

    pub fn flip(&mut self) {
        self.dispatch(Event::Flip);
    }

    pub fn clear(&mut self) {
        self.dispatch(Event::Clear);
    }

    /// Request a conversion of the current amount.
    ///
    /// Returns `None` without touching anything when the amount is empty,
    /// unparsable or not strictly positive. A trigger while another
    /// conversion is in flight supersedes it.
    pub fn trigger_convert(&mut self) -> Option<ConvertTicket> {
        let amount = match self.numeric_amount() {
            Some(a) if a > 0.0 => a,
            _ => {
                debug!(raw = %self.state.raw_amount_text, "convert ignored: amount is not positive");
                return None;
            }
        };

        self.generation += 1;
        let ticket = ConvertTicket {
            generation: self.generation,
            request: ConvertRequest {
                base: self.state.from,
                target: self.state.to,
                amount,
            },
        };
        self.state = std::mem::take(&mut self.state).apply(Event::ConvertStarted);
        debug!(
            generation = ticket.generation,
            base = %ticket.request.base,
            target = %ticket.request.target,
            amount,
            "convert started"
        );
        Some(ticket)
    }

    /// Apply the outcome of the fetch described by `ticket`.
    pub fn complete_convert(
        &mut self,
        ticket: &ConvertTicket,
        outcome: Result<PairConversion, ApiError>,
    ) -> Completion {
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale conversion outcome"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(conversion) => {
                self.state = std::mem::take(&mut self.state)
                    .apply(Event::ConvertSucceeded(conversion.converted_amount));
                Completion::Applied
            }
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "conversion failed");
                self.state = std::mem::take(&mut self.state)
                    .apply(Event::ConvertFailed(ConvertFailure::from(&err)));
                Completion::Failed
            }
        }
    }

    /// True while `ticket` belongs to the conversion the state is waiting on.
    ///
    /// Generations are per controller, so the ticket's request must also match
    /// the pair and amount currently shown.
    pub fn is_current(&self, ticket: &ConvertTicket) -> bool {
        ticket.generation == self.generation
            && self.state.is_loading
            && ticket.request.base == self.state.from
            && ticket.request.target == self.state.to
            && self.numeric_amount() == Some(ticket.request.amount)
    }

    /// The result line for the current state, if any.
    pub fn display(&self) -> Option<String> {
        render_result(&ResultView::from_state(&self.state), |c| c.symbol())
    }

    fn dispatch(&mut self, event: Event) {
        debug!(?event, "conversion event");
        let invalidates = !matches!(
            event,
            Event::ConvertStarted | Event::ConvertSucceeded(_) | Event::ConvertFailed(_)
        );
        self.state = std::mem::take(&mut self.state).apply(event);
        if invalidates {
            self.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::presenter::LOADING_INDICATOR;

    fn success(value: f64) -> Result<PairConversion, ApiError> {
        Ok(PairConversion {
            base: Some(CurrencyCode::USD),
            target: Some(CurrencyCode::EUR),
            conversion_rate: None,
            converted_amount: value,
        })
    }

    #[test]
    fn edit_amount_returns_normalized_text() {
        let mut c = ConversionController::new();
        assert_eq!(c.edit_amount("1234567"), "1,234,567");
        assert_eq!(c.state().raw_amount_text, "1,234,567");
    }

    #[test]
    fn trigger_with_empty_or_zero_amount_is_noop() {
        let mut c = ConversionController::new();
        let before = c.state().clone();
        assert!(c.trigger_convert().is_none());
        assert_eq!(c.state(), &before);

        c.edit_amount("0");
        let before = c.state().clone();
        assert!(c.trigger_convert().is_none());
        assert_eq!(c.state(), &before);

        c.edit_amount("0.");
        assert!(c.trigger_convert().is_none());
        c.edit_amount(".");
        assert!(c.trigger_convert().is_none());
    }

    #[test]
    fn trigger_issues_ticket_for_current_pair() {
        let mut c = ConversionController::with_pair(CurrencyCode::GBP, CurrencyCode::JPY);
        c.edit_amount("1,000");
        let ticket = c.trigger_convert().unwrap();
        assert_eq!(ticket.request.base, CurrencyCode::GBP);
        assert_eq!(ticket.request.target, CurrencyCode::JPY);
        assert_eq!(ticket.request.amount, 1000.0);
        assert!(c.state().is_loading);
        assert!(c.state().has_converted);
        assert_eq!(c.display().as_deref(), Some(LOADING_INDICATOR));
    }

    #[test]
    fn end_to_end_success_display() {
        let mut c = ConversionController::new();
        c.edit_amount("1000");
        let ticket = c.trigger_convert().unwrap();
        assert_eq!(c.complete_convert(&ticket, success(920.5)), Completion::Applied);
        assert!(!c.state().is_loading);
        assert_eq!(c.state().last_result, Some(920.5));
        assert_eq!(c.display().as_deref(), Some("$1,000 USD = €920.5 EUR"));
        assert_eq!(c.phase(), Phase::Converted);
    }

    #[test]
    fn end_to_end_failure_shows_nothing() {
        let mut c = ConversionController::new();
        c.edit_amount("1000");
        let ticket = c.trigger_convert().unwrap();
        let outcome = Err(ApiError::Transport("connection refused".to_string()));
        assert_eq!(c.complete_convert(&ticket, outcome), Completion::Failed);
        assert!(!c.state().is_loading);
        assert_eq!(c.state().last_result, None);
        assert_eq!(c.display(), None);
        assert_eq!(c.phase(), Phase::Failed);
        assert_eq!(
            c.state().last_failure.as_ref().map(|f| f.kind),
            Some(FailureKind::Transport)
        );
    }

    #[test]
    fn edit_during_flight_discards_reply() {
        let mut c = ConversionController::new();
        c.edit_amount("1000");
        let ticket = c.trigger_convert().unwrap();
        c.edit_amount("10000");
        assert_eq!(c.complete_convert(&ticket, success(920.5)), Completion::Stale);
        assert_eq!(c.state().last_result, None);
        assert!(!c.state().has_converted);
        assert_eq!(c.display(), None);
    }

    #[test]
    fn newer_trigger_supersedes_older() {
        let mut c = ConversionController::new();
        c.edit_amount("1");
        let first = c.trigger_convert().unwrap();
        c.edit_amount("12");
        let second = c.trigger_convert().unwrap();

        assert_eq!(c.complete_convert(&second, success(11.0)), Completion::Applied);
        assert_eq!(c.complete_convert(&first, success(0.92)), Completion::Stale);
        assert_eq!(c.state().last_result, Some(11.0));
    }

    #[test]
    fn retrigger_same_input_supersedes() {
        let mut c = ConversionController::new();
        c.edit_amount("5");
        let first = c.trigger_convert().unwrap();
        let second = c.trigger_convert().unwrap();
        assert!(second.generation > first.generation);
        assert_eq!(c.complete_convert(&first, success(1.0)), Completion::Stale);
        assert!(c.state().is_loading);
        assert_eq!(c.complete_convert(&second, success(4.6)), Completion::Applied);
    }

    #[test]
    fn completed_ticket_cannot_apply_twice() {
        let mut c = ConversionController::new();
        c.edit_amount("5");
        let ticket = c.trigger_convert().unwrap();
        assert_eq!(c.complete_convert(&ticket, success(4.6)), Completion::Applied);
        assert_eq!(c.complete_convert(&ticket, success(9.9)), Completion::Stale);
        assert_eq!(c.state().last_result, Some(4.6));
    }

    #[test]
    fn ticket_from_another_controller_is_stale() {
        let mut gbp = ConversionController::with_pair(CurrencyCode::GBP, CurrencyCode::JPY);
        gbp.edit_amount("1000");
        let foreign = gbp.trigger_convert().unwrap();

        let mut c = ConversionController::new();
        c.edit_amount("5");
        let own = c.trigger_convert().unwrap();
        assert_eq!(own.generation, foreign.generation);

        assert!(!c.is_current(&foreign));
        assert_eq!(c.complete_convert(&foreign, success(189_000.0)), Completion::Stale);
        assert!(c.state().is_loading);
        assert_eq!(c.complete_convert(&own, success(4.6)), Completion::Applied);
        assert_eq!(c.display().as_deref(), Some("$5 USD = €4.6 EUR"));
    }

    #[test]
    fn flip_twice_restores_pair_and_clears_each_time() {
        let mut c = ConversionController::new();
        c.edit_amount("1000");
        let ticket = c.trigger_convert().unwrap();
        c.complete_convert(&ticket, success(920.5));

        c.flip();
        assert_eq!((c.state().from, c.state().to), (CurrencyCode::EUR, CurrencyCode::USD));
        assert_eq!(c.state().raw_amount_text, "");
        assert!(!c.state().has_converted);
        assert_eq!(c.state().last_result, None);

        c.edit_amount("3");
        c.flip();
        assert_eq!((c.state().from, c.state().to), (CurrencyCode::USD, CurrencyCode::EUR));
        assert_eq!(c.state().raw_amount_text, "");
    }

    #[test]
    fn selection_always_resets_amount_and_flag() {
        let mut c = ConversionController::new();
        c.edit_amount("42");
        let ticket = c.trigger_convert().unwrap();
        c.select_from(CurrencyCode::CAD);
        assert_eq!(c.state().raw_amount_text, "");
        assert!(!c.state().has_converted);
        assert_eq!(c.complete_convert(&ticket, success(30.0)), Completion::Stale);

        c.edit_amount("42");
        c.select_to(CurrencyCode::BRL);
        assert_eq!(c.state().raw_amount_text, "");
        assert!(!c.state().has_converted);
        assert_eq!(c.state().from, CurrencyCode::CAD);
        assert_eq!(c.state().to, CurrencyCode::BRL);
    }

    #[test]
    fn clear_is_idempotent_and_keeps_pair() {
        let mut c = ConversionController::with_pair(CurrencyCode::MXN, CurrencyCode::COP);
        c.edit_amount("250");
        c.clear();
        let once = c.state().clone();
        c.clear();
        assert_eq!(c.state(), &once);
        assert_eq!(once.from, CurrencyCode::MXN);
        assert_eq!(once.to, CurrencyCode::COP);
        assert_eq!(once.raw_amount_text, "");
    }

    #[test]
    fn rejected_keystroke_keeps_result() {
        let mut c = ConversionController::new();
        c.edit_amount("1000");
        let ticket = c.trigger_convert().unwrap();
        c.complete_convert(&ticket, success(920.5));
        // a letter is stripped, so the text does not change
        assert_eq!(c.edit_amount("1,000x"), "1,000");
        assert_eq!(c.display().as_deref(), Some("$1,000 USD = €920.5 EUR"));
    }
}
