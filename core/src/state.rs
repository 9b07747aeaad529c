//! The converter's state and its transition function.
//!
//! # Design
//! All mutation goes through [`ConversionState::apply`], which takes the whole
//! previous state and returns the whole next state. Swapping the pair is one
//! event, so it can never observe a half-updated pair. The lifecycle phase is
//! derived from the fields rather than stored next to them.

use serde::Serialize;

use crate::currency::CurrencyCode;
use crate::error::ConvertFailure;

/// Everything the converter widget knows. Owned by one controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionState {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    /// Normalized, comma-grouped amount as shown in the editor.
    pub raw_amount_text: String,
    /// A conversion was requested for the current amount and pair.
    pub has_converted: bool,
    pub is_loading: bool,
    pub last_result: Option<f64>,
    /// Why the conversion requested for the current input failed.
    pub last_failure: Option<ConvertFailure>,
}

impl Default for ConversionState {
    fn default() -> Self {
        Self {
            from: CurrencyCode::USD,
            to: CurrencyCode::EUR,
            raw_amount_text: String::new(),
            has_converted: false,
            is_loading: false,
            last_result: None,
            last_failure: None,
        }
    }
}

/// Inputs to [`ConversionState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// New editor text; must already be normalized.
    EditAmount(String),
    SelectFrom(CurrencyCode),
    SelectTo(CurrencyCode),
    Flip,
    Clear,
    ConvertStarted,
    ConvertSucceeded(f64),
    ConvertFailed(ConvertFailure),
}

/// Lifecycle position of the converter, derived from [`ConversionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Editing,
    Loading,
    Converted,
    Failed,
}

impl ConversionState {
    /// Produce the state that follows `event`.
    ///
    /// Amount edits that change the text, currency selection, flip and clear
    /// all drop the conversion for the previous input, including any request
    /// still in flight.
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::EditAmount(text) => {
                if text == self.raw_amount_text {
                    return self;
                }
                Self {
                    raw_amount_text: text,
                    ..self.invalidated()
                }
            }
            Event::SelectFrom(code) => Self {
                from: code,
                raw_amount_text: String::new(),
                ..self.invalidated()
            },
            Event::SelectTo(code) => Self {
                to: code,
                raw_amount_text: String::new(),
                ..self.invalidated()
            },
            Event::Flip => Self {
                from: self.to,
                to: self.from,
                raw_amount_text: String::new(),
                ..self.invalidated()
            },
            Event::Clear => Self {
                raw_amount_text: String::new(),
                ..self.invalidated()
            },
            Event::ConvertStarted => Self {
                is_loading: true,
                has_converted: true,
                last_result: None,
                last_failure: None,
                ..self
            },
            Event::ConvertSucceeded(value) => Self {
                is_loading: false,
                last_result: Some(value),
                last_failure: None,
                ..self
            },
            Event::ConvertFailed(failure) => Self {
                is_loading: false,
                last_result: None,
                last_failure: Some(failure),
                ..self
            },
        }
    }

    fn invalidated(self) -> Self {
        Self {
            has_converted: false,
            is_loading: false,
            last_result: None,
            last_failure: None,
            ..self
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.has_converted && self.last_result.is_some() {
            Phase::Converted
        } else if self.has_converted && self.last_failure.is_some() {
            Phase::Failed
        } else if self.raw_amount_text.is_empty() {
            Phase::Idle
        } else {
            Phase::Editing
        }
    }
}
