//! Supported currencies and their static display metadata.
//!
//! # Design
//! The set of currencies is closed: the pair selector only ever offers these
//! codes and the exchange-rate service is only ever asked about them, so an
//! enum replaces free-form strings. Symbols, names and flags are pure
//! functions of the code and never change at runtime.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

/// A currency the converter can convert from or to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    JPY,
    MXN,
    COP,
    BRL,
}

/// Returned by [`CurrencyCode::from_code`] for codes outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0:?}")]
pub struct ParseCurrencyError(pub String);

impl CurrencyCode {
    /// Parses an ISO code such as `"eur"` or `"EUR"`.
    pub fn from_code(code: &str) -> Result<Self, ParseCurrencyError> {
        code.trim()
            .parse()
            .map_err(|_| ParseCurrencyError(code.to_string()))
    }

    /// All supported codes in picker order.
    pub fn all() -> impl Iterator<Item = CurrencyCode> {
        CurrencyCode::iter()
    }

    /// The ISO 4217 code, e.g. `"USD"`.
    pub fn code(&self) -> &'static str {
        self.into()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::CAD => "C$",
            Self::JPY => "¥",
            Self::MXN => "Mex$",
            Self::COP => "Col$",
            Self::BRL => "R$",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::USD => "US Dollar",
            Self::EUR => "Euro",
            Self::GBP => "British Pound",
            Self::CAD => "Canadian Dollar",
            Self::JPY => "Japanese Yen",
            Self::MXN => "Mexican Peso",
            Self::COP => "Colombian Peso",
            Self::BRL => "Brazilian Real",
        }
    }

    /// Flag emoji of the issuing country (or the EU for the euro).
    pub fn flag(&self) -> &'static str {
        match self {
            Self::USD => "🇺🇸",
            Self::EUR => "🇪🇺",
            Self::GBP => "🇬🇧",
            Self::CAD => "🇨🇦",
            Self::JPY => "🇯🇵",
            Self::MXN => "🇲🇽",
            Self::COP => "🇨🇴",
            Self::BRL => "🇧🇷",
        }
    }

    pub fn meta(&self) -> CurrencyMeta {
        CurrencyMeta {
            code: *self,
            symbol: self.symbol(),
            display_name: self.display_name(),
            flag: self.flag(),
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Read-only display record for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyMeta {
    pub code: CurrencyCode,
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub flag: &'static str,
}

impl CurrencyMeta {
    /// Option label shown by a currency picker, e.g. `"USD 🇺🇸"`.
    pub fn picker_label(&self) -> String {
        format!("{} {}", self.code, self.flag)
    }
}

/// Metadata for every supported currency, in picker order.
pub fn currency_table() -> Vec<CurrencyMeta> {
    CurrencyCode::all().map(|c| c.meta()).collect()
}
