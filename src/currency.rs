//! Locale- and commodity-aware rendering of monetary values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_derive::Deserialize;

use crate::amount::{self, RationalAmount, DEFAULT_PRECISION};
use crate::quality::Issue;

/// Rendering of a value that could not be read as a number.
const NAN_FALLBACK: &str = "0.00";

/// Known commodities: ISO 4217 code, display symbol, minor units.
const COMMODITY_TABLE: &[(&str, &str, u32)] = &[
    ("AUD", "A$", 2),
    ("BHD", "BHD", 3),
    ("BRL", "R$", 2),
    ("CAD", "CA$", 2),
    ("CHF", "CHF", 2),
    ("CLP", "CLP", 0),
    ("CNY", "CN¥", 2),
    ("CZK", "CZK", 2),
    ("DKK", "DKK", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("HKD", "HK$", 2),
    ("HUF", "HUF", 2),
    ("IDR", "IDR", 2),
    ("ILS", "₪", 2),
    ("INR", "₹", 2),
    ("ISK", "ISK", 0),
    ("JOD", "JOD", 3),
    ("JPY", "¥", 0),
    ("KRW", "₩", 0),
    ("KWD", "KWD", 3),
    ("MXN", "MX$", 2),
    ("NOK", "NOK", 2),
    ("NZD", "NZ$", 2),
    ("OMR", "OMR", 3),
    ("PHP", "₱", 2),
    ("PLN", "PLN", 2),
    ("RUB", "RUB", 2),
    ("SEK", "SEK", 2),
    ("SGD", "SGD", 2),
    ("THB", "THB", 2),
    ("TND", "TND", 3),
    ("TRY", "TRY", 2),
    ("TWD", "NT$", 2),
    ("USD", "$", 2),
    ("VND", "₫", 0),
    ("ZAR", "ZAR", 2),
];

lazy_static! {
    static ref CODE_RX: Regex = Regex::new("^[A-Za-z]{3}$").unwrap();
    static ref COMMODITIES: HashMap<&'static str, CommodityInfo> = COMMODITY_TABLE
        .iter()
        .map(|&(code, symbol, minor_units)| (code, CommodityInfo { symbol, minor_units }))
        .collect();
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommodityInfo {
    pub symbol: &'static str,
    pub minor_units: u32,
}

/// Looks up a commodity code, case-insensitively. Codes that are not three
/// ASCII letters are never recognized.
pub fn commodity_info(code: &str) -> Option<CommodityInfo> {
    if !CODE_RX.is_match(code) {
        return None;
    }
    COMMODITIES.get(code.to_ascii_uppercase().as_str()).copied()
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Number formatting conventions.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Locale {
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
    pub symbol_position: SymbolPosition,
    /// Put a space between symbol and number. Alphabetic symbols (`CHF`)
    /// are always spaced.
    pub symbol_spacing: bool,
}

impl Locale {
    pub fn en_us() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: Some(','),
            symbol_position: SymbolPosition::Prefix,
            symbol_spacing: false,
        }
    }

    pub fn de_de() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: Some('.'),
            symbol_position: SymbolPosition::Suffix,
            symbol_spacing: true,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

/// A resolved formatter for one commodity code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NumberFormat {
    Currency { symbol: &'static str, digits: u32 },
    /// Plain grouped decimal, used for unrecognized codes.
    Decimal { digits: u32 },
}

impl NumberFormat {
    pub fn digits(&self) -> u32 {
        match self {
            NumberFormat::Currency { digits, .. } | NumberFormat::Decimal { digits } => *digits,
        }
    }

    /// Renders an already-rounded value.
    fn render(&self, value: Decimal, locale: &Locale) -> String {
        let digits = self.digits();
        let (negative, unsigned) = fixed_digits(value, digits);
        let number = localize(&unsigned, locale);
        let mut out = String::with_capacity(number.len() + 8);
        if negative {
            out.push('-');
        }
        match self {
            NumberFormat::Decimal { .. } => out.push_str(&number),
            NumberFormat::Currency { symbol, .. } => {
                let spaced = locale.symbol_spacing
                    || symbol.ends_with(|c: char| c.is_ascii_alphabetic());
                match locale.symbol_position {
                    SymbolPosition::Prefix => {
                        out.push_str(symbol);
                        if spaced {
                            out.push(' ');
                        }
                        out.push_str(&number);
                    }
                    SymbolPosition::Suffix => {
                        out.push_str(&number);
                        if spaced {
                            out.push(' ');
                        }
                        out.push_str(symbol);
                    }
                }
            }
        }
        out
    }
}

/// A value to be formatted.
#[derive(Clone, Copy, Debug)]
pub enum Numeric<'a> {
    Exact(&'a RationalAmount),
    Decimal(Decimal),
    Float(f64),
    Text(&'a str),
}

impl<'a> From<&'a RationalAmount> for Numeric<'a> {
    fn from(v: &'a RationalAmount) -> Self {
        Numeric::Exact(v)
    }
}

impl From<Decimal> for Numeric<'_> {
    fn from(v: Decimal) -> Self {
        Numeric::Decimal(v)
    }
}

impl From<f64> for Numeric<'_> {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

impl<'a> From<&'a str> for Numeric<'a> {
    fn from(v: &'a str) -> Self {
        Numeric::Text(v)
    }
}

impl Numeric<'_> {
    /// Rounds half away from zero to `digits`, or `None` if the value is not
    /// a number.
    fn rounded(&self, digits: u32) -> Option<Decimal> {
        let unrounded = match self {
            Numeric::Exact(amount) => return Some(amount.to_decimal(digits)),
            Numeric::Decimal(d) => *d,
            Numeric::Float(f) => Decimal::from_f64(*f)?,
            Numeric::Text(s) => match amount::parse_decimal(s) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("{}", e);
                    return None;
                }
            },
        };
        Some(unrounded.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero))
    }
}

#[derive(Debug, Default)]
struct CacheState {
    formats: HashMap<String, Arc<NumberFormat>>,
    unsupported: Vec<String>,
}

/// Append-only cache of `NumberFormat`s keyed by commodity code as given.
///
/// Shareable between threads and between formatters with different locales.
#[derive(Debug, Default)]
pub struct FormatterCache {
    state: Mutex<CacheState>,
}

impl FormatterCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the cached format for `code`, creating it on first use. An
    /// unrecognized code gets the plain decimal format, which is cached under
    /// the same key and reported once.
    pub fn get_or_create(&self, code: &str) -> Arc<NumberFormat> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(format) = state.formats.get(code) {
            return Arc::clone(format);
        }
        let format = match commodity_info(code) {
            Some(info) => NumberFormat::Currency {
                symbol: info.symbol,
                digits: info.minor_units,
            },
            None => {
                log::warn!(
                    "{}",
                    Issue::UnsupportedCurrencyCode {
                        code: code.to_string()
                    }
                );
                state.unsupported.push(code.to_string());
                NumberFormat::Decimal {
                    digits: DEFAULT_PRECISION,
                }
            }
        };
        log::debug!("caching number format for {:?}: {:?}", code, format);
        let format = Arc::new(format);
        state.formats.insert(code.to_string(), Arc::clone(&format));
        format
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .formats
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Codes that fell back to decimal formatting, in first-seen order.
    pub fn unsupported_codes(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsupported
            .clone()
    }

    /// The issues corresponding to `unsupported_codes`.
    pub fn issues(&self) -> Vec<Issue> {
        self.unsupported_codes()
            .into_iter()
            .map(|code| Issue::UnsupportedCurrencyCode { code })
            .collect()
    }
}

/// Formats amounts for display.
#[derive(Clone, Debug)]
pub struct CurrencyFormatter {
    locale: Locale,
    cache: Arc<FormatterCache>,
}

impl CurrencyFormatter {
    /// Creates a formatter with its own cache.
    pub fn new(locale: Locale) -> Self {
        Self::with_cache(locale, Arc::new(FormatterCache::new()))
    }

    pub fn with_cache(locale: Locale, cache: Arc<FormatterCache>) -> Self {
        Self { locale, cache }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn cache(&self) -> &Arc<FormatterCache> {
        &self.cache
    }

    /// Renders `amount` for the commodity `code`.
    ///
    /// Without a code (or with an empty one) the value is rendered with two
    /// fixed fractional digits, `.` separator, no grouping and no symbol.
    /// Values that are not numbers render as `"0.00"`.
    pub fn format<'a, N: Into<Numeric<'a>>>(&self, amount: N, code: Option<&str>) -> String {
        let amount = amount.into();
        match code.filter(|c| !c.is_empty()) {
            None => match amount.rounded(DEFAULT_PRECISION) {
                Some(value) => {
                    let (negative, unsigned) = fixed_digits(value, DEFAULT_PRECISION);
                    if negative {
                        format!("-{}", unsigned)
                    } else {
                        unsigned
                    }
                }
                None => NAN_FALLBACK.to_string(),
            },
            Some(code) => {
                let format = self.cache.get_or_create(code);
                match amount.rounded(format.digits()) {
                    Some(value) => format.render(value, &self.locale),
                    None => localize(NAN_FALLBACK, &self.locale),
                }
            }
        }
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

/// Splits a rounded value into its sign and its unsigned digits with exactly
/// `digits` fractional digits. Zero is never negative.
fn fixed_digits(value: Decimal, digits: u32) -> (bool, String) {
    let negative = value.is_sign_negative() && !value.is_zero();
    let mut unsigned = value.abs();
    unsigned.rescale(digits);
    (negative, unsigned.to_string())
}

/// Applies the locale's separators to an unsigned `"1234.50"`-style string.
fn localize(unsigned: &str, locale: &Locale) -> String {
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut out = String::with_capacity(unsigned.len() + int_part.len() / 3 + 1);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len - i - 1;
        if remaining > 0 && remaining % 3 == 0 {
            if let Some(sep) = locale.grouping_separator {
                out.push(sep);
            }
        }
    }
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator);
        out.push_str(frac);
    }
    out
}
