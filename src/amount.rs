//! Exact monetary values held as an integer numerator/denominator pair.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::quality::{Issue, Issues};

/// Fractional digits used when the commodity's precision is not known.
pub const DEFAULT_PRECISION: u32 = 2;
/// Largest number of fractional digits that `RationalAmount` will render.
///
/// `i64::MAX * 10^9` still fits in a `Decimal` mantissa.
pub const MAX_PRECISION: u32 = 9;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AmountError {
    #[error("denominator must be positive, got {0}")]
    NonPositiveDenominator(i64),
    #[error("{0:?} is not a decimal number")]
    NotANumber(String),
    #[error("numerator without a denominator")]
    MissingDenominator,
    #[error("denominator without a numerator")]
    MissingNumerator,
    #[error("amount does not fit in 64 bits")]
    Overflow,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    fn from_ordering(ord: Ordering) -> Self {
        use Ordering::*;
        match ord {
            Less => Sign::Negative,
            Equal => Sign::Zero,
            Greater => Sign::Positive,
        }
    }

    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }
}

/// Presentational styling for a displayed balance. Zero is styled as
/// positive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BalanceStyle {
    Positive,
    Negative,
}

impl From<Sign> for BalanceStyle {
    fn from(sign: Sign) -> Self {
        if sign.is_negative() {
            BalanceStyle::Negative
        } else {
            BalanceStyle::Positive
        }
    }
}

/// An exact fractional amount, `numerator / denominator` with
/// `denominator > 0`, together with its decimal rendering at a fixed
/// precision.
///
/// Equality compares values, so `1/2` equals `50/100`.
#[derive(Clone, Debug)]
pub struct RationalAmount {
    numerator: i64,
    denominator: i64,
    precision: u32,
    decimal: String,
}

impl RationalAmount {
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, AmountError> {
        Self::with_precision(numerator, denominator, DEFAULT_PRECISION)
    }

    /// Creates an amount whose decimal view is rendered with `precision`
    /// fractional digits (clamped to `MAX_PRECISION`).
    pub fn with_precision(
        numerator: i64,
        denominator: i64,
        precision: u32,
    ) -> Result<Self, AmountError> {
        if denominator <= 0 {
            return Err(AmountError::NonPositiveDenominator(denominator));
        }
        let precision = precision.min(MAX_PRECISION);
        let decimal = round_to_decimal(numerator, denominator, precision).to_string();
        Ok(Self {
            numerator,
            denominator,
            precision,
            decimal,
        })
    }

    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
            precision: DEFAULT_PRECISION,
            decimal: "0.00".to_string(),
        }
    }

    /// Parses a decimal string such as `"-12.50"` into an exact amount over a
    /// power-of-ten denominator.
    pub fn from_decimal_str(s: &str) -> Result<Self, AmountError> {
        let d = parse_decimal(s)?;
        let numerator = i64::try_from(d.mantissa()).map_err(|_| AmountError::Overflow)?;
        let denominator = 10i64
            .checked_pow(d.scale())
            .ok_or(AmountError::Overflow)?;
        Self::new(numerator, denominator)
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// The pre-rendered decimal view.
    pub fn as_decimal_str(&self) -> &str {
        &self.decimal
    }

    /// Rounds the exact value half away from zero to `precision` digits.
    pub fn to_decimal(&self, precision: u32) -> Decimal {
        round_to_decimal(self.numerator, self.denominator, precision.min(MAX_PRECISION))
    }

    pub fn to_decimal_string(&self, precision: u32) -> String {
        self.to_decimal(precision).to_string()
    }

    /// Sign of the exact value, computed from the numerator alone.
    pub fn sign(&self) -> Sign {
        Sign::from_ordering(self.numerator.cmp(&0))
    }

    pub fn style(&self) -> BalanceStyle {
        self.sign().into()
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Exact sum, reduced to lowest terms. The decimal view uses the larger
    /// precision of the two operands.
    pub fn checked_add(&self, other: &Self) -> Result<Self, AmountError> {
        let num = i128::from(self.numerator) * i128::from(other.denominator)
            + i128::from(other.numerator) * i128::from(self.denominator);
        let den = i128::from(self.denominator) * i128::from(other.denominator);
        let g = gcd(num.abs(), den);
        let num = i64::try_from(num / g).map_err(|_| AmountError::Overflow)?;
        let den = i64::try_from(den / g).map_err(|_| AmountError::Overflow)?;
        Self::with_precision(num, den, self.precision.max(other.precision))
    }

    pub fn checked_neg(&self) -> Result<Self, AmountError> {
        let numerator = self.numerator.checked_neg().ok_or(AmountError::Overflow)?;
        Self::with_precision(numerator, self.denominator, self.precision)
    }

    pub fn abs(&self) -> Result<Self, AmountError> {
        if self.sign().is_negative() {
            self.checked_neg()
        } else {
            Ok(self.clone())
        }
    }

    /// Adjusts a raw balance for accounting conventions: debit accounts keep
    /// their sign, credit accounts are negated.
    pub fn normalize_sign(&self, is_debit_account: bool) -> Result<Self, AmountError> {
        if is_debit_account {
            Ok(self.clone())
        } else {
            self.checked_neg()
        }
    }
}

impl Default for RationalAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for RationalAmount {
    fn eq(&self, other: &Self) -> bool {
        i128::from(self.numerator) * i128::from(other.denominator)
            == i128::from(other.numerator) * i128::from(self.denominator)
    }
}

impl Eq for RationalAmount {}

impl PartialOrd for RationalAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RationalAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        (i128::from(self.numerator) * i128::from(other.denominator))
            .cmp(&(i128::from(other.numerator) * i128::from(self.denominator)))
    }
}

impl fmt::Display for RationalAmount {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.decimal)
    }
}

/// Classifies the sign of a decimal string when no numerator/denominator pair
/// is available. Unreadable text is `Sign::Zero` and is recorded as
/// `Issue::MalformedAmount`.
pub fn sign_of_decimal_str(s: &str, issues: &mut Issues) -> Sign {
    match parse_decimal(s) {
        Ok(d) if d.is_zero() => Sign::Zero,
        Ok(d) if d.is_sign_negative() => Sign::Negative,
        Ok(_) => Sign::Positive,
        Err(e) => {
            issues.record(Issue::MalformedAmount {
                context: "decimal string".to_string(),
                reason: e.to_string(),
            });
            Sign::Zero
        }
    }
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal, AmountError> {
    Decimal::from_str(s.trim()).map_err(|_| AmountError::NotANumber(s.to_string()))
}

fn round_to_decimal(numerator: i64, denominator: i64, precision: u32) -> Decimal {
    let scaled = i128::from(numerator) * 10i128.pow(precision);
    let denominator = i128::from(denominator);
    let mut quotient = scaled / denominator;
    let remainder = scaled % denominator;
    if 2 * remainder.abs() >= denominator {
        quotient += scaled.signum();
    }
    Decimal::from_i128_with_scale(quotient, precision)
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}
