//! Numeric token normalization.
//!
//! Rate tables are typed by hand: values show up as numbers, as
//! `"R$ 37,50"`, as `"35.0"` or as garbage. Everything that turns a cell into
//! a monetary amount goes through [`normalize_numeric_token`].

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

use crate::models::Cell;

/// The currency marker stripped from textual amounts.
pub const CURRENCY_MARKER: &str = "R$";

/// The outcome of coercing a cell into a non-negative amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericToken {
    /// The cell held a usable amount.
    Parsed(Decimal),
    /// The cell could not be used; `value` is the substituted default.
    Defaulted {
        /// The default that was substituted.
        value: Decimal,
        /// Why the cell was rejected.
        reason: String,
    },
}

impl NumericToken {
    /// The amount to use, parsed or defaulted.
    pub fn value(&self) -> Decimal {
        match self {
            NumericToken::Parsed(value) => *value,
            NumericToken::Defaulted { value, .. } => *value,
        }
    }

    /// Returns true when the default was substituted.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, NumericToken::Defaulted { .. })
    }
}

/// Coerces a cell into a non-negative decimal amount.
///
/// Text has the currency marker and all whitespace removed and a decimal
/// comma turned into a point before parsing. Missing, unparseable, negative
/// or non-finite values yield [`NumericToken::Defaulted`] with `default`.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::{normalize_numeric_token, NumericToken};
/// use benefit_engine::models::Cell;
/// use rust_decimal::Decimal;
///
/// let token = normalize_numeric_token(&Cell::from("R$ 37,50"), Decimal::ZERO);
/// assert_eq!(token, NumericToken::Parsed(Decimal::new(3750, 2)));
///
/// let token = normalize_numeric_token(&Cell::from("n/a"), Decimal::ZERO);
/// assert!(token.is_defaulted());
/// assert_eq!(token.value(), Decimal::ZERO);
/// ```
pub fn normalize_numeric_token(cell: &Cell, default: Decimal) -> NumericToken {
    let defaulted = |reason: String| NumericToken::Defaulted {
        value: default,
        reason,
    };

    let parsed = match cell {
        Cell::Empty => return defaulted("value is missing".to_string()),
        Cell::Number(n) => match Decimal::from_f64(*n) {
            Some(value) => value,
            None => return defaulted(format!("'{}' is not a finite number", n)),
        },
        Cell::Text(raw) => {
            let cleaned: String = raw
                .replace(CURRENCY_MARKER, "")
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if cleaned.is_empty() {
                return defaulted("value is missing".to_string());
            }
            match Decimal::from_str(&cleaned) {
                Ok(value) => value,
                Err(_) => return defaulted(format!("cannot parse '{}' as a number", raw)),
            }
        }
    };

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return defaulted(format!("'{}' is negative", parsed));
    }

    NumericToken::Parsed(parsed)
}
