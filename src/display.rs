//! Utilities for displaying fitted polynomials
//!
//! This module turns packed coefficient vectors into human-readable equations,
//! one line per signal, such as `y₀(x) = 2.00x + 1.00`.
//!
//! # Key Concepts
//! - **[`Term`]**: Represents a single polynomial term with a sign and body.
//! - **[`Sign`]**: Tracks whether a term is positive or negative.
//!
//! # Helpers
//! - [`format_polynomial`]: Writes a full equation for one coefficient vector.
//! - [`format_coefficient`]: Formats a numeric coefficient, skipping zeros.
//! - [`format_variable`]: Adds subscripts and superscript exponents to a variable name.
#![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

use crate::value::Value;

pub mod unicode;

/// Default precision for formatting coefficients
pub const DEFAULT_PRECISION: usize = 2;

/// Default range in which scientific notation is not used
#[must_use]
pub fn default_fixed_range<T: Value>() -> Option<std::ops::Range<T>> {
    const RANGE: std::ops::Range<f64> = 1e-3..1e3;
    let s = T::try_cast(RANGE.start).ok()?;
    let e = T::try_cast(RANGE.end).ok()?;
    Some(s..e)
}

/// Represents the sign of a polynomial term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Positive sign (`+` when displayed).
    Positive,

    /// Negative sign (`-` when displayed).
    Negative,
}

impl Sign {
    /// Determines the sign from a numeric coefficient.
    ///
    /// # Example
    /// ```
    /// # use polybatch::display::Sign;
    /// assert_eq!(Sign::from_coef(3.0), Sign::Positive);
    /// assert_eq!(Sign::from_coef(-2.0), Sign::Negative);
    /// ```
    pub fn from_coef<T: Value>(coef: T) -> Self {
        if coef < T::zero() {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    /// Returns the character representation of the sign.
    #[must_use]
    pub fn char(&self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// A single term of a polynomial for display purposes.
///
/// Combines the **sign** and the **formatted body** (e.g., `"2x²"`, `"3.14"`, `"x"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// The sign of the term (positive or negative).
    pub sign: Sign,

    /// The body of the term, without its sign.
    pub body: String,
}

impl Term {
    /// Creates a new polynomial term with the given sign and body.
    #[must_use]
    pub fn new(sign: Sign, body: String) -> Self {
        Self { sign, body }
    }

    /// Formats the term `coef·variableᵖᵒʷᵉʳ`.
    ///
    /// Returns `None` if the coefficient is zero.
    pub fn monomial<T: Value>(power: i32, coef: T, variable: &str) -> Option<Self> {
        let sign = Sign::from_coef(coef);
        let coef = format_coefficient(coef, power, DEFAULT_PRECISION)?;
        let var = format_variable(variable, None, power);
        Some(Self::new(sign, format!("{coef}{var}")))
    }
}

/// Writes `label(x) = ...` for one coefficient vector into `buffer`.
///
/// # Coefficients
/// - `coefficients[i]` is the coefficient of `variable^(len - 1 - i)`: highest power first.
/// - Zero coefficients are skipped. An all-zero polynomial is written as `0`.
///
/// # Errors
/// Returns an error if writing to `buffer` fails.
///
/// # Example
/// ```
/// # use polybatch::display::format_polynomial;
/// let mut s = String::new();
/// format_polynomial(&mut s, "y₀", "x", &[3.0, 0.0, -1.0]).unwrap();
/// assert_eq!(s, "y₀(x) = 3.00x² - 1.00");
/// ```
pub fn format_polynomial<T: Value, B: std::fmt::Write>(
    buffer: &mut B,
    label: &str,
    variable: &str,
    coefficients: &[T],
) -> std::fmt::Result {
    let degree = coefficients.len().saturating_sub(1);
    let terms: Vec<Term> = coefficients
        .iter()
        .enumerate()
        .filter_map(|(i, &coef)| Term::monomial((degree - i) as i32, coef, variable))
        .collect();

    write!(buffer, "{label}(x) = ")?;
    write_terms(buffer, terms)
}

/// Formats the independent variable of a polynomial expanded about `center`.
///
/// # Example
/// ```
/// # use polybatch::display::centered_variable;
/// assert_eq!(centered_variable(0.0), "x");
/// assert_eq!(centered_variable(3.5), "(x - 3.50)");
/// assert_eq!(centered_variable(-2.0), "(x + 2.00)");
/// ```
#[must_use]
pub fn centered_variable<T: Value>(center: T) -> String {
    let Some(offset) = format_coefficient(center, 0, DEFAULT_PRECISION) else {
        return "x".to_string();
    };

    match Sign::from_coef(center) {
        Sign::Positive => format!("(x - {offset})"),
        Sign::Negative => format!("(x + {offset})"),
    }
}

/// Writes a sequence of terms, joined by their signs.
///
/// The first term is written without a leading `+`.
///
/// # Errors
/// Returns an error if writing to `buffer` fails.
pub fn write_terms<B: std::fmt::Write>(buffer: &mut B, terms: Vec<Term>) -> std::fmt::Result {
    let mut terms = terms.into_iter();
    let Some(first) = terms.next() else {
        return write!(buffer, "0");
    };

    if first.sign == Sign::Negative {
        write!(buffer, "{}", first.sign.char())?;
    }
    write!(buffer, "{}", first.body)?;

    for term in terms {
        write!(buffer, " {} {}", term.sign.char(), term.body)?;
    }

    Ok(())
}

/// Formats a numeric coefficient for display in a polynomial term.
///
/// - Returns `None` if the coefficient is zero or effectively zero (≤ epsilon).
/// - Returns an empty string for a coefficient of 1 on a non-constant term.
/// - Formats as a decimal if the absolute value is between `1e-3` and `1e3`.
/// - Formats in scientific notation otherwise.
///
/// The sign is not included; see [`Sign::from_coef`].
///
/// # Example
/// ```
/// # use polybatch::display::format_coefficient;
/// assert_eq!(format_coefficient(0.0, 1, 2), None);
/// assert_eq!(format_coefficient(2.5, 1, 2), Some("2.50".to_string()));
/// assert_eq!(format_coefficient(1e5, 1, 2), Some("1.00e5".to_string()));
/// ```
pub fn format_coefficient<T: Value>(coef: T, power: i32, precision: usize) -> Option<String> {
    let abs = Value::abs(coef);

    if abs <= T::epsilon() {
        return None;
    }

    if abs.abs_sub(T::one()) <= T::epsilon() && power != 0 {
        return Some(String::new());
    }

    let sci_cutoff = default_fixed_range();
    Some(unicode::float(abs, sci_cutoff, precision))
}

/// Formats the variable part of a polynomial term for display purposes.
///
/// # Behavior
/// - If `exp == 0`, returns an empty string (`""`).
/// - If `exp == 1`, returns the base string unchanged.
/// - Otherwise, appends the subscript and the Unicode superscript version of `exp` to `base`.
///
/// # Examples
/// ```
/// # use polybatch::display::format_variable;
/// assert_eq!(format_variable("x", None, 0), "");
/// assert_eq!(format_variable("x", None, 1), "x");
/// assert_eq!(format_variable("x", Some("1"), 2), "x₁²");
/// ```
#[must_use]
pub fn format_variable(base: &str, subscript: Option<&str>, exp: i32) -> String {
    match exp {
        0 => String::new(),
        1 => base.to_string(),
        _ => {
            let lbl = unicode::subscript(subscript.unwrap_or_default());
            let sup = unicode::superscript(&exp.to_string());
            format!("{base}{lbl}{sup}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equation(coefficients: &[f64]) -> String {
        let mut buf = String::new();
        format_polynomial(&mut buf, "y", "x", coefficients).unwrap();
        buf
    }

    #[test]
    fn test_sign_from_coef() {
        assert_eq!(Sign::from_coef(1.0), Sign::Positive);
        assert_eq!(Sign::from_coef(-1.0), Sign::Negative);
        assert_eq!(Sign::from_coef(0.0), Sign::Positive);
    }

    #[test]
    fn test_format_coefficient() {
        assert_eq!(format_coefficient(2.5, 1, 2), Some("2.50".to_string()));
        assert_eq!(format_coefficient(-2.5, 1, 2), Some("2.50".to_string()));
        assert_eq!(format_coefficient(0.0, 1, 2), None);
        assert_eq!(format_coefficient(1e-20, 1, 2), None);
        assert_eq!(format_coefficient(1e-5, 2, 2), Some("1.00e-5".to_string()));
        assert_eq!(format_coefficient(-1.0, 2, 2), Some(String::new()));
        assert_eq!(format_coefficient(1.0, 0, 2), Some("1.00".to_string()));
    }

    #[test]
    fn test_format_variable() {
        assert_eq!(format_variable("x", None, 0), "");
        assert_eq!(format_variable("x", None, 1), "x");
        assert_eq!(format_variable("T", None, 3), "T³");
        assert_eq!(format_variable("x", None, 12), "x¹²");
    }

    #[test]
    fn test_format_polynomial_highest_first() {
        assert_eq!(equation(&[2.0, 1.0]), "y(x) = 2.00x + 1.00");
        assert_eq!(equation(&[4.0, -3.0, 0.0, 2.0]), "y(x) = 4.00x³ - 3.00x² + 2.00");
    }

    #[test]
    fn test_format_polynomial_edge_cases() {
        assert_eq!(equation(&[0.0, 0.0, 0.0]), "y(x) = 0");
        assert_eq!(equation(&[-1.0, 2.0]), "y(x) = -x + 2.00");
        assert_eq!(equation(&[5.0, 0.0, 0.0]), "y(x) = 5.00x²");
        assert_eq!(equation(&[7.0]), "y(x) = 7.00");
    }
}
