//! Unicode formatting utilities
use std::ops::Range;

use crate::value::Value;

/// Format a floating point number as a string
///
/// # Parameters
/// - `n`: The number to format
/// - `fixed_range`: An optional range specifying the values that will not be formatted in scientific notation
/// - `precision`: The number of decimal places to include
pub fn float<T: Value>(n: T, fixed_range: Option<Range<T>>, precision: usize) -> String {
    match fixed_range {
        Some(range) if range.contains(&n) => format!("{n:.precision$}"),
        _ => format!("{n:.precision$e}"),
    }
}

/// Convert a string into a superscript string, ignoring invalid characters
pub fn superscript(s: &str) -> String {
    s.chars().filter_map(to_superscript).collect()
}

/// Convert a string into a subscript string, ignoring invalid characters
pub fn subscript(s: &str) -> String {
    s.chars().filter_map(to_subscript).collect()
}

fn to_superscript(c: char) -> Option<char> {
    match c {
        '0' => Some('⁰'),
        '1' => Some('¹'),
        '2' => Some('²'),
        '3' => Some('³'),
        '4' => Some('⁴'),
        '5' => Some('⁵'),
        '6' => Some('⁶'),
        '7' => Some('⁷'),
        '8' => Some('⁸'),
        '9' => Some('⁹'),
        '+' => Some('⁺'),
        '-' => Some('⁻'),
        '(' => Some('⁽'),
        ')' => Some('⁾'),
        _ => None,
    }
}

fn to_subscript(c: char) -> Option<char> {
    match c {
        '0' => Some('₀'),
        '1' => Some('₁'),
        '2' => Some('₂'),
        '3' => Some('₃'),
        '4' => Some('₄'),
        '5' => Some('₅'),
        '6' => Some('₆'),
        '7' => Some('₇'),
        '8' => Some('₈'),
        '9' => Some('₉'),
        '+' => Some('₊'),
        '-' => Some('₋'),
        '(' => Some('₍'),
        ')' => Some('₎'),
        _ => None,
    }
}
