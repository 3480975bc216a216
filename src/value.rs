//! Numeric types and iteration utilities for batched fits.
//!
//! This module defines the [`Value`] trait, which abstracts the floating-point
//! types that positions, values, and coefficients can be stored as, ensuring
//! compatibility with nalgebra, ndarray, and formatting.
//!
//! # Traits
//!
//! - [`Value`]: Extends `FloatCore`, `Scalar`, and `ComplexField` to provide:
//!   - `try_cast` for safe type conversion with error handling.
//!   - `is_finite_value` for input validation.
//!
//! # Iterators
//!
//! - [`SteppedValues`]: A floating-point range iterator with a specified step,
//!   useful for generating sample or query positions.
//!
//! # Example
//!
//! ```rust
//! use polybatch::value::{SteppedValues, Value};
//!
//! // Positions from 0.0 to 1.0 in steps of 0.25
//! let positions: Vec<f64> = SteppedValues::new(0.0..=1.0, 0.25).collect();
//! assert_eq!(positions.len(), 5);
//!
//! assert!(positions[2].is_finite_value());
//! assert!(!f64::NAN.is_finite_value());
//! ```
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Numeric type for positions, values and coefficients
pub trait Value:
    nalgebra::Scalar
    + nalgebra::ComplexField<RealField = Self>
    + nalgebra::RealField
    + num_traits::float::FloatCore
    + std::fmt::LowerExp
{
    /// Tries to cast a value to the target type
    ///
    /// # Errors
    /// Returns an error if the cast fails
    fn try_cast<U: num_traits::NumCast>(n: U) -> Result<Self> {
        num_traits::cast(n).ok_or(Error::CastFailed)
    }

    /// Converts the value to `usize`
    fn as_usize(&self) -> Option<usize> {
        num_traits::cast(*self)
    }

    /// Raises the value to the power of an integer
    #[must_use]
    fn powi(self, n: i32) -> Self {
        nalgebra::ComplexField::powi(self, n)
    }

    /// Get the absolute value for a numeric type
    #[must_use]
    fn abs(self) -> Self {
        nalgebra::ComplexField::abs(self)
    }

    /// Returns the absolute difference between two values.
    #[must_use]
    fn abs_sub(self, other: Self) -> Self {
        nalgebra::ComplexField::abs(self - other)
    }

    /// True if the value is neither NaN nor infinite
    fn is_finite_value(&self) -> bool {
        num_traits::float::FloatCore::is_finite(*self)
    }

    /// Converts a `usize` to the target numeric type.
    ///
    /// Results in `infinity` if the value is out of range.
    #[must_use]
    fn from_positive_int(n: usize) -> Self {
        Self::try_cast(n).unwrap_or(Self::infinity())
    }
}

impl<T> Value for T where
    T: nalgebra::Scalar
        + nalgebra::ComplexField<RealField = Self>
        + nalgebra::RealField
        + num_traits::float::FloatCore
        + std::fmt::LowerExp
{
}

/// Checks that every element of `values` is finite.
///
/// `input` names the offending input in the returned error.
///
/// # Errors
/// Returns [`Error::NonFinite`] with the index of the first NaN or infinity.
pub fn ensure_finite<'a, T: Value>(
    input: &'static str,
    values: impl IntoIterator<Item = &'a T>,
) -> Result<()> {
    match values.into_iter().position(|v| !v.is_finite_value()) {
        Some(index) => Err(Error::NonFinite { input, index }),
        None => Ok(()),
    }
}

/// Returns the smallest and largest of a set of values, or `None` if there are none.
pub fn min_max<T: Value>(values: impl IntoIterator<Item = T>) -> Option<(T, T)> {
    values.into_iter().fold(None, |acc, v| {
        Some(match acc {
            Some((min, max)) => (
                nalgebra::RealField::min(min, v),
                nalgebra::RealField::max(max, v),
            ),
            None => (v, v),
        })
    })
}

/// Iterator over a range of floating-point values with a specified step.
///
/// This iterator yields values starting from `start` up to and including `end`,
/// incrementing by `step` on each iteration.
pub struct SteppedValues<T: Value> {
    range: RangeInclusive<T>,
    step: T,
    index: T,
}
impl<T: Value> SteppedValues<T> {
    /// Creates a new iterator over stepped values in a range
    ///
    /// Will yield values starting from `range.start` up to and including `range.end`
    pub fn new(range: RangeInclusive<T>, step: T) -> Self {
        Self {
            range,
            step,
            index: T::zero(),
        }
    }

    /// Creates a new iterator over stepped values in a range with a step of 1.0
    ///
    /// Will yield values starting from `range.start` up to and including `range.end`
    pub fn new_unit(range: RangeInclusive<T>) -> Self {
        Self::new(range, T::one())
    }

    /// Returns the number of steps remaining in the iterator
    pub fn len(&self) -> usize {
        let value = *self.range.start() + self.index * self.step;
        if value > *self.range.end() {
            return 0;
        }
        let remaining = *self.range.end() - value;
        let steps = remaining / self.step;
        steps.as_usize().map_or(0, |s| s + 1)
    }

    /// Returns true if the iterator is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<T: Value> Iterator for SteppedValues<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = *self.range.start() + self.index * self.step;
        if value <= *self.range.end() {
            self.index += T::one();
            Some(value)
        } else {
            None
        }
    }
}
