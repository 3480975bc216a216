//! Evaluating fitted polynomials at arbitrary query positions.
//!
//! Every polynomial is evaluated with Horner's scheme, starting from the highest-power
//! coefficient and multiplying in the query once per remaining coefficient. Each signal
//! runs for its own coefficient count.
//!
//! # Output shapes
//! Queries may have any shape, including 0-D. With [`EvalLayout::Broadcast`] (the default):
//! - a single-signal fit returns an array of the same shape as the query
//! - a multi-signal fit returns a table of shape `(len, M)`, where `len` is the number of
//!   query positions in logical (row-major) order, and column `i` holds signal `i`
//!
//! [`EvalLayout::Table`] always returns the `(len, M)` table, even for one signal.
//!
//! ```rust
//! use ndarray::array;
//! use polybatch::{fit_series, EvalLayout};
//!
//! let fit = fit_series(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 5.0, 7.0, 9.0], 1).unwrap();
//!
//! let grid = array![[5.0, 6.0], [7.0, 8.0]];
//! let y = fit.evaluate(&grid).unwrap();
//! assert_eq!(y.shape(), &[2, 2]);
//!
//! let table = fit.evaluate_with_layout(&grid, EvalLayout::Table).unwrap();
//! assert_eq!(table.shape(), &[4, 1]);
//! ```
use std::borrow::Cow;

use ndarray::{Array2, ArrayBase, ArrayD, ArrayView1, Axis, Data, Dimension};

use crate::{
    error::{Error, Result},
    fit::FitResult,
    value::{ensure_finite, Value},
};

/// Shape of the array returned by an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalLayout {
    /// Query shape for a single signal, `(len, M)` for several.
    #[default]
    Broadcast,

    /// Always `(len, M)`.
    Table,
}

/// Evaluates a polynomial at `x` with Horner's scheme.
///
/// `coefficients` are ordered from the highest power down to the constant term.
/// An empty slice evaluates to zero.
///
/// # Example
/// ```
/// # use polybatch::eval::horner;
/// // 2x² - 3x + 1
/// assert_eq!(horner(&[2.0, -3.0, 1.0], 2.0), 3.0);
/// ```
pub fn horner<T: Value>(coefficients: &[T], x: T) -> T {
    let Some((&first, rest)) = coefficients.split_first() else {
        return T::zero();
    };
    rest.iter().fold(first, |acc, &c| acc * x + c)
}

/// Differentiates a polynomial, highest power first.
///
/// A constant (or empty) polynomial has the derivative `[0]`.
///
/// # Example
/// ```
/// # use polybatch::eval::derivative;
/// // 2x² - 3x + 1 -> 4x - 3
/// assert_eq!(derivative(&[2.0, -3.0, 1.0]), vec![4.0, -3.0]);
/// ```
pub fn derivative<T: Value>(coefficients: &[T]) -> Vec<T> {
    let k = coefficients.len();
    if k <= 1 {
        return vec![T::zero()];
    }

    coefficients[..k - 1]
        .iter()
        .enumerate()
        .map(|(i, &c)| c * T::from_positive_int(k - 1 - i))
        .collect()
}

/// One signal's polynomial, ready to evaluate.
pub(crate) struct SignalPolynomial<'a, T: Value> {
    coefficients: Cow<'a, [T]>,
    value_shift: T,
}

impl<T: Value> SignalPolynomial<'_, T> {
    pub(crate) fn at(&self, x: T) -> T {
        horner(&self.coefficients, x) + self.value_shift
    }
}

impl<T: Value> FitResult<T> {
    /// Evaluates every signal at each query position.
    ///
    /// Extrapolates freely outside the sampled position range; see [`FitResult::evaluate_within`].
    /// The output shape follows [`EvalLayout::Broadcast`].
    ///
    /// # Errors
    /// - [`Error::EmptyQuery`] if `query` holds no positions
    /// - [`Error::NonFinite`] if a query position is NaN or infinite
    /// - An Invariant error if the fit's layout is inconsistent
    pub fn evaluate<S, D>(&self, query: &ArrayBase<S, D>) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        self.evaluate_with_layout(query, EvalLayout::Broadcast)
    }

    /// Evaluates every signal at each query position, with an explicit output layout.
    ///
    /// # Errors
    /// See [`FitResult::evaluate`].
    pub fn evaluate_with_layout<S, D>(
        &self,
        query: &ArrayBase<S, D>,
        layout: EvalLayout,
    ) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let polynomials = self.polynomials(false)?;
        self.evaluate_polynomials(&polynomials, query, layout)
    }

    /// Evaluates every signal at a slice of query positions.
    ///
    /// # Errors
    /// See [`FitResult::evaluate`].
    pub fn evaluate_slice(&self, query: &[T]) -> Result<ArrayD<T>> {
        self.evaluate(&ArrayView1::from(query))
    }

    /// Evaluates every signal at one position, returning one value per signal.
    ///
    /// # Errors
    /// See [`FitResult::evaluate`].
    pub fn evaluate_scalar(&self, x: T) -> Result<Vec<T>> {
        let polynomials = self.polynomials(false)?;
        check_query(std::iter::once(&x))?;

        let x = x - self.position_shift();
        Ok(polynomials.iter().map(|p| p.at(x)).collect())
    }

    /// Evaluates a single signal at one position.
    ///
    /// # Errors
    /// - [`Error::NoSuchSignal`] if `signal` is out of range
    /// - See [`FitResult::evaluate`]
    pub fn evaluate_signal(&self, signal: usize, x: T) -> Result<T> {
        self.validate()?;
        check_query(std::iter::once(&x))?;

        let polynomial = SignalPolynomial {
            coefficients: Cow::Borrowed(self.signal_coefficients(signal)?),
            value_shift: self.value_shift(signal),
        };
        Ok(polynomial.at(x - self.position_shift()))
    }

    /// Like [`FitResult::evaluate`], but rejects queries outside the sampled position range.
    ///
    /// # Errors
    /// - [`Error::EmptyQuery`] or [`Error::NonFinite`] for a malformed query, before the range check
    /// - [`Error::DataRange`] if any query position lies outside [`FitResult::position_range`]
    /// - See [`FitResult::evaluate`]
    pub fn evaluate_within<S, D>(&self, query: &ArrayBase<S, D>) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        check_query(query.iter())?;

        let range = self.position_range();
        if query.iter().any(|x| !range.contains(x)) {
            return Err(Error::DataRange(
                format!("{}", range.start()),
                format!("{}", range.end()),
            ));
        }

        self.evaluate(query)
    }

    /// Evaluates the first derivative of every signal at each query position.
    ///
    /// For orbit components sampled over time, this is the velocity.
    /// The output shape follows [`EvalLayout::Broadcast`].
    ///
    /// # Errors
    /// See [`FitResult::evaluate`].
    pub fn evaluate_derivative<S, D>(&self, query: &ArrayBase<S, D>) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        self.evaluate_derivative_with_layout(query, EvalLayout::Broadcast)
    }

    /// Evaluates the first derivative of every signal, with an explicit output layout.
    ///
    /// # Errors
    /// See [`FitResult::evaluate`].
    pub fn evaluate_derivative_with_layout<S, D>(
        &self,
        query: &ArrayBase<S, D>,
        layout: EvalLayout,
    ) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let polynomials = self.polynomials(true)?;
        self.evaluate_polynomials(&polynomials, query, layout)
    }

    pub(crate) fn position_shift(&self) -> T {
        self.centering
            .as_ref()
            .map_or_else(T::zero, |c| c.position_mean)
    }

    fn value_shift(&self, signal: usize) -> T {
        self.centering
            .as_ref()
            .and_then(|c| c.value_means.get(signal).copied())
            .unwrap_or_else(T::zero)
    }

    /// Validates the layout, then slices out each signal's polynomial.
    pub(crate) fn polynomials(&self, differentiate: bool) -> Result<Vec<SignalPolynomial<'_, T>>> {
        self.validate()?;

        (0..self.signal_count)
            .map(|signal| {
                let coefficients = self.signal_coefficients(signal)?;
                Ok(if differentiate {
                    SignalPolynomial {
                        coefficients: Cow::Owned(derivative(coefficients)),
                        value_shift: T::zero(),
                    }
                } else {
                    SignalPolynomial {
                        coefficients: Cow::Borrowed(coefficients),
                        value_shift: self.value_shift(signal),
                    }
                })
            })
            .collect()
    }

    fn evaluate_polynomials<S, D>(
        &self,
        polynomials: &[SignalPolynomial<'_, T>],
        query: &ArrayBase<S, D>,
        layout: EvalLayout,
    ) -> Result<ArrayD<T>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        check_query(query.iter())?;
        let shift = self.position_shift();

        if let ([polynomial], EvalLayout::Broadcast) = (polynomials, layout) {
            return Ok(query.mapv(|x| polynomial.at(x - shift)).into_dyn());
        }

        let xs: Vec<T> = query.iter().map(|&x| x - shift).collect();
        let mut table = Array2::zeros((xs.len(), polynomials.len()));
        for (mut column, polynomial) in table.axis_iter_mut(Axis(1)).zip(polynomials) {
            for (dst, &x) in column.iter_mut().zip(&xs) {
                *dst = polynomial.at(x);
            }
        }

        Ok(table.into_dyn())
    }
}

fn check_query<'a, T: Value>(query: impl IntoIterator<Item = &'a T>) -> Result<()> {
    let mut query = query.into_iter().peekable();
    if query.peek().is_none() {
        return Err(Error::EmptyQuery);
    }
    ensure_finite("query positions", query)
}

#[cfg(test)]
mod tests {
    use ndarray::{arr0, array, Array1, IxDyn};

    use crate::{assert_all_close, assert_close, fit_series, ErrorKind};

    use super::*;

    fn line() -> FitResult {
        FitResult::from_parts(1, 1, vec![2.0, 1.0], 0.0..=4.0, None).unwrap()
    }

    #[test]
    fn test_horner() {
        assert_eq!(horner::<f64>(&[], 3.0), 0.0);
        assert_eq!(horner(&[7.0], 3.0), 7.0);
        assert_eq!(horner(&[1.0, 0.0, 0.0, 0.0], 2.0), 8.0);
        assert_eq!(horner(&[1.0, -2.0, 3.0, 4.0], -1.0), -2.0);
    }

    #[test]
    fn test_single_signal_keeps_shape() {
        let fit = line();

        let y = fit.evaluate(&array![5.0, 6.0]).unwrap();
        assert_eq!(y.shape(), &[2]);
        assert_all_close!(y.iter().copied().collect::<Vec<_>>(), &[11.0, 13.0]);

        let grid = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let y = fit.evaluate(&grid).unwrap();
        assert_eq!(y.shape(), &[2, 3]);
        assert_close!(y[[1, 2]], 11.0);
    }

    #[test]
    fn test_scalar_consistency() {
        let fit = line();

        let zero_d = fit.evaluate(&arr0(2.5)).unwrap();
        assert_eq!(zero_d.ndim(), 0);

        let one = fit.evaluate(&array![2.5]).unwrap();
        assert_eq!(one.shape(), &[1]);

        let scalar = fit.evaluate_scalar(2.5).unwrap();
        assert_close!(zero_d[IxDyn(&[])], scalar[0]);
        assert_close!(one[[0]], scalar[0]);
        assert_close!(fit.evaluate_signal(0, 2.5).unwrap(), 6.0);
    }

    #[test]
    fn test_multi_signal_table() {
        // y0 = 2x + 1, y1 = x² - 3
        let fit =
            FitResult::from_parts(2, [1, 2], vec![2.0, 1.0, 1.0, 0.0, -3.0], 0.0..=4.0, None)
                .unwrap();

        let grid = array![[0.0, 1.0], [2.0, 3.0]];
        let y = fit.evaluate(&grid).unwrap();
        assert_eq!(y.shape(), &[4, 2]);
        assert_close!(y[[3, 0]], 7.0);
        assert_close!(y[[3, 1]], 6.0);
        assert_close!(y[[1, 1]], -2.0);

        let y = fit.evaluate(&arr0(2.0)).unwrap();
        assert_eq!(y.shape(), &[1, 2]);
        assert_eq!(fit.evaluate_scalar(2.0).unwrap(), vec![5.0, 1.0]);
    }

    #[test]
    fn test_table_layout() {
        let fit = line();
        let y = fit
            .evaluate_with_layout(&array![1.0, 2.0, 3.0], EvalLayout::Table)
            .unwrap();
        assert_eq!(y.shape(), &[3, 1]);
        assert_close!(y[[2, 0]], 7.0);
    }

    #[test]
    fn test_query_validation() {
        let fit = line();

        let empty = Array1::<f64>::zeros(0);
        assert!(matches!(fit.evaluate(&empty), Err(Error::EmptyQuery)));

        let err = fit.evaluate(&array![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::NonFinite { index: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(fit.evaluate_scalar(f64::INFINITY).is_err());
    }

    #[test]
    fn test_corrupt_layout_is_rejected() {
        let mut fit = line();
        fit.coefficients.pop();

        let err = fit.evaluate(&array![1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert!(fit.evaluate_scalar(1.0).is_err());
    }

    #[test]
    fn test_evaluate_within() {
        let fit = line();
        assert!(fit.evaluate_within(&array![0.0, 4.0]).is_ok());

        let err = fit.evaluate_within(&array![0.0, 4.5]).unwrap_err();
        assert!(matches!(err, Error::DataRange(..)));

        let err = fit.evaluate_within(&array![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::NonFinite { index: 1, .. }));

        assert!(fit.evaluate(&array![4.5]).is_ok());
    }

    #[test]
    fn test_derivative() {
        assert_eq!(derivative(&[5.0]), vec![0.0]);
        assert_eq!(derivative(&[1.0, 1.0, 1.0, 1.0]), vec![3.0, 2.0, 1.0]);

        // y = x³ sampled exactly, so dy/dx = 3x²
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| x * x * x).collect();
        let fit = fit_series(&xs, &ys, 3).unwrap();
        let v = fit.evaluate_derivative(&array![2.0]).unwrap();
        assert_close!(v[[0]], 12.0, tol = 1e-8);
    }

    #[test]
    fn test_centered_evaluation_adds_means_back() {
        let centered = FitResult::from_parts(
            1,
            1,
            vec![2.0, 0.0],
            0.0..=3.0,
            Some(crate::Centering {
                position_mean: 1.5,
                value_means: vec![4.0],
            }),
        )
        .unwrap();

        // y = 2(x - 1.5) + 4
        assert_close!(centered.evaluate_scalar(3.0).unwrap()[0], 7.0);
        let v = centered.evaluate_derivative(&array![3.0]).unwrap();
        assert_close!(v[[0]], 2.0);
    }
}
