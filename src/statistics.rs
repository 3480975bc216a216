//! Descriptive statistics and goodness-of-fit measures for fitted signals
//!
//! # Descriptive Statistics
//! - [`mean`]: Arithmetic mean of a dataset. Used to center positions and signals.
//! - [`stddev_and_mean`]: Standard deviation and mean of a dataset.
//!
//! # Error Metrics
//! - [`mean_squared_error`]: Average squared difference between observed and predicted values. Lower is better.
//! - [`root_mean_squared_error`]: Square root of MSE, giving error in same units as observed values. Lower is better.
//!
//! # Model Fit
//! - [`r_squared`]: Proportion of variance explained by the model. Higher is better (0 to 1).
//!
//! # Examples
//!
//! ```rust
//! use polybatch::statistics::{r_squared, root_mean_squared_error};
//!
//! let y = vec![1.0, 2.0, 3.0];
//! let y_fit = vec![1.1, 1.9, 3.05];
//!
//! let r2 = r_squared(y.iter().copied(), y_fit.iter().copied());
//! let rms = root_mean_squared_error(y.into_iter(), y_fit.into_iter());
//! assert!(r2 > 0.9);
//! assert!(rms < 0.1);
//! ```
use crate::value::Value;

/// Computes the arithmetic mean of a sequence of values.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// Mean = (Σ x_i) / N
/// where
///   x_i = each value in the dataset, N = total number of values
/// ```
/// </div>
///
/// Returns NaN if the iterator yields no elements.
///
/// # Examples
/// ```rust
/// let values = vec![1.0, 2.0, 3.0];
/// let m = polybatch::statistics::mean(values.into_iter());
/// assert_eq!(m, 2.0);
/// ```
pub fn mean<T: Value>(data: impl Iterator<Item = T>) -> T {
    let mut sum = T::zero();
    let mut count = T::zero();
    for value in data {
        sum += value;
        count += T::one();
    }
    sum / count
}

/// Computes the standard deviation of a sequence of values, and its mean.
/// - Uses the population formula (divides by `N`) rather than `N-1`.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// σ = sqrt( (Σ (x_i - Mean)²) / N )
/// ```
/// </div>
///
/// # Returns
/// `(stddev, mean)`
pub fn stddev_and_mean<T: Value>(data: impl Iterator<Item = T>) -> (T, T) {
    let data: Vec<T> = data.collect();
    let m = mean(data.iter().copied());
    let variance = mean(data.iter().map(|&x| Value::powi(x - m, 2)));
    (variance.sqrt(), m)
}

/// Computes the mean squared error (MSE) between two sets of values.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// MSE = (1/n) * Σ (y_i - y_fit_i)²
/// ```
/// </div>
///
/// Returns NaN for empty input.
pub fn mean_squared_error<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> T {
    let mut total = T::zero();
    let mut n = T::zero();
    for (y, y_fit) in y.zip(y_fit) {
        total += Value::powi(y - y_fit, 2);
        n += T::one();
    }
    total / n
}

/// Computes the root mean squared error (RMSE) between two sets of values.
///
/// This is the RMS of the residuals, in the same units as the values.
///
/// # Example
/// ```rust
/// # use polybatch::statistics::root_mean_squared_error;
/// let y: Vec<f64> = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.0, 2.0, 5.0];
/// let rms = root_mean_squared_error(y.into_iter(), y_fit.into_iter());
/// assert!((rms - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
/// ```
pub fn root_mean_squared_error<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> T {
    mean_squared_error(y, y_fit).sqrt()
}

/// Calculate the R-squared value for a set of data.
///
/// R-squared is a number between 0 and 1 that tells you how well the model explains the data:
/// - `0` means the model explains none of the variation.
/// - `1` means the model explains all the variation.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// R² = 1 - (SS_res / SS_tot)
/// where
///   SS_res = Σ (y_i - y_fit_i)²
///   SS_tot = Σ (y_i - y_mean)²
/// ```
/// </div>
///
/// If the observed values have no variance, returns 1 for an exact match and 0 otherwise.
pub fn r_squared<T: Value>(y: impl Iterator<Item = T>, y_fit: impl Iterator<Item = T>) -> T {
    let y: Vec<T> = y.collect();
    let y_mean = mean(y.iter().copied());

    let mut ss_total = T::zero();
    let mut ss_residual = T::zero();
    for (y, y_fit) in y.into_iter().zip(y_fit) {
        ss_total += Value::powi(y - y_mean, 2);
        ss_residual += Value::powi(y - y_fit, 2);
    }

    if ss_total == T::zero() {
        return if ss_residual == T::zero() {
            T::one()
        } else {
            T::zero()
        };
    }

    T::one() - (ss_residual / ss_total)
}

#[cfg(test)]
mod tests {
    use crate::assert_close;

    use super::*;

    #[test]
    fn test_mean() {
        assert_close!(mean([1.0, 2.0, 3.0, 6.0].into_iter()), 3.0);
        assert!(mean(Vec::<f64>::new().into_iter()).is_nan());
    }

    #[test]
    fn test_stddev() {
        let (sd, m) = stddev_and_mean([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter());
        assert_close!(m, 5.0);
        assert_close!(sd, 2.0);
    }

    #[test]
    fn mse_with_negatives() {
        // diffs = [-2, -4], squared = [4, 16], mean = 10
        let y = vec![-1.0, -2.0];
        let y_fit = vec![1.0, 2.0];
        let mse = mean_squared_error::<f64>(y.into_iter(), y_fit.into_iter());
        assert_eq!(mse, 10.0);
    }

    #[test]
    fn rmse_perfect_fit() {
        let y = vec![1.0, 2.0, 3.0];
        let rms = root_mean_squared_error::<f64>(y.clone().into_iter(), y.into_iter());
        assert_eq!(rms, 0.0);
    }

    #[test]
    fn r_squared_bounds() {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        assert_close!(r_squared(y.iter().copied(), y.iter().copied()), 1.0);

        let flat = vec![2.5; 4];
        assert_close!(r_squared(y.iter().copied(), flat.into_iter()), 0.0);
    }

    #[test]
    fn r_squared_constant_signal() {
        let y = vec![3.0; 5];
        assert_eq!(r_squared(y.iter().copied(), y.iter().copied()), 1.0);
        assert_eq!(r_squared(y.iter().copied(), vec![4.0; 5].into_iter()), 0.0);
    }
}
