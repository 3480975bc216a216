//! The shared polynomial design matrix.
//!
//! A [`Basis`] is the `N × (D+1)` Vandermonde matrix of the sample positions, with columns
//! ordered from the highest power down to the constant:
//!
//! ```text
//! [ x₀ᴰ  x₀ᴰ⁻¹  …  x₀  1 ]
//! [ x₁ᴰ  x₁ᴰ⁻¹  …  x₁  1 ]
//! [  ⋮                  ]
//! ```
//!
//! It is built once for the largest degree in a batch. A fit of lower degree `d` uses the
//! trailing `d + 1` columns, see [`Basis::slice`].
//!
//! ```rust
//! use polybatch::basis::Basis;
//!
//! let basis = Basis::new(&[1.0, 2.0, 3.0], 2).unwrap();
//! assert_eq!(basis.matrix().row(1).iter().copied().collect::<Vec<_>>(), vec![4.0, 2.0, 1.0]);
//!
//! let linear = basis.slice(1).unwrap();
//! assert_eq!(linear.ncols(), 2);
//! assert_eq!(linear[(2, 0)], 3.0);
//! ```
use nalgebra::{DMatrix, DMatrixView, MatrixViewMut};

use crate::{
    error::{Error, Result},
    value::{ensure_finite, Value},
};

/// Builds the design matrix for `positions` at `degree`.
///
/// Shorthand for [`Basis::new`] that returns the bare matrix.
///
/// # Errors
/// - [`Error::NoData`] if `positions` is empty
/// - [`Error::NonFinite`] if any position is NaN or infinite
pub fn build_basis<T: Value>(positions: &[T], degree: usize) -> Result<DMatrix<T>> {
    Basis::new(positions, degree).map(Basis::into_matrix)
}

/// Fills one row of the design matrix with the descending powers of `x`.
///
/// The last column is 1, and each column to the left is `x` times its right neighbour.
pub(crate) fn fill_matrix_row<T: Value, R, C, RS, CS>(x: T, mut row: MatrixViewMut<T, R, C, RS, CS>)
where
    R: nalgebra::Dim,
    C: nalgebra::Dim,
    RS: nalgebra::Dim,
    CS: nalgebra::Dim,
{
    let k = row.ncols();
    if k == 0 {
        return;
    }

    row[k - 1] = T::one();
    for j in (0..k - 1).rev() {
        row[j] = row[j + 1] * x;
    }
}

/// Vandermonde design matrix over a set of sample positions.
///
/// Deterministic: the same positions and degree always produce the same matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Basis<T: Value = f64> {
    degree: usize,
    matrix: DMatrix<T>,
}

impl<T: Value> Basis<T> {
    /// Builds the design matrix for `positions` at `degree`.
    ///
    /// A degree-0 basis is a single column of ones.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `positions` is empty
    /// - [`Error::NonFinite`] if any position is NaN or infinite
    pub fn new(positions: &[T], degree: usize) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::NoData);
        }
        ensure_finite("positions", positions)?;

        Ok(Self::from_positions(positions.iter().copied(), positions.len(), degree))
    }

    /// Builds the matrix without validating the positions.
    pub(crate) fn from_positions(
        positions: impl Iterator<Item = T>,
        rows: usize,
        degree: usize,
    ) -> Self {
        let mut matrix = DMatrix::zeros(rows, degree + 1);
        for (row, x) in matrix.row_iter_mut().zip(positions) {
            fill_matrix_row(x, row);
        }

        Self { degree, matrix }
    }

    /// The degree the basis was built for, `D`.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of columns, `D + 1`.
    #[must_use]
    pub fn k(&self) -> usize {
        self.degree + 1
    }

    /// Number of rows, one per sample position.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// The full `N × (D+1)` matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<T> {
        &self.matrix
    }

    /// Consumes the basis, returning the matrix.
    #[must_use]
    pub fn into_matrix(self) -> DMatrix<T> {
        self.matrix
    }

    /// The sub-basis for a polynomial of `degree`: the trailing `degree + 1` columns.
    ///
    /// These are the powers `degree` down to 0, in the same order as the fitted coefficients.
    ///
    /// # Errors
    /// Returns [`Error::BasisTooNarrow`] if `degree` exceeds the degree the basis was built for.
    pub fn slice(&self, degree: usize) -> Result<DMatrixView<'_, T>> {
        if degree > self.degree {
            return Err(Error::BasisTooNarrow {
                requested: degree,
                available: self.degree,
            });
        }

        let k = degree + 1;
        Ok(self.matrix.columns(self.k() - k, k))
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_close;

    use super::*;

    #[test]
    fn test_column_order() {
        let basis = Basis::new(&[2.0, -1.0], 3).unwrap();
        let m = basis.matrix();
        assert_eq!(m.shape(), (2, 4));

        // Highest power first, constant last
        assert_close!(m[(0, 0)], 8.0);
        assert_close!(m[(0, 1)], 4.0);
        assert_close!(m[(0, 2)], 2.0);
        assert_close!(m[(0, 3)], 1.0);
        assert_close!(m[(1, 0)], -1.0);
        assert_close!(m[(1, 3)], 1.0);
    }

    #[test]
    fn test_degree_zero() {
        let basis = Basis::new(&[5.0, 6.0, 7.0], 0).unwrap();
        assert_eq!(basis.k(), 1);
        assert!(basis.matrix().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_slice_is_trailing() {
        let positions = [0.5, 1.5, 2.5, 3.5];
        let full = Basis::new(&positions, 4).unwrap();
        let narrow = Basis::new(&positions, 2).unwrap();

        let slice = full.slice(2).unwrap();
        assert_eq!(slice.shape(), narrow.matrix().shape());
        assert_eq!(slice.clone_owned(), *narrow.matrix());

        assert!(matches!(
            full.slice(5),
            Err(Error::BasisTooNarrow {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn test_deterministic() {
        let positions = [0.1, 0.7, 1.9, 3.3, 4.0];
        let a = build_basis(&positions, 3).unwrap();
        let b = build_basis(&positions, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_positions() {
        let empty: [f64; 0] = [];
        assert!(matches!(Basis::new(&empty, 1), Err(Error::NoData)));
        assert!(matches!(
            Basis::new(&[1.0, f64::NEG_INFINITY], 1),
            Err(Error::NonFinite { .. })
        ));
    }
}
