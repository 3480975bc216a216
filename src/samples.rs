//! Sample sets: one shared position axis and one or more signals sampled along it.
//!
//! A [`SampleSet`] borrows its data. Construction validates everything that can be checked
//! without linear algebra: emptiness, lengths, and finiteness.
//!
//! ```rust
//! use ndarray::array;
//! use polybatch::{SampleSet, SignalAxis};
//!
//! let positions = [0.0, 1.0, 2.0, 3.0];
//! let values = array![[1.0, 1.0], [2.0, 8.0], [3.0, 27.0], [4.0, 64.0]];
//!
//! let samples = SampleSet::table(&positions, values.view(), SignalAxis::Columns).unwrap();
//! assert_eq!(samples.len(), 4);
//! assert_eq!(samples.signal_count(), 2);
//! assert_eq!(samples.signal(1).unwrap()[2], 27.0);
//! ```
use nalgebra::DMatrix;
use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{
    error::{Error, Result},
    value::{ensure_finite, min_max, Value},
};

/// Which axis of a value table holds the signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SignalAxis {
    /// Each row is a signal. The table has shape `M × N`.
    Rows,

    /// Each column is a signal. The table has shape `N × M`.
    #[default]
    Columns,
}

impl SignalAxis {
    fn signal_axis(self) -> Axis {
        match self {
            Self::Rows => Axis(0),
            Self::Columns => Axis(1),
        }
    }

    fn position_axis(self) -> Axis {
        match self {
            Self::Rows => Axis(1),
            Self::Columns => Axis(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Values<'a, T: Value> {
    Single(&'a [T]),
    Table(ArrayView2<'a, T>, SignalAxis),
}

/// Sample positions and the signal values measured at them.
///
/// All signals share the same `N` positions. Positions need not be sorted or distinct,
/// but repeated positions reduce the rank of the design matrix.
#[derive(Debug, Clone, Copy)]
pub struct SampleSet<'a, T: Value = f64> {
    positions: &'a [T],
    values: Values<'a, T>,
}

impl<'a, T: Value> SampleSet<'a, T> {
    /// Creates a sample set holding a single signal.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `positions` is empty
    /// - [`Error::LengthMismatch`] if `values` does not have one entry per position
    /// - [`Error::NonFinite`] if any position or value is NaN or infinite
    pub fn single(positions: &'a [T], values: &'a [T]) -> Result<Self> {
        Self::check_positions(positions)?;
        if values.len() != positions.len() {
            return Err(Error::LengthMismatch {
                expected: positions.len(),
                found: values.len(),
            });
        }
        ensure_finite("values", values)?;

        Ok(Self {
            positions,
            values: Values::Single(values),
        })
    }

    /// Creates a sample set from a table of signals.
    ///
    /// `axis` says whether signals run along the rows or the columns of `values`.
    /// The other axis must have one entry per position.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `positions` is empty or the table holds no signals
    /// - [`Error::LengthMismatch`] if the position axis of `values` has the wrong length
    /// - [`Error::NonFinite`] if any position or value is NaN or infinite.
    ///   For values, the index is the flat row-major index into the table.
    pub fn table(positions: &'a [T], values: ArrayView2<'a, T>, axis: SignalAxis) -> Result<Self> {
        Self::check_positions(positions)?;

        let found = values.len_of(axis.position_axis());
        if found != positions.len() {
            return Err(Error::LengthMismatch {
                expected: positions.len(),
                found,
            });
        }
        if values.len_of(axis.signal_axis()) == 0 {
            return Err(Error::NoData);
        }
        ensure_finite("values", values.iter())?;

        Ok(Self {
            positions,
            values: Values::Table(values, axis),
        })
    }

    fn check_positions(positions: &[T]) -> Result<()> {
        if positions.is_empty() {
            return Err(Error::NoData);
        }
        ensure_finite("positions", positions)
    }

    /// The shared sample positions.
    #[must_use]
    pub fn positions(&self) -> &'a [T] {
        self.positions
    }

    /// Number of sample positions, `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false; a sample set cannot be constructed without positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of signals, `M`.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        match &self.values {
            Values::Single(_) => 1,
            Values::Table(table, axis) => table.len_of(axis.signal_axis()),
        }
    }

    /// True if this set was built from a single 1-D signal.
    #[must_use]
    pub fn is_single(&self) -> bool {
        matches!(self.values, Values::Single(_))
    }

    /// Returns the values of signal `index`, one per position.
    ///
    /// # Errors
    /// Returns [`Error::NoSuchSignal`] if `index` is out of range.
    pub fn signal(&self, index: usize) -> Result<ArrayView1<'a, T>> {
        let signals = self.signal_count();
        if index >= signals {
            return Err(Error::NoSuchSignal { index, signals });
        }

        Ok(match self.values {
            Values::Single(values) => ArrayView1::from(values),
            Values::Table(table, axis) => table.index_axis_move(axis.signal_axis(), index),
        })
    }

    /// Iterates over every signal in order.
    pub fn signals(&self) -> impl Iterator<Item = ArrayView1<'a, T>> + '_ {
        (0..self.signal_count()).filter_map(move |i| self.signal(i).ok())
    }

    /// The smallest and largest sample position.
    #[must_use]
    pub fn position_range(&self) -> (T, T) {
        // Positions are never empty once constructed
        min_max(self.positions.iter().copied()).unwrap_or((T::zero(), T::zero()))
    }

    /// Signal `index` as an `N × 1` matrix, shifted down by `offset`.
    pub(crate) fn signal_column(&self, index: usize, offset: T) -> Result<DMatrix<T>> {
        let signal = self.signal(index)?;
        Ok(DMatrix::from_iterator(
            signal.len(),
            1,
            signal.iter().map(|&v| v - offset),
        ))
    }

    /// Every signal as one column of an `N × M` matrix, each shifted down by its `offsets` entry.
    pub(crate) fn value_matrix(&self, offsets: &[T]) -> Result<DMatrix<T>> {
        let mut matrix = DMatrix::zeros(self.len(), self.signal_count());
        for (j, mut column) in matrix.column_iter_mut().enumerate() {
            let offset = offsets.get(j).copied().unwrap_or_else(T::zero);
            for (dst, &src) in column.iter_mut().zip(self.signal(j)?.iter()) {
                *dst = src - offset;
            }
        }
        Ok(matrix)
    }
}
