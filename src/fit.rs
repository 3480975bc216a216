use std::ops::RangeInclusive;

use nalgebra::{DMatrix, SVD};
use ndarray::ArrayView2;

use crate::{
    basis::Basis,
    degree::DegreeSpec,
    display,
    error::{Error, Result},
    eval::derivative,
    samples::{SampleSet, SignalAxis},
    statistics,
    value::Value,
};

/// How the signals of a batch are solved.
///
/// Chosen automatically from the signal count and the degrees, or forced with [`FitOptions::with_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FitMode {
    /// One signal, one least-squares solve.
    SingleSeries,

    /// Every signal has the same degree.
    ///
    /// The whole batch is solved at once: one decomposition of the design matrix,
    /// with one right-hand side per signal. A rank deficiency fails the whole batch.
    SharedDegreeBatch,

    /// Signals are solved one at a time, each against the trailing slice of the
    /// shared basis that matches its own degree.
    ///
    /// A failure names the signal that could not be fitted.
    HeterogeneousDegreeBatch,
}

impl FitMode {
    /// Picks the mode for a batch of `signal_count` signals fitted at `degrees`.
    #[must_use]
    pub fn detect(signal_count: usize, degrees: &DegreeSpec) -> Self {
        if signal_count == 1 {
            Self::SingleSeries
        } else if degrees.is_uniform() {
            Self::SharedDegreeBatch
        } else {
            Self::HeterogeneousDegreeBatch
        }
    }

    /// Checks that this mode can solve `signal_count` signals at `degrees`.
    ///
    /// Per-signal solves work for any batch; forcing [`FitMode::HeterogeneousDegreeBatch`] is how a
    /// caller falls back from a failed shared-degree solve.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedMode`] if the mode does not apply.
    pub fn check(self, signal_count: usize, degrees: &DegreeSpec) -> Result<()> {
        match self {
            Self::SingleSeries if signal_count != 1 => Err(Error::UnsupportedMode {
                mode: self,
                reason: "the batch holds more than one signal",
            }),
            Self::SharedDegreeBatch if !degrees.is_uniform() => Err(Error::UnsupportedMode {
                mode: self,
                reason: "the signals have different degrees",
            }),
            _ => Ok(()),
        }
    }
}

/// Options controlling how a batch is fitted.
///
/// ```rust
/// use polybatch::{FitMode, FitOptions, SignalAxis};
///
/// let options = FitOptions::new()
///     .with_centering(true)
///     .with_mode(FitMode::HeterogeneousDegreeBatch)
///     .with_signal_axis(SignalAxis::Rows);
/// assert!(options.centered());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FitOptions {
    centered: bool,
    mode: Option<FitMode>,
    signal_axis: SignalAxis,
}

impl FitOptions {
    /// Default options: uncentered, automatic mode, signals in columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtract the mean position and each signal's mean value before fitting.
    ///
    /// Improves conditioning when positions are large, such as epoch times.
    #[must_use]
    pub fn with_centering(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    /// Force a fit mode instead of detecting one.
    #[must_use]
    pub fn with_mode(mut self, mode: FitMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Which axis of a value table holds the signals. Used by [`fit_table`].
    #[must_use]
    pub fn with_signal_axis(mut self, axis: SignalAxis) -> Self {
        self.signal_axis = axis;
        self
    }

    /// True if fits are centered.
    #[must_use]
    pub fn centered(&self) -> bool {
        self.centered
    }

    /// The forced mode, if any.
    #[must_use]
    pub fn mode(&self) -> Option<FitMode> {
        self.mode
    }

    /// The signal axis for table input.
    #[must_use]
    pub fn signal_axis(&self) -> SignalAxis {
        self.signal_axis
    }
}

/// The shifts applied to a centered fit.
///
/// The polynomials of a centered fit are in `x - position_mean`, and model
/// `y - value_means[i]` for signal `i`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Centering<T: Value = f64> {
    /// Mean of the sample positions
    pub position_mean: T,

    /// Mean of each signal's values
    pub value_means: Vec<T>,
}

impl<T: Value> Centering<T> {
    fn of(samples: &SampleSet<'_, T>) -> Self {
        Self {
            position_mean: statistics::mean(samples.positions().iter().copied()),
            value_means: samples
                .signals()
                .map(|s| statistics::mean(s.iter().copied()))
                .collect(),
        }
    }
}

/// Fits one signal with a polynomial of `degree`.
///
/// # Errors
/// See [`fit_with`].
///
/// # Example
/// ```
/// # use polybatch::{assert_close, fit_series};
/// let fit = fit_series(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 5.0, 7.0, 9.0], 1).unwrap();
/// let c = fit.signal_coefficients(0).unwrap();
/// assert_close!(c[0], 2.0, tol = 1e-10);
/// assert_close!(c[1], 1.0, tol = 1e-10);
/// ```
pub fn fit_series<T: Value>(positions: &[T], values: &[T], degree: usize) -> Result<FitResult<T>> {
    let samples = SampleSet::single(positions, values)?;
    fit(&samples, degree)
}

/// Fits a table of signals, oriented by [`FitOptions::signal_axis`].
///
/// # Errors
/// See [`SampleSet::table`] and [`fit_with`].
pub fn fit_table<'a, T: Value>(
    positions: &'a [T],
    values: ArrayView2<'a, T>,
    degrees: impl Into<DegreeSpec>,
    options: &FitOptions,
) -> Result<FitResult<T>> {
    let samples = SampleSet::table(positions, values, options.signal_axis())?;
    fit_with(&samples, degrees, options)
}

/// Fits every signal of `samples` with default options.
///
/// # Errors
/// See [`fit_with`].
pub fn fit<T: Value>(samples: &SampleSet<'_, T>, degrees: impl Into<DegreeSpec>) -> Result<FitResult<T>> {
    fit_with(samples, degrees, &FitOptions::default())
}

/// Fits every signal of `samples` with its own polynomial.
///
/// # How it works
/// - Builds one design matrix for the largest degree in `degrees`.
/// - Each signal of degree `d` is solved against the trailing `d + 1` columns of that matrix.
/// - Least squares is solved through the SVD of the design slice, with every column scaled to unit norm.
///   Singular values below `machine_epsilon * max(rows, cols) * sigma_max` do not count towards the rank.
/// - Coefficients are stored highest power first, signal after signal.
///
/// # Errors
/// Validation errors are raised before any linear algebra:
/// - [`Error::DegreeCountMismatch`] if a per-signal degree list has the wrong length
/// - [`Error::UnsupportedMode`] if a forced mode does not apply
///
/// Fit errors carry the degree, and the signal where there is one:
/// - [`Error::DegreeTooHigh`] if a degree is not less than the number of samples, checked before solving
/// - [`Error::RankDeficient`] if a signal's design slice is rank deficient
/// - [`Error::BatchRankDeficient`] if the shared design matrix of a shared-degree batch is rank deficient
/// - [`Error::Algebra`] if the solver fails or produces non-finite coefficients
///
/// No partial result is returned.
///
/// # Example
/// ```
/// # use ndarray::array;
/// # use polybatch::{fit_with, FitOptions, SampleSet, SignalAxis};
/// let positions = [0.0, 1.0, 2.0, 3.0];
/// let values = array![[1.0, 1.0], [2.0, 8.0], [3.0, 27.0], [4.0, 64.0]];
/// let samples = SampleSet::table(&positions, values.view(), SignalAxis::Columns).unwrap();
///
/// let fit = fit_with(&samples, [1, 3], &FitOptions::default()).unwrap();
/// assert_eq!(fit.coefficient_counts(), &[2, 4]);
/// ```
pub fn fit_with<T: Value>(
    samples: &SampleSet<'_, T>,
    degrees: impl Into<DegreeSpec>,
    options: &FitOptions,
) -> Result<FitResult<T>> {
    let degrees = degrees.into();
    let signal_count = samples.signal_count();
    let per_signal = degrees.resolve(signal_count)?;

    let n = samples.len();
    if let Some((signal, &degree)) = per_signal.iter().enumerate().find(|&(_, &d)| d >= n) {
        return Err(Error::DegreeTooHigh {
            signal,
            degree,
            samples: n,
        });
    }

    let mode = match options.mode() {
        Some(mode) => {
            mode.check(signal_count, &degrees)?;
            mode
        }
        None => FitMode::detect(signal_count, &degrees),
    };

    let centering = options.centered().then(|| Centering::of(samples));
    let (position_shift, value_shifts) = match &centering {
        Some(c) => (c.position_mean, c.value_means.clone()),
        None => (T::zero(), vec![T::zero(); signal_count]),
    };

    let positions = samples.positions().iter().map(|&x| x - position_shift);
    let basis = Basis::from_positions(positions, n, degrees.max());

    let solutions = match mode {
        FitMode::SharedDegreeBatch => solve_shared(&basis, samples, &value_shifts)?,
        FitMode::SingleSeries | FitMode::HeterogeneousDegreeBatch => {
            solve_each(&basis, samples, &per_signal, &value_shifts)?
        }
    };

    let coefficient_counts: Vec<usize> = per_signal.iter().map(|d| d + 1).collect();
    let mut coefficients = Vec::with_capacity(coefficient_counts.iter().sum());
    let mut residual_rms = Vec::with_capacity(signal_count);
    for solution in solutions {
        coefficients.extend(solution.coefficients);
        residual_rms.push(solution.residual_rms);
    }

    let result = FitResult {
        mode,
        signal_count,
        degrees,
        coefficient_counts,
        coefficients,
        position_range: samples.position_range(),
        centering,
        residual_rms,
    };
    result.validate()?;
    Ok(result)
}

/// Coefficients and residual RMS for one signal.
struct SignalSolution<T: Value> {
    coefficients: Vec<T>,
    residual_rms: T,
}

enum SolveFailure {
    RankDeficient(usize),
    Algebra(&'static str),
}

/// Solves `design * X = rhs` in the least-squares sense using the SVD of `design`.
///
/// Every column of `design` is scaled to unit 2-norm before the decomposition, and the rows
/// of the solution are scaled back afterwards. The rank is judged on the scaled matrix, so
/// powers of large positions do not swamp the lower-order columns.
///
/// Fails if the numerical rank of the scaled design is below its column count.
fn solve_matrix<T: Value>(
    mut design: DMatrix<T>,
    rhs: &DMatrix<T>,
) -> std::result::Result<DMatrix<T>, SolveFailure> {
    let (rows, cols) = design.shape();

    // Zero columns keep a unit scale and show up as rank deficiency
    let scales: Vec<T> = design
        .column_iter()
        .map(|column| column.norm())
        .map(|norm| if norm > T::zero() { norm } else { T::one() })
        .collect();
    for (mut column, &scale) in design.column_iter_mut().zip(&scales) {
        column.unscale_mut(scale);
    }

    // Calculate the singular value decomposition of the matrix
    let decomp = SVD::new_unordered(design, true, true);

    // ~= machine_epsilon * max(size) * max_singular
    let machine_epsilon = T::epsilon();
    let sigma_max = decomp.singular_values.max();
    let epsilon = machine_epsilon * T::from_positive_int(rows.max(cols)) * sigma_max;

    let rank = decomp
        .singular_values
        .iter()
        .filter(|&&s| s > epsilon)
        .count();
    if rank < cols {
        return Err(SolveFailure::RankDeficient(rank));
    }

    let mut solution = decomp.solve(rhs, epsilon).map_err(SolveFailure::Algebra)?;
    for (mut row, &scale) in solution.row_iter_mut().zip(&scales) {
        row.unscale_mut(scale);
    }
    if solution.iter().any(|c| !c.is_finite_value()) {
        return Err(SolveFailure::Algebra("non-finite coefficients"));
    }

    Ok(solution)
}

/// Residual RMS of column `j` of `fitted` against column `j` of `observed`.
fn column_rms<T: Value>(observed: &DMatrix<T>, fitted: &DMatrix<T>, j: usize) -> T {
    statistics::root_mean_squared_error(
        observed.column(j).iter().copied(),
        fitted.column(j).iter().copied(),
    )
}

fn solve_signal<T: Value>(
    basis: &Basis<T>,
    samples: &SampleSet<'_, T>,
    signal: usize,
    degree: usize,
    shift: T,
) -> Result<SignalSolution<T>> {
    let design = basis.slice(degree)?.clone_owned();
    let rhs = samples.signal_column(signal, shift)?;

    let solution = solve_matrix(design.clone(), &rhs).map_err(|failure| match failure {
        SolveFailure::RankDeficient(rank) => Error::RankDeficient {
            signal,
            degree,
            rank,
            k: degree + 1,
        },
        SolveFailure::Algebra(reason) => Error::Algebra {
            signal,
            degree,
            reason,
        },
    })?;

    let fitted = design * &solution;
    Ok(SignalSolution {
        coefficients: solution.iter().copied().collect(),
        residual_rms: column_rms(&rhs, &fitted, 0),
    })
}

/// Solves each signal independently against its own slice of the basis.
///
/// With the `parallel` feature the solves run on the rayon pool. The reported error
/// is always that of the lowest failing signal index.
fn solve_each<T: Value>(
    basis: &Basis<T>,
    samples: &SampleSet<'_, T>,
    degrees: &[usize],
    shifts: &[T],
) -> Result<Vec<SignalSolution<T>>> {
    #[cfg(not(feature = "parallel"))]
    {
        return degrees
            .iter()
            .enumerate()
            .map(|(signal, &degree)| solve_signal(basis, samples, signal, degree, shifts[signal]))
            .collect();
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let solutions: Vec<Result<SignalSolution<T>>> = degrees
            .par_iter()
            .enumerate()
            .map(|(signal, &degree)| solve_signal(basis, samples, signal, degree, shifts[signal]))
            .collect();
        solutions.into_iter().collect()
    }
}

/// Solves every signal at once against the full basis.
fn solve_shared<T: Value>(
    basis: &Basis<T>,
    samples: &SampleSet<'_, T>,
    shifts: &[T],
) -> Result<Vec<SignalSolution<T>>> {
    let degree = basis.degree();
    let signals = samples.signal_count();
    let design = basis.matrix().clone();
    let rhs = samples.value_matrix(shifts)?;

    let solution = solve_matrix(design.clone(), &rhs).map_err(|failure| match failure {
        SolveFailure::RankDeficient(rank) => Error::BatchRankDeficient {
            signals,
            degree,
            rank,
            k: degree + 1,
        },
        SolveFailure::Algebra(reason) => Error::Algebra {
            signal: 0,
            degree,
            reason,
        },
    })?;

    let fitted = design * &solution;
    Ok((0..signals)
        .map(|j| SignalSolution {
            coefficients: solution.column(j).iter().copied().collect(),
            residual_rms: column_rms(&rhs, &fitted, j),
        })
        .collect())
}

/// The fitted polynomials of a batch of signals.
///
/// # Layout
/// Coefficients are packed signal after signal. Signal `i` has `coefficient_counts[i] = degree_i + 1`
/// coefficients, ordered from the highest power down to the constant term, starting at
/// `offsets()[i]`, the sum of the counts of the signals before it.
///
/// A `FitResult` is immutable. It is validated on construction and on deserialization;
/// a corrupt layout is rejected with an Invariant error.
///
/// Coefficients survive a JSON round trip bit for bit only if the parser reads floats exactly.
/// With `serde_json`, enable its `float_roundtrip` feature.
///
/// # Example
/// ```
/// # use polybatch::{assert_close, fit_series};
/// let fit = fit_series(&[0.0, 1.0, 2.0], &[1.0, 3.0, 7.0], 2).unwrap();
/// println!("{fit}");
/// let y = fit.evaluate_scalar(1.0).unwrap();
/// assert_close!(y[0], 3.0, tol = 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawFitResult<T>")]
#[serde(bound(
    serialize = "T: serde::Serialize",
    deserialize = "T: serde::Deserialize<'de>"
))]
pub struct FitResult<T: Value = f64> {
    pub(crate) mode: FitMode,
    pub(crate) signal_count: usize,
    pub(crate) degrees: DegreeSpec,
    pub(crate) coefficient_counts: Vec<usize>,
    pub(crate) coefficients: Vec<T>,
    pub(crate) position_range: (T, T),
    pub(crate) centering: Option<Centering<T>>,
    pub(crate) residual_rms: Vec<T>,
}

/// Unchecked mirror of [`FitResult`], validated on conversion.
#[derive(serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct RawFitResult<T: Value> {
    mode: FitMode,
    signal_count: usize,
    degrees: DegreeSpec,
    coefficient_counts: Vec<usize>,
    coefficients: Vec<T>,
    position_range: (T, T),
    centering: Option<Centering<T>>,
    #[serde(default)]
    residual_rms: Vec<T>,
}

impl<T: Value> TryFrom<RawFitResult<T>> for FitResult<T> {
    type Error = Error;

    fn try_from(raw: RawFitResult<T>) -> Result<Self> {
        let result = Self {
            mode: raw.mode,
            signal_count: raw.signal_count,
            degrees: raw.degrees,
            coefficient_counts: raw.coefficient_counts,
            coefficients: raw.coefficients,
            position_range: raw.position_range,
            centering: raw.centering,
            residual_rms: raw.residual_rms,
        };
        result.validate()?;
        Ok(result)
    }
}

impl<T: Value> FitResult<T> {
    /// Rebuilds a fit from persisted packed coefficients.
    ///
    /// `coefficients` must use the packed layout described on [`FitResult`].
    /// The residual RMS of a rebuilt fit is unknown.
    ///
    /// # Errors
    /// - [`Error::DegreeCountMismatch`] if a per-signal degree list does not match `signal_count`
    /// - [`Error::CoefficientCountMismatch`] if `coefficients` does not hold exactly the required number of values
    /// - [`Error::InconsistentLayout`] for any other inconsistency
    /// - [`Error::NonFinite`] if a coefficient or bound is NaN or infinite
    ///
    /// # Example
    /// ```
    /// # use polybatch::FitResult;
    /// let fit = FitResult::from_parts(2, [1, 0], vec![2.0, 1.0, 5.0], 0.0..=4.0, None).unwrap();
    /// assert_eq!(fit.evaluate_scalar(3.0).unwrap(), vec![7.0, 5.0]);
    /// ```
    pub fn from_parts(
        signal_count: usize,
        degrees: impl Into<DegreeSpec>,
        coefficients: Vec<T>,
        position_range: RangeInclusive<T>,
        centering: Option<Centering<T>>,
    ) -> Result<Self> {
        let degrees = degrees.into();
        let coefficient_counts = degrees
            .resolve(signal_count)?
            .into_iter()
            .map(|d| d + 1)
            .collect();
        crate::value::ensure_finite("coefficients", &coefficients)?;

        let (start, end) = position_range.into_inner();
        crate::value::ensure_finite("position range", &[start, end])?;

        let result = Self {
            mode: FitMode::detect(signal_count, &degrees),
            signal_count,
            degrees,
            coefficient_counts,
            coefficients,
            position_range: (start, end),
            centering,
            residual_rms: Vec::new(),
        };
        result.validate()?;
        Ok(result)
    }

    /// Checks the internal consistency of the packed layout.
    ///
    /// Called on construction, deserialization, and before every evaluation.
    ///
    /// # Errors
    /// - [`Error::CoefficientCountMismatch`] if the stored coefficients do not add up to the counts
    /// - [`Error::InconsistentLayout`] for any other inconsistency
    pub fn validate(&self) -> Result<()> {
        if self.signal_count == 0 {
            return Err(Error::InconsistentLayout("a fit must hold at least one signal"));
        }

        let degrees = self.degrees.resolve(self.signal_count).map_err(|_| {
            Error::InconsistentLayout("the degree list does not match the signal count")
        })?;

        if self.coefficient_counts.len() != self.signal_count {
            return Err(Error::InconsistentLayout(
                "there must be one coefficient count per signal",
            ));
        }

        if self
            .coefficient_counts
            .iter()
            .zip(&degrees)
            .any(|(&k, &d)| k != d + 1)
        {
            return Err(Error::InconsistentLayout(
                "a coefficient count does not match its degree",
            ));
        }

        let expected: usize = self.coefficient_counts.iter().sum();
        if expected != self.coefficients.len() {
            return Err(Error::CoefficientCountMismatch {
                expected,
                stored: self.coefficients.len(),
            });
        }

        if !self.residual_rms.is_empty() && self.residual_rms.len() != self.signal_count {
            return Err(Error::InconsistentLayout(
                "there must be one residual RMS per signal",
            ));
        }

        if let Some(centering) = &self.centering {
            if centering.value_means.len() != self.signal_count {
                return Err(Error::InconsistentLayout(
                    "there must be one centering mean per signal",
                ));
            }
        }

        self.mode
            .check(self.signal_count, &self.degrees)
            .map_err(|_| Error::InconsistentLayout("the fit mode does not match the layout"))?;

        let (start, end) = self.position_range;
        if start > end {
            return Err(Error::InconsistentLayout("the position range is reversed"));
        }

        Ok(())
    }

    /// How the batch was solved.
    #[must_use]
    pub fn mode(&self) -> FitMode {
        self.mode
    }

    /// Number of signals, `M`.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.signal_count
    }

    /// The degrees the signals were fitted at.
    #[must_use]
    pub fn degrees(&self) -> &DegreeSpec {
        &self.degrees
    }

    /// The degree of signal `signal`.
    ///
    /// # Errors
    /// Returns [`Error::NoSuchSignal`] if `signal` is out of range.
    pub fn degree(&self, signal: usize) -> Result<usize> {
        self.coefficient_counts
            .get(signal)
            .map(|k| k.saturating_sub(1))
            .ok_or(Error::NoSuchSignal {
                index: signal,
                signals: self.signal_count,
            })
    }

    /// Number of coefficients per signal, `degree + 1`.
    #[must_use]
    pub fn coefficient_counts(&self) -> &[usize] {
        &self.coefficient_counts
    }

    /// The packed coefficients of every signal, highest power first.
    ///
    /// See [`FitResult::offsets`] to address a single signal.
    #[must_use]
    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    /// The start offset of each signal in the packed coefficients.
    ///
    /// Offset `i` is the sum of the coefficient counts of signals `0..i`.
    #[must_use]
    pub fn offsets(&self) -> Vec<usize> {
        self.coefficient_counts
            .iter()
            .scan(0, |acc, &k| {
                let start = *acc;
                *acc += k;
                Some(start)
            })
            .collect()
    }

    /// The coefficients of signal `signal`, highest power first.
    ///
    /// # Errors
    /// - [`Error::NoSuchSignal`] if `signal` is out of range
    /// - [`Error::CoefficientCountMismatch`] if the packed store is too short
    pub fn signal_coefficients(&self, signal: usize) -> Result<&[T]> {
        let k = *self
            .coefficient_counts
            .get(signal)
            .ok_or(Error::NoSuchSignal {
                index: signal,
                signals: self.signal_count,
            })?;
        let start: usize = self.coefficient_counts[..signal].iter().sum();

        self.coefficients
            .get(start..start + k)
            .ok_or(Error::CoefficientCountMismatch {
                expected: self.coefficient_counts.iter().sum(),
                stored: self.coefficients.len(),
            })
    }

    /// The coefficients of the first derivative of signal `signal`, highest power first.
    ///
    /// A constant has the derivative `[0]`.
    ///
    /// # Errors
    /// See [`FitResult::signal_coefficients`].
    pub fn derivative_coefficients(&self, signal: usize) -> Result<Vec<T>> {
        self.signal_coefficients(signal).map(derivative)
    }

    /// The range of sample positions the fit was built from.
    ///
    /// See [`FitResult::evaluate_within`].
    #[must_use]
    pub fn position_range(&self) -> RangeInclusive<T> {
        self.position_range.0..=self.position_range.1
    }

    /// The shifts applied to a centered fit, or `None` if it is not centered.
    #[must_use]
    pub fn centering(&self) -> Option<&Centering<T>> {
        self.centering.as_ref()
    }

    /// RMS of each signal's residuals at the sample positions.
    ///
    /// `None` for a fit rebuilt with [`FitResult::from_parts`].
    #[must_use]
    pub fn residual_rms(&self) -> Option<&[T]> {
        if self.residual_rms.is_empty() {
            None
        } else {
            Some(&self.residual_rms)
        }
    }

    /// R² of each signal against a set of samples.
    ///
    /// # Errors
    /// - [`Error::SignalCountMismatch`] if `samples` holds a different number of signals
    /// - [`Error::CoefficientCountMismatch`] or [`Error::InconsistentLayout`] if the fit is corrupt
    pub fn r_squared(&self, samples: &SampleSet<'_, T>) -> Result<Vec<T>> {
        if samples.signal_count() != self.signal_count {
            return Err(Error::SignalCountMismatch {
                expected: self.signal_count,
                found: samples.signal_count(),
            });
        }

        let shift = self.position_shift();
        self.polynomials(false)?
            .iter()
            .enumerate()
            .map(|(i, polynomial)| {
                let observed = samples.signal(i)?;
                let fitted = samples.positions().iter().map(|&x| polynomial.at(x - shift));
                Ok(statistics::r_squared(observed.iter().copied(), fitted))
            })
            .collect()
    }

    /// The equation of signal `signal`, such as `y₀(x) = 2.00x + 1.00`.
    ///
    /// Centered fits are written in `(x - mean)`, with the value mean folded into the constant.
    ///
    /// # Errors
    /// See [`FitResult::signal_coefficients`].
    pub fn equation(&self, signal: usize) -> Result<String> {
        let mut coefficients = self.signal_coefficients(signal)?.to_vec();
        let label = format!("y{}", display::unicode::subscript(&signal.to_string()));

        let variable = match &self.centering {
            Some(c) => {
                if let (Some(constant), Some(&mean)) =
                    (coefficients.last_mut(), c.value_means.get(signal))
                {
                    *constant += mean;
                }
                display::centered_variable(c.position_mean)
            }
            None => "x".to_string(),
        };

        let mut output = String::new();
        display::format_polynomial(&mut output, &label, &variable, &coefficients)
            .map_err(|_| Error::InconsistentLayout("the equation could not be formatted"))?;
        Ok(output)
    }
}

impl<T: Value> std::fmt::Display for FitResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for signal in 0..self.signal_count {
            if signal > 0 {
                writeln!(f)?;
            }
            let equation = self.equation(signal).map_err(|_| std::fmt::Error)?;
            write!(f, "{equation}")?;
        }
        Ok(())
    }
}
