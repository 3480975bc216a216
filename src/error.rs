//! Error types for batched polynomial fitting
//!
//! Every failure belongs to one of three [`ErrorKind`]s:
//! - **Validation**: malformed input, caught before any linear algebra runs.
//! - **Fit**: the least-squares solve failed, or the system was under-determined or rank deficient
//!   for a given signal and degree. The caller may retry with a lower degree.
//! - **Invariant**: a [`crate::FitResult`] failed its internal consistency checks. Always fatal.
//!
//! Nothing in this crate retries, logs, or swallows these errors; they are returned to the caller.

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed inputs, reported before any numerical work begins.
    Validation,

    /// The least-squares system for a signal/degree combination is under-determined,
    /// rank deficient, or could not be solved.
    ///
    /// [`Error::DegreeTooHigh`] belongs here: it is caught before solving, but retrying
    /// with a lower degree recovers from it like any other rank deficiency.
    Fit,

    /// A fit result is internally inconsistent.
    Invariant,
}

/// Errors that can occur while fitting or evaluating polynomial batches.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// There are no sample positions to fit against.
    #[error("No data available for fitting")]
    NoData,

    /// There are no query positions to evaluate.
    #[error("No query positions to evaluate")]
    EmptyQuery,

    /// An input contained NaN or an infinity.
    #[error("Non-finite {input} at index {index}")]
    NonFinite {
        /// Which input held the bad value
        input: &'static str,
        /// Flat index of the first offending element
        index: usize,
    },

    /// A degree was negative.
    #[error("Polynomial degree `{0}` is negative")]
    NegativeDegree(i64),

    /// The number of degrees does not match the number of signals.
    #[error("Expected one degree per signal ({expected}), found {found}")]
    DegreeCountMismatch {
        /// Number of signals
        expected: usize,
        /// Number of degrees supplied
        found: usize,
    },

    /// The values do not have one entry per sample position.
    #[error("Expected {expected} samples along the position axis, found {found}")]
    LengthMismatch {
        /// Number of sample positions
        expected: usize,
        /// Number of values found along the position axis
        found: usize,
    },

    /// The requested degree needs more samples than are available.
    ///
    /// The degree must be less than the number of sample positions.
    #[error("Polynomial degree `{degree}` of signal {signal} is too high for {samples} samples")]
    DegreeTooHigh {
        /// Index of the offending signal
        signal: usize,
        /// Requested degree
        degree: usize,
        /// Number of sample positions
        samples: usize,
    },

    /// A basis slice wider than the basis itself was requested.
    #[error("Degree `{requested}` exceeds the basis degree `{available}`")]
    BasisTooNarrow {
        /// Degree requested from the basis
        requested: usize,
        /// Degree the basis was built for
        available: usize,
    },

    /// The requested fit mode cannot be used with the given samples and degrees.
    #[error("Fit mode {mode:?} cannot be used here: {reason}")]
    UnsupportedMode {
        /// The mode that was requested
        mode: crate::FitMode,
        /// Why it does not apply
        reason: &'static str,
    },

    /// A sample set holds a different number of signals than the fit.
    #[error("Expected {expected} signals, found {found}")]
    SignalCountMismatch {
        /// Number of signals in the fit
        expected: usize,
        /// Number of signals supplied
        found: usize,
    },

    /// A signal index is out of range.
    #[error("Signal {index} does not exist; the fit holds {signals} signals")]
    NoSuchSignal {
        /// Requested index
        index: usize,
        /// Number of signals in the fit
        signals: usize,
    },

    /// A query position lies outside the range of the sample positions.
    ///
    /// Only raised by [`crate::FitResult::evaluate_within`].
    #[error("This fit is only valid within the position range {0}..={1}. Use `evaluate` to extrapolate")]
    DataRange(String, String),

    /// The design slice for a signal is rank deficient.
    ///
    /// Usually, the sample positions are too few or too close together for the degree.
    #[error("Design matrix is rank deficient for signal {signal} at degree {degree} [rank: {rank}, k: {k}]")]
    RankDeficient {
        /// Index of the signal whose solve failed
        signal: usize,
        /// Degree of the attempted fit
        degree: usize,
        /// Numerical rank of the design slice
        rank: usize,
        /// Number of coefficients required
        k: usize,
    },

    /// The shared design matrix of a shared-degree batch is rank deficient.
    ///
    /// The whole batch fails; retry with a lower degree or solve per signal.
    #[error("Shared design matrix is rank deficient for all {signals} signals at degree {degree} [rank: {rank}, k: {k}]")]
    BatchRankDeficient {
        /// Number of signals in the batch
        signals: usize,
        /// Degree of the attempted fit
        degree: usize,
        /// Numerical rank of the design matrix
        rank: usize,
        /// Number of coefficients required
        k: usize,
    },

    /// The linear solver failed.
    #[error("Failed to solve signal {signal} at degree {degree}: {reason}")]
    Algebra {
        /// Index of the first signal of the failed solve
        signal: usize,
        /// Degree of the attempted fit
        degree: usize,
        /// Solver error description
        reason: &'static str,
    },

    /// The packed coefficient store does not match its declared layout.
    #[error("Coefficient store holds {stored} coefficients, but the layout requires {expected}")]
    CoefficientCountMismatch {
        /// Sum of the per-signal coefficient counts
        expected: usize,
        /// Number of coefficients actually stored
        stored: usize,
    },

    /// A fit result's metadata is internally inconsistent.
    #[error("Inconsistent fit result: {0}")]
    InconsistentLayout(&'static str),

    /// A numeric value could not be cast to the target type.
    #[error("Failed to cast value to target type")]
    CastFailed,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RankDeficient { .. }
            | Error::BatchRankDeficient { .. }
            | Error::DegreeTooHigh { .. }
            | Error::Algebra { .. } => ErrorKind::Fit,

            Error::CoefficientCountMismatch { .. } | Error::InconsistentLayout(_) => {
                ErrorKind::Invariant
            }

            Error::NoData
            | Error::EmptyQuery
            | Error::NonFinite { .. }
            | Error::NegativeDegree(_)
            | Error::DegreeCountMismatch { .. }
            | Error::LengthMismatch { .. }
            | Error::BasisTooNarrow { .. }
            | Error::UnsupportedMode { .. }
            | Error::NoSuchSignal { .. }
            | Error::SignalCountMismatch { .. }
            | Error::DataRange(..)
            | Error::CastFailed => ErrorKind::Validation,
        }
    }

    /// The index of the signal that could not be fitted.
    ///
    /// Set for single-signal Fit errors.
    /// Returns `None` for batch failures and for other kinds.
    #[must_use]
    pub fn failed_signal(&self) -> Option<usize> {
        match self {
            Error::RankDeficient { signal, .. }
            | Error::Algebra { signal, .. }
            | Error::DegreeTooHigh { signal, .. } => Some(*signal),
            _ => None,
        }
    }

    /// The degree that could not be fitted.
    ///
    /// Set for every Fit error, so a caller can retry lower.
    #[must_use]
    pub fn failed_degree(&self) -> Option<usize> {
        match self {
            Error::RankDeficient { degree, .. }
            | Error::DegreeTooHigh { degree, .. }
            | Error::BatchRankDeficient { degree, .. }
            | Error::Algebra { degree, .. } => Some(*degree),
            _ => None,
        }
    }
}

/// Result type for batched polynomial fitting
pub type Result<T> = std::result::Result<T, Error>;
