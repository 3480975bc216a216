//! Polynomial degree selection for a batch of signals.
//!
//! A [`DegreeSpec`] is either one degree shared by every signal, or one degree per signal.
//!
//! ```rust
//! use polybatch::DegreeSpec;
//!
//! let shared = DegreeSpec::from(2);
//! assert_eq!(shared.resolve(3).unwrap(), vec![2, 2, 2]);
//!
//! let per_signal = DegreeSpec::from([1, 3]);
//! assert_eq!(per_signal.max(), 3);
//! assert!(per_signal.resolve(3).is_err());
//! ```
use crate::error::{Error, Result};

/// The degree (or degrees) to fit a batch of signals with.
///
/// A degree of 0 is a constant fit. A degree `d` has `d + 1` coefficients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DegreeSpec {
    /// One degree applied to every signal
    Shared(usize),

    /// One degree per signal, in signal order
    PerSignal(Vec<usize>),
}

impl DegreeSpec {
    /// The largest degree requested for any signal.
    ///
    /// This is the degree the shared basis is built for.
    /// An empty per-signal list has a maximum of 0.
    #[must_use]
    pub fn max(&self) -> usize {
        match self {
            Self::Shared(d) => *d,
            Self::PerSignal(ds) => ds.iter().copied().max().unwrap_or(0),
        }
    }

    /// True if every signal uses the same degree.
    ///
    /// A per-signal list whose entries are all equal counts as uniform.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        match self {
            Self::Shared(_) => true,
            Self::PerSignal(ds) => ds.windows(2).all(|w| w[0] == w[1]),
        }
    }

    /// Expands the degrees into one per signal.
    ///
    /// # Errors
    /// Returns [`Error::DegreeCountMismatch`] if a per-signal list does not hold exactly `signals` entries.
    pub fn resolve(&self, signals: usize) -> Result<Vec<usize>> {
        match self {
            Self::Shared(d) => Ok(vec![*d; signals]),
            Self::PerSignal(ds) if ds.len() == signals => Ok(ds.clone()),
            Self::PerSignal(ds) => Err(Error::DegreeCountMismatch {
                expected: signals,
                found: ds.len(),
            }),
        }
    }

    /// Builds a `DegreeSpec` from signed degrees, rejecting negative values.
    ///
    /// # Errors
    /// Returns [`Error::NegativeDegree`] for the first negative entry.
    pub fn from_signed(degrees: &[i64]) -> Result<Self> {
        degrees
            .iter()
            .map(|&d| usize::try_from(d).map_err(|_| Error::NegativeDegree(d)))
            .collect::<Result<Vec<_>>>()
            .map(Self::PerSignal)
    }
}

impl From<usize> for DegreeSpec {
    fn from(degree: usize) -> Self {
        Self::Shared(degree)
    }
}

impl From<Vec<usize>> for DegreeSpec {
    fn from(degrees: Vec<usize>) -> Self {
        Self::PerSignal(degrees)
    }
}

impl From<&[usize]> for DegreeSpec {
    fn from(degrees: &[usize]) -> Self {
        Self::PerSignal(degrees.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for DegreeSpec {
    fn from(degrees: [usize; N]) -> Self {
        Self::PerSignal(degrees.to_vec())
    }
}

impl TryFrom<i64> for DegreeSpec {
    type Error = Error;

    fn try_from(degree: i64) -> Result<Self> {
        usize::try_from(degree)
            .map(Self::Shared)
            .map_err(|_| Error::NegativeDegree(degree))
    }
}

impl std::fmt::Display for DegreeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared(d) => write!(f, "{d}"),
            Self::PerSignal(ds) => {
                let parts: Vec<String> = ds.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(DegreeSpec::from(0).resolve(2).unwrap(), vec![0, 0]);
        assert_eq!(DegreeSpec::from([1, 3]).resolve(2).unwrap(), vec![1, 3]);

        let err = DegreeSpec::from(vec![1, 2, 3]).resolve(2).unwrap_err();
        assert!(matches!(
            err,
            Error::DegreeCountMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_max_and_uniform() {
        assert_eq!(DegreeSpec::from(4).max(), 4);
        assert_eq!(DegreeSpec::from([2, 5, 1]).max(), 5);
        assert!(DegreeSpec::from([2, 2]).is_uniform());
        assert!(!DegreeSpec::from([2, 3]).is_uniform());
    }

    #[test]
    fn test_negative_degrees() {
        assert!(matches!(
            DegreeSpec::try_from(-1i64),
            Err(Error::NegativeDegree(-1))
        ));
        assert_eq!(DegreeSpec::try_from(3i64).unwrap(), DegreeSpec::Shared(3));

        assert!(matches!(
            DegreeSpec::from_signed(&[1, -2, 3]),
            Err(Error::NegativeDegree(-2))
        ));
        assert_eq!(
            DegreeSpec::from_signed(&[1, 2]).unwrap(),
            DegreeSpec::PerSignal(vec![1, 2])
        );
    }

    #[test]
    fn test_serde_untagged() {
        let shared: DegreeSpec = serde_json::from_str("2").unwrap();
        assert_eq!(shared, DegreeSpec::Shared(2));

        let per: DegreeSpec = serde_json::from_str("[1, 3]").unwrap();
        assert_eq!(per, DegreeSpec::PerSignal(vec![1, 3]));

        assert!(serde_json::from_str::<DegreeSpec>("-1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DegreeSpec::from(2).to_string(), "2");
        assert_eq!(DegreeSpec::from([1, 3]).to_string(), "[1, 3]");
    }
}
