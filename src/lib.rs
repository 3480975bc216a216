//! # Polybatch
//! ## Fit a thousand signals for the price of one decomposition
//!
//! Tracking data, telemetry and sensor logs tend to arrive as *many* signals sampled over *one* axis:
//! the x, y and z components of an orbit against time, a bank of thermocouples against the same clock,
//! a spectrum per pixel against wavelength.
//!
//! This crate fits a polynomial to every one of those signals with ordinary least squares, and
//! evaluates the results at whatever positions you like, in whatever shape you have them in.
//!
//! I provide a set of tools designed to help you:
//! - Fit one signal, or a whole table of them, at one degree or a different degree per signal
//! - Solve every same-degree signal against a single decomposition of the design matrix
//! - Evaluate the fits at scalars, slices or arrays of any dimension with Horner's scheme
//! - Persist a fit, reload it, and be told loudly if the document has been tampered with
//! - Write easy to understand tests to confirm function, see [`test`]
//!
//! The simplest use-case is to smooth a single noisy signal:
//! ```rust
//! use polybatch::{fit_series, assert_close};
//!
//! let t = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [1.0, 3.0, 5.0, 7.0, 9.0];
//!
//! let fit = fit_series(&t, &y, 1).unwrap();
//! assert_close!(fit.evaluate_scalar(10.0).unwrap()[0], 21.0, tol = 1e-9);
//! ```
//!
//! And the case this crate exists for, a batch of signals over a shared axis:
//! ```rust
//! use ndarray::array;
//! use polybatch::{fit, DegreeSpec, SampleSet, SignalAxis};
//!
//! let t = [0.0, 1.0, 2.0, 3.0, 4.0];
//! // One column per signal: x(t) = 2t + 1, y(t) = t² - 3
//! let values = array![[1.0, -3.0], [3.0, -2.0], [5.0, 1.0], [7.0, 6.0], [9.0, 13.0]];
//! let samples = SampleSet::table(&t, values.view(), SignalAxis::Columns).unwrap();
//!
//! let fit = fit(&samples, DegreeSpec::from([1, 2])).unwrap();
//! assert_eq!(fit.coefficient_counts(), &[2, 3]);
//! println!("{fit}"); // y₀(x) = 2.00x + 1.00
//!                    // y₁(x) = x² - 3.00
//! ```
//!
//! # Core Concepts
//! - A [`SampleSet`] is the input: `N` shared positions, and `M` signals with one value per position.
//!     - Signals may be the rows or the columns of a table, see [`SignalAxis`].
//! - A [`DegreeSpec`] is either one degree for every signal, or one degree per signal.
//!     - A signal fitted at degree `d` gets `d + 1` coefficients.
//! - The **basis** is the Vandermonde design matrix, built once at the highest degree requested.
//!     - Columns run from the highest power down to the constant, see [`basis::Basis`].
//!     - A lower-degree signal uses the trailing columns of the same matrix.
//! - A [`FitMode`] says how the batch is solved. It is picked for you:
//!     - [`FitMode::SingleSeries`] for one signal
//!     - [`FitMode::SharedDegreeBatch`] when every degree is the same: one decomposition, every signal at once
//!     - [`FitMode::HeterogeneousDegreeBatch`] otherwise: one solve per signal
//! - A [`FitResult`] holds every signal's coefficients packed into a single vector, highest power first.
//!     - [`FitResult::evaluate`] evaluates it, see [`eval`] for the output shapes.
//!
//! # Implementation Details
//!
//! Linear algebra is done with `nalgebra`: least squares goes through a singular value decomposition,
//! and a fit whose design matrix is rank deficient is refused rather than returned.
//! Array inputs and outputs use `ndarray`.
//!
//! With the `parallel` feature, the per-signal solves of a heterogeneous batch run on `rayon`.
//!
//! # Testing utilities
//!
//! This crate includes a set of testing utilities to facilitate the development and validation of fits. See [`test`].
//!
//! The `transforms` feature (on by default) adds seeded noise for building synthetic signals, see [`transforms`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]


#[cfg(feature = "transforms")]
#[cfg_attr(docsrs, doc(cfg(feature = "transforms")))]
pub mod transforms;

pub mod basis;
pub mod display;
pub mod error;
pub mod eval;
pub mod statistics;
pub mod value;

mod degree;
mod fit;
mod samples;

pub use degree::DegreeSpec;
pub use error::{Error, ErrorKind, Result};
pub use eval::EvalLayout;
pub use fit::*;
pub use samples::{SampleSet, SignalAxis};

pub use nalgebra;
pub use ndarray;
