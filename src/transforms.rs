//! Seeded noise transforms for building synthetic signals
//!
//! Data can be transformed by anything implementing the [`Transform`] trait, which applies the transformation over a set of values.
//!
//! The [`Transformable`] trait is a convenient wrapper that allows you to apply transformations to your data more easily.
//! It is implemented for plain signals (`Vec<T>`, 1-D arrays) and for tables of signals (2-D arrays),
//! where every signal gets independent noise.
//!
//! # Noise: [`NoiseTransform`] / [`ApplyNoise`]
//! - Gaussian noise: [`NoiseTransform::CorrelatedGaussian`]
//!   - Applies correlated Gaussian noise to the data.
//!   - [`ApplyNoise::apply_correlated_noise`] allows you to apply it to a signal or a table of signals
//!   - [`ApplyNoise::apply_normal_noise`] is similar, but applies uncorrelated Gaussian noise.
//! - Uniform noise: [`NoiseTransform::Uniform`]
//!   - Applies uniform noise to the data.
//!   - [`ApplyNoise::apply_uniform_noise`] allows you to apply it to a signal or a table of signals
//!
//! The size of the noise is given as a [`Strength`], either absolute or relative to the spread of each signal.
//!
//! ```rust
//! use polybatch::transforms::{ApplyNoise, Strength};
//!
//! let clean: Vec<f64> = (0..100).map(|i| f64::from(i) * 0.5).collect();
//! let noisy = clean.clone().apply_normal_noise(Strength::Absolute(0.01), Some(7));
//! assert_eq!(noisy.len(), clean.len());
//! assert_ne!(noisy, clean);
//! ```
use ndarray::{Array1, Array2, ArrayViewMut1};

use crate::value::Value;

mod noise;
pub use noise::{ApplyNoise, NoiseTransform, Strength};

pub use rand;
pub use rand_distr;

/// Trait for applying transformations to data.
pub trait Transform<T: Value> {
    /// Applies the transformation to the given data.
    fn apply<'a>(&self, data: impl Iterator<Item = &'a mut T>);
}

/// Trait for transforming data.
pub trait Transformable<T: Value> {
    /// Transforms the data in place.
    fn transform<R: Transform<T>>(&mut self, transform: &R);
}

impl<T: Value> Transformable<T> for Vec<T> {
    fn transform<R: Transform<T>>(&mut self, transform: &R) {
        transform.apply(self.iter_mut());
    }
}

impl<T: Value> Transformable<T> for Array1<T> {
    fn transform<R: Transform<T>>(&mut self, transform: &R) {
        transform.apply(self.iter_mut());
    }
}

impl<T: Value> Transformable<T> for ArrayViewMut1<'_, T> {
    fn transform<R: Transform<T>>(&mut self, transform: &R) {
        transform.apply(self.iter_mut());
    }
}

/// Each column of the table is one signal, transformed on its own.
impl<T: Value> Transformable<T> for Array2<T> {
    fn transform<R: Transform<T>>(&mut self, transform: &R) {
        for column in self.columns_mut() {
            transform.apply(column.into_iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    struct Double;
    impl Transform<f64> for Double {
        fn apply<'a>(&self, data: impl Iterator<Item = &'a mut f64>) {
            data.for_each(|v| *v *= 2.0);
        }
    }

    #[test]
    fn test_transformable() {
        let mut signal = vec![1.0, 2.0, 3.0];
        signal.transform(&Double);
        assert_eq!(signal, vec![2.0, 4.0, 6.0]);

        let mut table = array![[1.0, 10.0], [2.0, 20.0]];
        table.transform(&Double);
        assert_eq!(table, array![[2.0, 20.0], [4.0, 40.0]]);
    }
}
