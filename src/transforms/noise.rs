use ndarray::Array2;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::{
    statistics::stddev_and_mean,
    transforms::{Transform, Transformable},
    value::Value,
};

/// How large the noise added to a signal should be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strength<T: Value> {
    /// The noise spread is exactly this value, in the units of the signal.
    Absolute(T),

    /// The noise spread is this multiple of the signal's own standard deviation.
    ///
    /// A constant signal has no spread; the multiple is then used as an absolute value.
    Relative(T),
}
impl<T: Value> Strength<T> {
    /// Resolves the strength to an absolute spread for the given data.
    pub fn resolve<'a>(&self, data: impl Iterator<Item = &'a T>) -> T
    where
        T: 'a,
    {
        match *self {
            Strength::Absolute(s) => Value::abs(s),
            Strength::Relative(s) => {
                let (std_dev, _) = stddev_and_mean(data.copied());
                let spread = Value::abs(s) * std_dev;
                if spread == T::zero() || !spread.is_finite_value() {
                    Value::abs(s)
                } else {
                    spread
                }
            }
        }
    }
}

/// Types of noise based transforms for data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseTransform<T: Value> {
    /// Adds correlated Gaussian noise to a signal.
    ///
    /// Gaussian noise is the familiar "bell curve" distribution.
    ///
    /// This variant introduces *correlation* between neighboring values, so the
    /// noise isn't purely independent at each point. Instead, it varies smoothly,
    /// like the slow drift of a real measurement system.
    ///
    /// <div class="warning">
    ///
    /// **Technical Details**
    ///
    /// - Each value is drawn from a normal distribution `N(0, σ²)`, where `σ` comes from the [`Strength`].
    /// - Correlation is introduced by mixing the new sample with the previous one:
    ///
    /// ```math
    /// xₙ = ρ * xₙ₋₁ + √(1 − ρ²) * εₙ
    /// where
    ///   εₙ ~ N(0, σ²), ρ = correlation factor
    /// ```
    /// </div>
    CorrelatedGaussian {
        /// Correlation factor between consecutive samples, in `[-1, 1]`.
        /// - Values near `0` → mostly independent noise.
        /// - Values near `1` → highly correlated, slow-changing noise.
        rho: T,

        /// Spread of the Gaussian distribution.
        strength: Strength<T>,

        /// Fixes the RNG seed for reproducibility.
        /// If not provided, a system RNG will be used each run.
        seed: Option<u64>,
    },

    /// Adds uniform noise to a signal.
    ///
    /// Every value in `[-σ, σ]` is equally likely, where `σ` comes from the [`Strength`].
    Uniform {
        /// Half-width of the uniform distribution.
        strength: Strength<T>,

        /// Fixes the RNG seed for reproducibility.
        /// If not provided, a system RNG will be used each run.
        seed: Option<u64>,
    },
}
impl<T: Value> NoiseTransform<T> {
    fn seed(&self) -> Option<u64> {
        match self {
            NoiseTransform::CorrelatedGaussian { seed, .. } | NoiseTransform::Uniform { seed, .. } => {
                *seed
            }
        }
    }

    /// The same transform with its seed moved along by `offset`.
    ///
    /// Used to give each signal of a table its own noise sequence.
    #[must_use]
    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        match &mut self {
            NoiseTransform::CorrelatedGaussian { seed, .. } | NoiseTransform::Uniform { seed, .. } => {
                *seed = seed.map(|s| s.wrapping_add(offset));
            }
        }
        self
    }

    fn rng(seed: Option<u64>) -> rand::rngs::SmallRng {
        match seed {
            Some(s) => rand::rngs::SmallRng::seed_from_u64(s),
            None => rand::rngs::SmallRng::from_rng(&mut rand::rng()),
        }
    }
}
impl<T: Value> Transform<T> for NoiseTransform<T>
where
    T: num_traits::Float + rand_distr::uniform::SampleUniform,
    rand_distr::StandardNormal: rand_distr::Distribution<T>,
{
    fn apply<'a>(&self, data: impl Iterator<Item = &'a mut T>) {
        let mut rng = Self::rng(self.seed());
        let data = data.collect::<Vec<_>>();

        match self {
            NoiseTransform::CorrelatedGaussian { rho, strength, .. } => {
                let noise_std = strength.resolve(data.iter().map(|v| &**v));
                let Ok(gaussian) = Normal::new(T::zero(), noise_std) else {
                    return;
                };

                let rho = num_traits::Float::clamp(*rho, -T::one(), T::one());
                let mix = num_traits::Float::sqrt(T::one() - rho * rho);

                let mut state = gaussian.sample(&mut rng); // start from a plain Gaussian
                for v in data {
                    state = rho * state + gaussian.sample(&mut rng) * mix;
                    *v += state;
                }
            }

            NoiseTransform::Uniform { strength, .. } => {
                let half_width = strength.resolve(data.iter().map(|v| &**v));
                let half_width = num_traits::Float::max(half_width, <T as num_traits::Float>::epsilon());

                let Ok(uniform) = Uniform::new(-half_width, half_width) else {
                    return;
                };
                for v in data {
                    *v += uniform.sample(&mut rng);
                }
            }
        }
    }
}

/// Trait for applying noise to signals.
///
/// For a table of signals (one signal per column), each signal gets its own noise sequence
/// and relative strengths are measured per signal. A seed still makes the whole table reproducible.
pub trait ApplyNoise<T: Value>
where
    Self: Sized,
{
    /// Adds uncorrelated Gaussian noise to a signal.
    ///
    /// This corresponds to `rho = 0` in [`NoiseTransform::CorrelatedGaussian`]:
    ///
    /// ```math
    /// xₙ = x + εₙ
    /// where
    ///   εₙ ~ N(0, σ²), x = uncorrupted value
    /// ```
    ///
    /// - `seed` *(optional)*: Fixes the RNG seed for reproducibility.
    ///   If not provided, a system RNG will be used each run.
    #[must_use]
    fn apply_normal_noise(self, strength: Strength<T>, seed: Option<u64>) -> Self;

    /// Adds correlated Gaussian noise to a signal.
    ///
    /// See [`NoiseTransform::CorrelatedGaussian`]. `rho` is clamped to `[-1, 1]`.
    #[must_use]
    fn apply_correlated_noise(self, strength: Strength<T>, rho: T, seed: Option<u64>) -> Self;

    /// Adds uniform noise in `[-σ, σ]` to a signal.
    ///
    /// See [`NoiseTransform::Uniform`].
    #[must_use]
    fn apply_uniform_noise(self, strength: Strength<T>, seed: Option<u64>) -> Self;
}

impl<T: Value> ApplyNoise<T> for Vec<T>
where
    T: num_traits::Float + rand_distr::uniform::SampleUniform,
    rand_distr::StandardNormal: rand_distr::Distribution<T>,
{
    fn apply_normal_noise(self, strength: Strength<T>, seed: Option<u64>) -> Self {
        self.apply_correlated_noise(strength, T::zero(), seed)
    }

    fn apply_correlated_noise(mut self, strength: Strength<T>, rho: T, seed: Option<u64>) -> Self {
        self.transform(&NoiseTransform::CorrelatedGaussian {
            rho,
            strength,
            seed,
        });
        self
    }

    fn apply_uniform_noise(mut self, strength: Strength<T>, seed: Option<u64>) -> Self {
        self.transform(&NoiseTransform::Uniform { strength, seed });
        self
    }
}

impl<T: Value> ApplyNoise<T> for Array2<T>
where
    T: num_traits::Float + rand_distr::uniform::SampleUniform,
    rand_distr::StandardNormal: rand_distr::Distribution<T>,
{
    fn apply_normal_noise(self, strength: Strength<T>, seed: Option<u64>) -> Self {
        self.apply_correlated_noise(strength, T::zero(), seed)
    }

    fn apply_correlated_noise(self, strength: Strength<T>, rho: T, seed: Option<u64>) -> Self {
        apply_per_column(
            self,
            NoiseTransform::CorrelatedGaussian {
                rho,
                strength,
                seed,
            },
        )
    }

    fn apply_uniform_noise(self, strength: Strength<T>, seed: Option<u64>) -> Self {
        apply_per_column(self, NoiseTransform::Uniform { strength, seed })
    }
}

fn apply_per_column<T: Value>(mut table: Array2<T>, transform: NoiseTransform<T>) -> Array2<T>
where
    NoiseTransform<T>: Transform<T>,
{
    for (j, mut column) in table.columns_mut().into_iter().enumerate() {
        column.transform(&transform.with_seed_offset(j as u64));
    }
    table
}
