//! Streaming and rank statistics used by the spectral and smoothing kernels.

use crate::kernel::ConfigError;
use core::{borrow::Borrow, ops::Add, str::FromStr};
use nalgebra::Complex;
use num_traits::{Num, NumCast};

///
/// Compute the mean of the signal, `y`
///
/// Return the mean and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use lpsd::stats::mean;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(3f64, mean(y.iter()).0);
///
/// let y: &[f64] = &[];
/// assert_eq!((0f64, 0), mean(y.iter()));
/// ```
///
pub fn mean<YI, F>(y: YI) -> (F, usize)
where
    F: Num + NumCast + Default + Copy + Add,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold(Default::default(), |acc: (F, usize), yi| {
        (acc.0 + *yi.borrow(), acc.1 + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => Default::default(),
    }
}

/// Welford accumulator for a real power estimate.
///
/// The update divides the deviation by the number of samples already seen
/// (the zero-based index of the incoming sample), not by the new count.
/// Spectral estimates produced by this crate depend on that exact update, so
/// it must not be replaced by the textbook `delta / (n + 1)` form.
///
/// ```
/// use lpsd::stats::RunningPower;
///
/// let acc = [2.0, 4.0, 4.0]
///     .into_iter()
///     .fold(RunningPower::new(), RunningPower::push);
/// assert_eq!(acc.count(), 3);
/// assert_eq!(acc.mean(), 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunningPower {
    mean: f64,
    m2: f64,
    count: usize,
}

impl RunningPower {
    /// Empty accumulator.
    pub const fn new() -> Self {
        Self {
            mean: 0.0,
            m2: 0.0,
            count: 0,
        }
    }

    /// Fold one sample into the running estimate.
    #[must_use]
    pub fn push(self, sample: f64) -> Self {
        if self.count == 0 {
            return Self {
                mean: sample,
                m2: 0.0,
                count: 1,
            };
        }
        let delta = sample - self.mean;
        let mean = self.mean + delta / self.count as f64;
        Self {
            mean,
            m2: self.m2 + delta * (sample - mean),
            count: self.count + 1,
        }
    }

    /// Running mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Accumulated sum of squared deviations.
    pub fn sum_sq_dev(&self) -> f64 {
        self.m2
    }

    /// Number of samples folded in so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// `m2 / (n - 1)`, or the squared mean when only one sample was seen.
    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            self.mean * self.mean
        }
    }
}

/// Welford-style accumulator for a complex cross-power estimate.
///
/// The dispersion term adds the modulus of the product of the deviations
/// taken before and after each mean update, `|(s - m_old) (s - m_new)|`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunningCrossPower {
    mean: Complex<f64>,
    m2: f64,
    count: usize,
}

impl RunningCrossPower {
    /// Empty accumulator.
    pub const fn new() -> Self {
        Self {
            mean: Complex::new(0.0, 0.0),
            m2: 0.0,
            count: 0,
        }
    }

    /// Fold one complex sample into the running estimate.
    #[must_use]
    pub fn push(self, sample: Complex<f64>) -> Self {
        if self.count == 0 {
            return Self {
                mean: sample,
                m2: 0.0,
                count: 1,
            };
        }
        let before = sample - self.mean;
        let mean = self.mean + before / self.count as f64;
        let after = sample - mean;
        Self {
            mean,
            m2: self.m2 + (before * after).norm_sqr().sqrt(),
            count: self.count + 1,
        }
    }

    /// Running complex mean.
    pub fn mean(&self) -> Complex<f64> {
        self.mean
    }

    /// Number of samples folded in so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// `m2 / (n - 1)`, or `|mean|^2` when only one sample was seen.
    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            self.mean.norm_sqr()
        }
    }
}

/// Statistic drawn from the low-rank prefix of a sorted window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SmoothMethod {
    /// Median of the prefix; even lengths average the two central values.
    Median,
    /// Arithmetic mean of the prefix.
    Mean,
    /// Smallest value of the prefix.
    Min,
    /// Largest value of the prefix.
    Max,
}

impl SmoothMethod {
    /// Evaluate the statistic over an ascending, non-empty slice.
    pub fn over_sorted(self, sorted: &[f64]) -> f64 {
        debug_assert!(!sorted.is_empty());
        let n = sorted.len();
        match self {
            SmoothMethod::Median => {
                if n % 2 == 0 {
                    (sorted[n / 2] + sorted[n / 2 - 1]) / 2.0
                } else {
                    sorted[(n - 1) / 2]
                }
            }
            SmoothMethod::Mean => mean(sorted.iter()).0,
            SmoothMethod::Min => sorted.iter().copied().fold(sorted[0], f64::min),
            SmoothMethod::Max => sorted.iter().copied().fold(sorted[0], f64::max),
        }
    }
}

impl FromStr for SmoothMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "median" => Ok(SmoothMethod::Median),
            "mean" => Ok(SmoothMethod::Mean),
            "min" => Ok(SmoothMethod::Min),
            "max" => Ok(SmoothMethod::Max),
            _ => Err(ConfigError::InvalidArgument {
                arg: "method",
                reason: "method must be one of median, mean, min, max",
            }),
        }
    }
}
