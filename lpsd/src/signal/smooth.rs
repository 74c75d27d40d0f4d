//! Sliding rank-window smoothing by median, mean, min or max.

use crate::kernel::{
    write_exact, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use crate::signal::traits::RankSmooth1D;
use crate::stats::SmoothMethod;

/// Constructor config for [`RankSmoothKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankSmoothConfig {
    /// Window width; each window holds `bandwidth + 1` samples.
    pub bandwidth: usize,
    /// Leading fraction of the sorted window the statistic is drawn from.
    pub fraction: f64,
    /// Statistic applied to the selected prefix.
    pub method: SmoothMethod,
}

/// Sliding rank-window smoother.
///
/// Every output sample is a statistic over the lowest
/// `floor(fraction * bandwidth)` values of its sorted neighbourhood.
/// Neighbourhoods that reach past either end of the signal repeat the edge
/// sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSmoothKernel {
    bandwidth: usize,
    count: usize,
    method: SmoothMethod,
}

impl RankSmoothKernel {
    /// Number of sorted samples each statistic is drawn from.
    pub fn count(&self) -> usize {
        self.count
    }

    fn smooth_into(&self, x: &[f64], out: &mut [f64]) {
        let last = x.len() - 1;
        let half = self.bandwidth / 2;
        let mut window = vec![0.0; self.bandwidth + 1];
        for (k, o) in out.iter_mut().enumerate() {
            for (j, w) in window.iter_mut().enumerate() {
                let idx = (k + j).saturating_sub(half).min(last);
                *w = x[idx];
            }
            window.sort_unstable_by(f64::total_cmp);
            *o = self.method.over_sorted(&window[..self.count]);
        }
    }
}

impl KernelLifecycle for RankSmoothKernel {
    type Config = RankSmoothConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.bandwidth == 0 || config.bandwidth.checked_add(1).is_none() {
            return Err(ConfigError::InvalidArgument {
                arg: "bandwidth",
                reason: "bandwidth must be > 0 and leave room for the window",
            });
        }
        if !config.fraction.is_finite() || !(0.0..=1.0).contains(&config.fraction) {
            return Err(ConfigError::InvalidArgument {
                arg: "fraction",
                reason: "fraction must be in [0, 1]",
            });
        }
        let count = (config.fraction * config.bandwidth as f64).floor() as usize;
        if count == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "fraction",
                reason: "fraction * bandwidth must select at least one sample",
            });
        }
        tracing::debug!(
            bandwidth = config.bandwidth,
            count,
            method = ?config.method,
            "configured rank smoother"
        );
        Ok(Self {
            bandwidth: config.bandwidth,
            count,
            method: config.method,
        })
    }
}

impl RankSmooth1D for RankSmoothKernel {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if x.is_empty() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "input must be non-empty",
            });
        }
        let out = write_exact(out, "out", x.len())?;
        self.smooth_into(x, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if x.is_empty() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "input must be non-empty",
            });
        }
        let mut out = vec![0.0; x.len()];
        self.smooth_into(x, &mut out);
        Ok(out)
    }
}

///
/// Smooth `x` with a sliding rank window of `bandwidth + 1` samples.
///
/// The statistic `method` is applied to the lowest `floor(fraction * bandwidth)`
/// values of each sorted window.
///
/// ```
/// use lpsd::signal::{smooth, SmoothMethod};
///
/// let x = [5.0, 3.0, 8.0, 1.0, 9.0, 2.0, 7.0];
/// let y = smooth(&x, 4, 1.0, SmoothMethod::Median).unwrap();
/// assert_eq!(y, vec![5.0, 4.0, 4.0, 2.5, 4.5, 4.5, 7.0]);
/// ```
///
pub fn smooth(
    x: &[f64],
    bandwidth: usize,
    fraction: f64,
    method: SmoothMethod,
) -> Result<Vec<f64>, ExecInvariantViolation> {
    let kernel = RankSmoothKernel::try_new(RankSmoothConfig {
        bandwidth,
        fraction,
        method,
    })?;
    kernel.run_alloc(x)
}
