//! Cosine and sine weights of a single DFT bin.

use crate::kernel::{
    write_exact, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D,
};
use crate::signal::traits::DftBasisDesign;

/// Constructor config for [`DftBasisKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DftBasisConfig {
    /// Segment length.
    pub seg_len: usize,
    /// Bin frequency in Hz.
    pub freq: f64,
    /// Sampling frequency in Hz.
    pub fs: f64,
}

/// Cosine / negated-sine weights of one DFT bin, `exp(-i 2 pi f j / fs)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DftBasisKernel {
    seg_len: usize,
    omega: f64,
}

impl DftBasisKernel {
    fn fill(&self, cr: &mut [f64], ci: &mut [f64]) {
        for (j, (c, s)) in cr.iter_mut().zip(ci.iter_mut()).enumerate() {
            let (sin, cos) = (self.omega * j as f64).sin_cos();
            *c = cos;
            *s = -sin;
        }
    }
}

impl KernelLifecycle for DftBasisKernel {
    type Config = DftBasisConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.seg_len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "seg_len",
                reason: "segment length must be > 0",
            });
        }
        if !config.fs.is_finite() || config.fs <= 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "fs must be finite and > 0",
            });
        }
        if !config.freq.is_finite() || config.freq < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "freq",
                reason: "freq must be finite and >= 0",
            });
        }
        Ok(Self {
            seg_len: config.seg_len,
            omega: 2.0 * core::f64::consts::PI * config.freq / config.fs,
        })
    }
}

impl DftBasisDesign for DftBasisKernel {
    fn run_into<OR, OI>(&self, cr: &mut OR, ci: &mut OI) -> Result<(), ExecInvariantViolation>
    where
        OR: Write1D<f64> + ?Sized,
        OI: Write1D<f64> + ?Sized,
    {
        let cr = write_exact(cr, "cr", self.seg_len)?;
        let ci = write_exact(ci, "ci", self.seg_len)?;
        self.fill(cr, ci);
        Ok(())
    }

    fn run_alloc(&self) -> (Vec<f64>, Vec<f64>) {
        let mut cr = vec![0.0; self.seg_len];
        let mut ci = vec![0.0; self.seg_len];
        self.fill(&mut cr, &mut ci);
        (cr, ci)
    }
}

/// DFT weights `(cr, ci)` of the bin at `freq` Hz for segments of `seg_len`
/// samples taken at `fs` Hz.
pub fn dft_basis(
    seg_len: usize,
    freq: f64,
    fs: f64,
) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation> {
    let kernel = DftBasisKernel::try_new(DftBasisConfig { seg_len, freq, fs })?;
    Ok(kernel.run_alloc())
}
