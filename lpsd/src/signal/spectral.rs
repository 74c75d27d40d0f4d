//! Single-bin power and cross-power averaged over overlapping, detrended
//! segments.
//!
//! Each call evaluates one frequency bin: the caller supplies the bin's DFT
//! weights and the kernels correlate every segment against them, feeding the
//! per-segment power into a Welford accumulator.

use crate::kernel::{
    read_exact, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
};
use crate::signal::detrend::{PolyRegConfig, PolyRegKernel};
use crate::signal::segments::{check_overlap, SegmentPlan};
use crate::signal::traits::{CrossSegmentDft1D, SegmentDft1D};
use crate::stats::{RunningCrossPower, RunningPower};
use itertools::izip;
use nalgebra::Complex;

/// Averaged single-bin power.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DftEstimate {
    /// Mean power over all segments.
    pub power: f64,
    /// Sample variance of the per-segment power, or `power^2` for one segment.
    pub variance: f64,
    /// Number of segments averaged.
    ///
    /// Normally the overlap-derived count. When the segments would have to
    /// start less than one sample apart, it is cut to the number of
    /// one-sample steps that fit, which can fall below that value.
    pub segments: usize,
}

/// Averaged single-bin cross-power and auto-powers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrossDftEstimate {
    /// Mean cross-power `conj(X) Y`.
    pub cross_power: Complex<f64>,
    /// Dispersion of the cross-power, or `|cross_power|^2` for one segment.
    pub cross_variance: f64,
    /// Mean auto-power of `x`.
    pub power_x: f64,
    /// Mean auto-power of `y`.
    pub power_y: f64,
    /// Number of segments averaged, limited as for [`DftEstimate::segments`].
    pub segments: usize,
}

/// Constructor config for [`SegmentDftKernel`] and [`CrossSegmentDftKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentDftConfig {
    /// Segment length.
    pub seg_len: usize,
    /// Overlap between consecutive segments in percent, `[0, 100)`.
    pub overlap: f64,
    /// Detrending order in `-1..=10`.
    pub order: i32,
}

fn plan_detrender(config: &SegmentDftConfig) -> Result<PolyRegKernel, ConfigError> {
    check_overlap(config.overlap)?;
    PolyRegKernel::try_new(PolyRegConfig {
        len: config.seg_len,
        order: config.order,
    })
}

#[inline]
fn correlate(cr: &[f64], ci: &[f64], seg: &[f64]) -> (f64, f64) {
    izip!(cr, ci, seg).fold((0.0, 0.0), |(re, im), (c, s, p)| (re + c * p, im + s * p))
}

/// Single-channel segmented DFT kernel.
///
/// One kernel serves every frequency bin that shares a segment length.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDftKernel {
    overlap: f64,
    detrender: PolyRegKernel,
}

impl SegmentDftKernel {
    /// Configured segment length.
    pub fn seg_len(&self) -> usize {
        self.detrender.len()
    }
}

impl KernelLifecycle for SegmentDftKernel {
    type Config = SegmentDftConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            overlap: config.overlap,
            detrender: plan_detrender(&config)?,
        })
    }
}

impl SegmentDft1D for SegmentDftKernel {
    fn run<I, CR, CI>(
        &self,
        input: &I,
        cr: &CR,
        ci: &CI,
    ) -> Result<DftEstimate, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        CR: Read1D<f64> + ?Sized,
        CI: Read1D<f64> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let seg_len = self.seg_len();
        let cr = read_exact(cr, "cr", seg_len)?;
        let ci = read_exact(ci, "ci", seg_len)?;
        let plan = SegmentPlan::new(x.len(), seg_len, self.overlap)?;

        let mut detrended = vec![0.0; seg_len];
        let mut coeffs = vec![0.0; self.detrender.n_coeffs()];
        let acc = plan
            .starts()
            .enumerate()
            .fold(RunningPower::new(), |acc, (segment, start)| {
                self.detrender
                    .detrend_into(&x[start..start + seg_len], &mut detrended, &mut coeffs);
                let (re, im) = correlate(cr, ci, &detrended);
                let power = re * re + im * im;
                tracing::trace!(segment, start, power, "segment power");
                acc.push(power)
            });

        Ok(DftEstimate {
            power: acc.mean(),
            variance: acc.variance(),
            segments: plan.navg(),
        })
    }
}

/// Two-channel segmented cross-DFT kernel.
///
/// Both channels are cut at the same segment starts and detrended
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSegmentDftKernel {
    overlap: f64,
    detrender: PolyRegKernel,
}

impl CrossSegmentDftKernel {
    /// Configured segment length.
    pub fn seg_len(&self) -> usize {
        self.detrender.len()
    }
}

impl KernelLifecycle for CrossSegmentDftKernel {
    type Config = SegmentDftConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            overlap: config.overlap,
            detrender: plan_detrender(&config)?,
        })
    }
}

impl CrossSegmentDft1D for CrossSegmentDftKernel {
    fn run<IX, IY, CR, CI>(
        &self,
        x: &IX,
        y: &IY,
        cr: &CR,
        ci: &CI,
    ) -> Result<CrossDftEstimate, ExecInvariantViolation>
    where
        IX: Read1D<f64> + ?Sized,
        IY: Read1D<f64> + ?Sized,
        CR: Read1D<f64> + ?Sized,
        CI: Read1D<f64> + ?Sized,
    {
        let x = x.read_slice().map_err(ExecInvariantViolation::from)?;
        let y = read_exact(y, "y", x.len())?;
        let seg_len = self.seg_len();
        let cr = read_exact(cr, "cr", seg_len)?;
        let ci = read_exact(ci, "ci", seg_len)?;
        let plan = SegmentPlan::new(x.len(), seg_len, self.overlap)?;

        let mut dx = vec![0.0; seg_len];
        let mut dy = vec![0.0; seg_len];
        let mut coeffs = vec![0.0; self.detrender.n_coeffs()];
        let init = (
            RunningCrossPower::new(),
            RunningPower::new(),
            RunningPower::new(),
        );
        let (xy, xx, yy) = plan.starts().enumerate().fold(
            init,
            |(xy, xx, yy), (segment, start)| {
                let end = start + seg_len;
                self.detrender
                    .detrend_into(&x[start..end], &mut dx, &mut coeffs);
                self.detrender
                    .detrend_into(&y[start..end], &mut dy, &mut coeffs);
                let (rx, ix, ry, iy) = izip!(cr, ci, &dx, &dy).fold(
                    (0.0, 0.0, 0.0, 0.0),
                    |(rx, ix, ry, iy), (c, s, px, py)| {
                        (rx + c * px, ix + s * px, ry + c * py, iy + s * py)
                    },
                );
                let cross = Complex::new(ry * rx + iy * ix, iy * rx - ry * ix);
                tracing::trace!(segment, start, re = cross.re, im = cross.im, "segment cross power");
                (
                    xy.push(cross),
                    xx.push(rx * rx + ix * ix),
                    yy.push(ry * ry + iy * iy),
                )
            },
        );

        Ok(CrossDftEstimate {
            cross_power: xy.mean(),
            cross_variance: xy.variance(),
            power_x: xx.mean(),
            power_y: yy.mean(),
            segments: plan.navg(),
        })
    }
}

///
/// Average the power of one DFT bin over overlapping detrended segments.
///
/// `cr` and `ci` are the bin's cosine and sine weights, both `seg_len` long;
/// `overlap` is a percentage in `[0, 100)` and `order` the detrending order
/// in `-1..=10`.
///
/// ```
/// use approx::assert_relative_eq;
/// use lpsd::signal::{dft, dft_basis};
///
/// // 4 cycles per 64-sample segment
/// let x: Vec<f64> = (0..1024)
///     .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / 64.0).sin())
///     .collect();
/// let (cr, ci) = dft_basis(64, 4.0, 64.0).unwrap();
/// let est = dft(&x, 64, &cr, &ci, 50.0, 0).unwrap();
/// assert_eq!(est.segments, 31);
/// assert_relative_eq!(est.power, 32.0 * 32.0, max_relative = 1e-9);
/// ```
///
pub fn dft(
    x: &[f64],
    seg_len: usize,
    cr: &[f64],
    ci: &[f64],
    overlap: f64,
    order: i32,
) -> Result<DftEstimate, ExecInvariantViolation> {
    let kernel = SegmentDftKernel::try_new(SegmentDftConfig {
        seg_len,
        overlap,
        order,
    })?;
    kernel.run(x, cr, ci)
}

///
/// Average the cross-power of one DFT bin between `x` and `y` over
/// overlapping detrended segments.
///
/// `x` and `y` must have the same length.
///
pub fn xdft(
    x: &[f64],
    y: &[f64],
    seg_len: usize,
    cr: &[f64],
    ci: &[f64],
    overlap: f64,
    order: i32,
) -> Result<CrossDftEstimate, ExecInvariantViolation> {
    let kernel = CrossSegmentDftKernel::try_new(SegmentDftConfig {
        seg_len,
        overlap,
        order,
    })?;
    kernel.run(x, y, cr, ci)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::dft_basis;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rustfft::FftPlanner;

    const PI: f64 = core::f64::consts::PI;

    fn tone(n: usize, cycles_per_seg: f64, seg_len: usize, amp: f64, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amp * (2.0 * PI * cycles_per_seg * i as f64 / seg_len as f64 + phase).sin())
            .collect()
    }

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    #[test]
    fn matched_tone_power_is_independent_of_overlap() {
        let seg_len = 64;
        let amp = 1.5;
        let x = tone(1024, 4.0, seg_len, amp, 0.3);
        let (cr, ci) = dft_basis(seg_len, 4.0, seg_len as f64).expect("basis");
        let analytic = (amp * seg_len as f64 / 2.0).powi(2);
        for order in [-1, 0] {
            for overlap in [0.0, 50.0, 75.0] {
                let est = dft(&x, seg_len, &cr, &ci, overlap, order).expect("dft");
                assert_relative_eq!(est.power, analytic, max_relative = 1e-9);
                assert!(est.variance.abs() < 1e-12 * analytic);
            }
        }
    }

    #[test]
    fn single_segment_matches_fft_bin() {
        let n = 128;
        let x = noise(n, 7);
        let mut spectrum: Vec<rustfft::num_complex::Complex<f64>> = x
            .iter()
            .map(|v| rustfft::num_complex::Complex::new(*v, 0.0))
            .collect();
        FftPlanner::<f64>::new()
            .plan_fft_forward(n)
            .process(&mut spectrum);

        for k in [1usize, 5, 17, 40, 63] {
            let (cr, ci) = dft_basis(n, k as f64, n as f64).expect("basis");
            let est = dft(&x, n, &cr, &ci, 0.0, -1).expect("dft");
            assert_eq!(est.segments, 1);
            assert_relative_eq!(est.power, spectrum[k].norm_sqr(), max_relative = 1e-10);
        }
    }

    #[test]
    fn single_segment_variance_is_power_squared() {
        let x = noise(256, 11);
        let (cr, ci) = dft_basis(256, 9.0, 256.0).expect("basis");
        let est = dft(&x, 256, &cr, &ci, 0.0, 1).expect("dft");
        assert_eq!(est.segments, 1);
        assert_eq!(est.variance, est.power * est.power);

        let y = noise(256, 12);
        let cross = xdft(&x, &y, 256, &cr, &ci, 0.0, 1).expect("xdft");
        assert_eq!(cross.segments, 1);
        assert_eq!(cross.cross_variance, cross.cross_power.norm_sqr());
    }

    #[test]
    fn detrending_removes_linear_ramp_before_correlation() {
        let seg_len = 100;
        let clean = noise(1000, 3);
        let ramped: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, v)| v + 5.0 - 0.02 * i as f64)
            .collect();
        let (cr, ci) = dft_basis(seg_len, 7.0, seg_len as f64).expect("basis");
        let a = dft(&clean, seg_len, &cr, &ci, 50.0, 1).expect("clean");
        let b = dft(&ramped, seg_len, &cr, &ci, 50.0, 1).expect("ramped");
        assert_eq!(a.segments, 19);
        assert_relative_eq!(a.power, b.power, max_relative = 1e-9);
        assert_relative_eq!(a.variance, b.variance, max_relative = 1e-6);
    }

    #[test]
    fn identical_channels_give_real_cross_power() {
        let x = noise(600, 21);
        let (cr, ci) = dft_basis(80, 3.0, 80.0).expect("basis");
        for order in [-1, 0, 1, 2, 5] {
            for overlap in [0.0, 50.0, 75.0] {
                let est = xdft(&x, &x, 80, &cr, &ci, overlap, order).expect("xdft");
                assert_abs_diff_eq!(est.cross_power.im, 0.0, epsilon = 1e-12);
                assert_relative_eq!(est.cross_power.re, est.power_x, max_relative = 1e-12);
                assert_eq!(est.power_x, est.power_y);
            }
        }
    }

    #[test]
    fn cross_auto_power_matches_single_channel() {
        let x = noise(700, 5);
        let y = noise(700, 6);
        let (cr, ci) = dft_basis(64, 6.0, 64.0).expect("basis");
        let cross = xdft(&x, &y, 64, &cr, &ci, 50.0, 2).expect("xdft");
        let px = dft(&x, 64, &cr, &ci, 50.0, 2).expect("dft x");
        let py = dft(&y, 64, &cr, &ci, 50.0, 2).expect("dft y");
        assert_eq!(cross.power_x, px.power);
        assert_eq!(cross.power_y, py.power);
        assert_eq!(cross.segments, px.segments);
    }

    #[test]
    fn swapping_channels_conjugates_cross_power() {
        let x = noise(500, 8);
        let y = noise(500, 9);
        let (cr, ci) = dft_basis(50, 4.0, 50.0).expect("basis");
        let xy = xdft(&x, &y, 50, &cr, &ci, 75.0, 0).expect("xy");
        let yx = xdft(&y, &x, 50, &cr, &ci, 75.0, 0).expect("yx");
        assert_eq!(xy.cross_power, yx.cross_power.conj());
        assert_eq!(xy.cross_variance, yx.cross_variance);
        assert_eq!(xy.power_x, yx.power_y);
    }

    #[test]
    fn kernel_is_reusable_across_bins() {
        let kernel = SegmentDftKernel::try_new(SegmentDftConfig {
            seg_len: 64,
            overlap: 50.0,
            order: 0,
        })
        .expect("valid config");
        let x = tone(1024, 8.0, 64, 1.0, 0.0);
        let (cr8, ci8) = dft_basis(64, 8.0, 64.0).expect("bin 8");
        let (cr3, ci3) = dft_basis(64, 3.0, 64.0).expect("bin 3");
        let on = kernel.run(&x, &cr8, &ci8).expect("on bin");
        let off = kernel.run(&x, &cr3, &ci3).expect("off bin");
        assert_relative_eq!(on.power, 32.0 * 32.0, max_relative = 1e-9);
        assert!(off.power < 1e-20);
    }

    #[test]
    fn dense_overlap_caps_segments_at_signal_steps() {
        // 99.9 % overlap asks for 51 segments but only 6 one-sample steps fit
        let x = noise(105, 13);
        let (cr, ci) = dft_basis(100, 5.0, 100.0).expect("basis");
        let est = dft(&x, 100, &cr, &ci, 99.9, 1).expect("dft");
        assert_eq!(est.segments, 6);
        let cross = xdft(&x, &x, 100, &cr, &ci, 99.9, 1).expect("xdft");
        assert_eq!(cross.segments, 6);
        assert_relative_eq!(cross.power_x, est.power, max_relative = 1e-12);
    }

    #[test]
    fn contracts_reject_bad_configuration_and_inputs() {
        assert_eq!(
            SegmentDftKernel::try_new(SegmentDftConfig {
                seg_len: 32,
                overlap: 0.0,
                order: 11,
            }),
            Err(ConfigError::OrderOutOfRange { order: 11 })
        );
        assert!(CrossSegmentDftKernel::try_new(SegmentDftConfig {
            seg_len: 32,
            overlap: 100.0,
            order: 0,
        })
        .is_err());

        let x = noise(100, 1);
        let (cr, ci) = dft_basis(32, 2.0, 32.0).expect("basis");
        assert!(matches!(
            dft(&x, 32, &cr, &ci[..31], 0.0, 0),
            Err(ExecInvariantViolation::LengthMismatch { arg: "ci", .. })
        ));
        assert!(matches!(
            xdft(&x, &x[..99], 32, &cr, &ci, 0.0, 0),
            Err(ExecInvariantViolation::LengthMismatch { arg: "y", expected: 100, got: 99 })
        ));
        assert_eq!(
            dft(&x[..16], 32, &cr, &ci, 0.0, 0),
            Err(ExecInvariantViolation::SignalTooShort { len: 16, seg_len: 32 })
        );
    }
}
