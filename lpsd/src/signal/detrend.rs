//! Least-squares polynomial detrending of fixed-length segments.

use crate::kernel::{
    check_order, read_exact, write_exact, ConfigError, ExecInvariantViolation, KernelLifecycle,
    Read1D, Write1D,
};
use crate::signal::traits::Detrend1D;
use crate::stats::mean;
use nalgebra::DMatrix;

/// Constructor config for [`PolyRegKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolyRegConfig {
    /// Segment length the fit is planned for.
    pub len: usize,
    /// Polynomial degree in `-1..=10`; `-1` disables detrending.
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
enum Fit {
    Identity,
    Mean,
    /// Thin QR factors of the design matrix over the normalised abscissa.
    Projection {
        basis: Vec<Vec<f64>>,
        r: DMatrix<f64>,
    },
}

/// Polynomial detrending kernel planned for one segment length.
///
/// The regression design only depends on the segment length and order, so
/// its QR factorisation is computed once here and every call reduces to
/// `order + 1` dot products. Coefficients are reported in the monomial basis
/// of `t = 2 i / (len - 1) - 1`, which keeps order 10 well conditioned for
/// long segments. Order 0 reports the plain arithmetic mean.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyRegKernel {
    len: usize,
    order: i32,
    fit: Fit,
}

impl PolyRegKernel {
    /// Configured segment length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a planned kernel has a non-zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured polynomial order.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Number of fitted coefficients, `order + 1`.
    pub fn n_coeffs(&self) -> usize {
        (self.order + 1) as usize
    }

    /// Evaluate the fitted polynomial described by `coeffs` at sample `index`.
    pub fn trend_at(&self, coeffs: &[f64], index: usize) -> f64 {
        let t = abscissa(index, self.len);
        coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Detrend without validation; lengths are guaranteed by the caller.
    pub(crate) fn detrend_into(&self, x: &[f64], out: &mut [f64], coeffs: &mut [f64]) {
        debug_assert_eq!(x.len(), self.len);
        debug_assert_eq!(out.len(), self.len);
        debug_assert_eq!(coeffs.len(), self.n_coeffs());
        match &self.fit {
            Fit::Identity => out.copy_from_slice(x),
            Fit::Mean => {
                let (m, _) = mean(x.iter());
                coeffs[0] = m;
                out.iter_mut().zip(x).for_each(|(o, xi)| *o = xi - m);
            }
            Fit::Projection { basis, r } => {
                for (c, q) in coeffs.iter_mut().zip(basis) {
                    *c = q.iter().zip(x).map(|(qi, xi)| qi * xi).sum();
                }
                out.copy_from_slice(x);
                for (c, q) in coeffs.iter().zip(basis) {
                    out.iter_mut().zip(q).for_each(|(o, qi)| *o -= c * qi);
                }
                // R a = Q^T x
                let m = coeffs.len();
                for k in (0..m).rev() {
                    let tail: f64 = (k + 1..m).map(|j| r[(k, j)] * coeffs[j]).sum();
                    coeffs[k] = (coeffs[k] - tail) / r[(k, k)];
                }
            }
        }
    }
}

fn abscissa(index: usize, len: usize) -> f64 {
    if len < 2 {
        0.0
    } else {
        2.0 * index as f64 / (len - 1) as f64 - 1.0
    }
}

fn projection(len: usize, n_coeffs: usize) -> Fit {
    let design = DMatrix::from_fn(len, n_coeffs, |i, j| abscissa(i, len).powi(j as i32));
    let qr = design.qr();
    let basis = qr
        .q()
        .column_iter()
        .map(|col| col.iter().copied().collect())
        .collect();
    Fit::Projection { basis, r: qr.r() }
}

impl KernelLifecycle for PolyRegKernel {
    type Config = PolyRegConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "segment length must be > 0",
            });
        }
        let n_coeffs = check_order(config.order)?;
        if config.len < n_coeffs {
            return Err(ConfigError::SegmentTooShort {
                seg_len: config.len,
                required: n_coeffs,
            });
        }
        let fit = match config.order {
            -1 => Fit::Identity,
            0 => Fit::Mean,
            _ => projection(config.len, n_coeffs),
        };
        tracing::debug!(len = config.len, order = config.order, "planned polynomial detrender");
        Ok(Self {
            len: config.len,
            order: config.order,
            fit,
        })
    }
}

impl Detrend1D for PolyRegKernel {
    fn run_into<I, O, C>(
        &self,
        input: &I,
        out: &mut O,
        coeffs: &mut C,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
        C: Write1D<f64> + ?Sized,
    {
        let input = read_exact(input, "input", self.len)?;
        let out = write_exact(out, "out", self.len)?;
        let coeffs = write_exact(coeffs, "coeffs", self.n_coeffs())?;
        self.detrend_into(input, out, coeffs);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_exact(input, "input", self.len)?;
        let mut out = vec![0.0; self.len];
        let mut coeffs = vec![0.0; self.n_coeffs()];
        self.detrend_into(input, &mut out, &mut coeffs);
        Ok((out, coeffs))
    }
}

///
/// Remove a least-squares polynomial of degree `order` from `x`.
///
/// Returns the detrended samples and the `order + 1` fitted coefficients.
/// `order = -1` returns `x` unchanged with no coefficients.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use lpsd::signal::polyreg;
///
/// let x: Vec<f64> = (0..16).map(|i| 3.0 + 0.5 * i as f64).collect();
/// let (y, a) = polyreg(&x, 1).unwrap();
/// assert_eq!(a.len(), 2);
/// y.iter().for_each(|v| assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12));
/// ```
///
pub fn polyreg(x: &[f64], order: i32) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation> {
    let kernel = PolyRegKernel::try_new(PolyRegConfig {
        len: x.len(),
        order,
    })?;
    kernel.run_alloc(x)
}

///
/// Remove the least-squares straight line from `x` using the closed-form
/// centred-index regression.
///
/// Agrees with [`polyreg`] at order 1 to rounding, without planning a fit.
///
pub fn remove_linear_drift(x: &[f64]) -> Result<Vec<f64>, ExecInvariantViolation> {
    if x.len() < 2 {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "linear drift removal needs at least 2 samples",
        });
    }
    let n = x.len() as f64;
    let sx = n * (n - 1.0) / 2.0;
    let xm = (n - 1.0) / 2.0;
    let stt = (n * n * n - n) / 12.0;
    let (sy, sty) = x
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sy, sty), (i, xi)| {
            (sy + xi, sty + (i as f64 - xm) * xi)
        });
    let b = sty / stt;
    let a = (sy - sx * b) / n;
    Ok(x.iter()
        .enumerate()
        .map(|(i, xi)| xi - (a + b * i as f64))
        .collect())
}
