//! Trait interfaces for the signal-processing capabilities of this crate.
//!
//! Kernels are validated once through [`crate::kernel::KernelLifecycle`] and
//! then run through one of these traits any number of times.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::{CrossDftEstimate, DftEstimate, StateSpaceOutput};
use nalgebra::DMatrix;

/// Least-squares polynomial detrending capability.
pub trait Detrend1D {
    /// Detrend into caller-provided buffers.
    ///
    /// `out` must match the configured length and `coeffs` must hold
    /// `order + 1` values.
    fn run_into<I, O, C>(
        &self,
        input: &I,
        out: &mut O,
        coeffs: &mut C,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
        C: Write1D<f64> + ?Sized;

    /// Detrend and allocate `(detrended, coefficients)`.
    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Single-bin DFT power accumulated over overlapping detrended segments.
pub trait SegmentDft1D {
    /// Correlate every segment of `input` with the basis `(cr, ci)` and
    /// average the resulting power.
    fn run<I, CR, CI>(
        &self,
        input: &I,
        cr: &CR,
        ci: &CI,
    ) -> Result<DftEstimate, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        CR: Read1D<f64> + ?Sized,
        CI: Read1D<f64> + ?Sized;
}

/// Single-bin cross-DFT accumulated over overlapping detrended segments.
pub trait CrossSegmentDft1D {
    /// Correlate matching segments of `x` and `y` with the basis `(cr, ci)`
    /// and average the cross and auto powers.
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
        CI: Read1D<f64> + ?Sized;
}

/// Single-bin DFT basis generation capability.
pub trait DftBasisDesign {
    /// Write the cosine and negated sine weights into caller-provided buffers.
    fn run_into<OR, OI>(&self, cr: &mut OR, ci: &mut OI) -> Result<(), ExecInvariantViolation>
    where
        OR: Write1D<f64> + ?Sized,
        OI: Write1D<f64> + ?Sized;

    /// Generate and allocate `(cr, ci)`.
    fn run_alloc(&self) -> (Vec<f64>, Vec<f64>);
}

/// Rank-window smoothing capability.
pub trait RankSmooth1D {
    /// Smooth into a caller-provided output buffer of the input's length.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized;

    /// Smooth and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Discrete state-space propagation capability.
pub trait StateSpacePropagate {
    /// Propagate `initial_state` through the model driven by `inputs`
    /// (one column per sample).
    fn run<I>(
        &self,
        initial_state: &I,
        inputs: &DMatrix<f64>,
    ) -> Result<StateSpaceOutput, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}
