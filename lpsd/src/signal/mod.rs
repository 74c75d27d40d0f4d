//! Segmented spectral accumulation, detrending and smoothing kernels.
//!
//! Each capability is available as a validated kernel (see [`traits`]) and as
//! a free function that builds the kernel and runs it once.

/// Capability traits implemented by the kernels in this module.
pub mod traits;

mod basis;
mod detrend;
mod segments;
mod smooth;
mod spectral;
mod statespace;

pub use basis::*;
pub use detrend::*;
pub use segments::SegmentPlan;
pub use smooth::*;
pub use spectral::*;
pub use statespace::*;

pub use crate::stats::SmoothMethod;
