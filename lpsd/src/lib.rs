//! Numerical building blocks for averaged single-bin spectral estimation.
//!
//! - Least-squares polynomial detrending of orders -1 through 10
//!   ([`signal::polyreg`]).
//! - Single-bin power and cross-power averaged over overlapping detrended
//!   segments ([`signal::dft`], [`signal::xdft`]).
//! - Rank-window smoothing by median, mean, min or max ([`signal::smooth`]).
//!
//! Diagnostics are emitted through [`tracing`]; no subscriber is installed.

pub mod kernel;
pub mod signal;
pub mod stats;
