//! Shared kernel substrate.
//!
//! Constructor validation, error types and the 1D buffer adapters used by
//! every detrending, spectral and smoothing kernel in this crate.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;

pub(crate) use io::{read_exact, write_exact};
pub(crate) use lifecycle::check_order;
