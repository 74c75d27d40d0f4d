//! Overlapping segment layout for averaged single-bin spectra.

use crate::kernel::{ConfigError, ExecInvariantViolation};

/// Round to nearest with ties rounding up, `floor(x + 0.5)`.
pub(crate) fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

pub(crate) fn check_overlap(overlap: f64) -> Result<(), ConfigError> {
    if !overlap.is_finite() || !(0.0..100.0).contains(&overlap) {
        return Err(ConfigError::InvalidArgument {
            arg: "overlap",
            reason: "overlap must be a percentage in [0, 100)",
        });
    }
    Ok(())
}

/// Segment count and start offsets for one accumulation call.
///
/// The requested overlap fixes an ideal (fractional) number of segments,
/// which is rounded to the count actually used. Segments are then spread
/// evenly across the signal with a possibly fractional shift; each start is
/// the rounded running offset, so rounding errors never accumulate.
///
/// The shift never drops below one sample. When that floor applies the
/// segment count is reduced to the number of one-sample steps that still fit,
/// so every segment lies inside the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlan {
    n_data: usize,
    seg_len: usize,
    navg: usize,
    shift: f64,
}

impl SegmentPlan {
    /// Lay out segments of `seg_len` samples over `n_data` samples with an
    /// overlap percentage in `[0, 100)`.
    pub fn new(n_data: usize, seg_len: usize, overlap: f64) -> Result<Self, ExecInvariantViolation> {
        if seg_len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "seg_len",
                reason: "segment length must be > 0",
            }
            .into());
        }
        check_overlap(overlap)?;
        if n_data < seg_len {
            return Err(ExecInvariantViolation::SignalTooShort {
                len: n_data,
                seg_len,
            });
        }

        let span = n_data - seg_len;
        let ovfact = 1.0 / (1.0 - overlap / 100.0);
        let davg = (span as f64 * ovfact) / seg_len as f64 + 1.0;
        let mut navg = round_half_up(davg).max(1) as usize;
        let mut shift = if navg == 1 {
            1.0
        } else {
            span as f64 / (navg - 1) as f64
        };
        if shift < 1.0 {
            shift = 1.0;
            navg = navg.min(span + 1);
        }

        tracing::debug!(n_data, seg_len, overlap, navg, shift, "planned segments");
        Ok(Self {
            n_data,
            seg_len,
            navg,
            shift,
        })
    }

    /// Number of segments averaged.
    pub fn navg(&self) -> usize {
        self.navg
    }

    /// Distance between consecutive segment starts, at least one sample.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Segment length in samples.
    pub fn seg_len(&self) -> usize {
        self.seg_len
    }

    /// Signal length the plan was built for.
    pub fn n_data(&self) -> usize {
        self.n_data
    }

    /// Start index of every segment, in order.
    pub fn starts(&self) -> impl Iterator<Item = usize> {
        let last = self.n_data - self.seg_len;
        let shift = self.shift;
        (0..self.navg).scan(0.0f64, move |offset, _| {
            let start = round_half_up(*offset) as usize;
            *offset += shift;
            Some(start.min(last))
        })
    }
}
