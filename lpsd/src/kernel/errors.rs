use core::fmt;

/// Validation errors raised when a kernel is constructed or an adapter is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// Detrending order outside the supported `-1..=10` range.
    OrderOutOfRange {
        /// Rejected order.
        order: i32,
    },
    /// Segment too short to support a least-squares fit of the requested order.
    SegmentTooShort {
        /// Configured segment length.
        seg_len: usize,
        /// Minimum length, `order + 1`.
        required: usize,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Configuration shapes do not agree with each other.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::OrderOutOfRange { order } => {
                write!(f, "Detrending order must be between -1 and 10, got {order}.")
            }
            ConfigError::SegmentTooShort { seg_len, required } => {
                write!(
                    f,
                    "Segment length {seg_len} is too short for the fit, need at least {required}."
                )
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime precondition violations for checked kernel entrypoints.
///
/// Every variant is raised before any sample is processed, so a failed call
/// never leaves partially written outputs behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// An input or output length did not match the required runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// The signal holds fewer samples than a single segment.
    SignalTooShort {
        /// Signal length.
        len: usize,
        /// Configured segment length.
        seg_len: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::SignalTooShort { len, seg_len } => {
                write!(
                    f,
                    "Signal of {len} samples is shorter than the segment length {seg_len}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_and_reports_source() {
        let err: ExecInvariantViolation = ConfigError::OrderOutOfRange { order: 11 }.into();
        assert_eq!(
            err.to_string(),
            "Detrending order must be between -1 and 10, got 11."
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn signal_too_short_message_names_both_lengths() {
        let err = ExecInvariantViolation::SignalTooShort {
            len: 10,
            seg_len: 16,
        };
        assert_eq!(
            err.to_string(),
            "Signal of 10 samples is shorter than the segment length 16."
        );
    }
}
