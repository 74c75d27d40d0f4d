use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
///
/// All caller contract checks that do not depend on the data itself happen in
/// [`KernelLifecycle::try_new`]; a constructed kernel is immutable and can be
/// shared across threads and reused for any number of runs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Validate a detrending order in the supported `-1..=10` range.
///
/// Returns the number of polynomial coefficients, `order + 1`.
pub(crate) fn check_order(order: i32) -> Result<usize, ConfigError> {
    if !(-1..=10).contains(&order) {
        return Err(ConfigError::OrderOutOfRange { order });
    }
    Ok((order + 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::{check_order, ConfigError};

    #[test]
    fn order_range_is_inclusive() {
        assert_eq!(check_order(-1), Ok(0));
        assert_eq!(check_order(0), Ok(1));
        assert_eq!(check_order(10), Ok(11));
    }

    #[test]
    fn order_outside_range_is_rejected() {
        assert_eq!(
            check_order(-2),
            Err(ConfigError::OrderOutOfRange { order: -2 })
        );
        assert_eq!(
            check_order(11),
            Err(ConfigError::OrderOutOfRange { order: 11 })
        );
    }
}
