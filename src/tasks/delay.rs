//! # Composite delays for timers and intervals.
//!
//! [`Delay`] sums days, hours, minutes and (fractional) seconds into one
//! [`Duration`]. Negative totals clamp to zero; totals beyond `Duration::MAX`
//! saturate.

use std::time::Duration;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Delay expressed in calendar-ish units.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use taskloop::Delay;
///
/// let d = Delay::new().hours(1).minutes(30).seconds(0.5);
/// assert_eq!(d.as_duration(), Duration::from_millis(5_400_500));
///
/// // seconds may be negative as long as the total is not
/// assert_eq!(Delay::new().minutes(1).seconds(-30.0).as_duration(), Duration::from_secs(30));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Delay {
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: f64,
}

impl Delay {
    /// Zero delay.
    pub const fn new() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0.0,
        }
    }

    pub const fn days(mut self, days: u64) -> Self {
        self.days = days;
        self
    }

    pub const fn hours(mut self, hours: u64) -> Self {
        self.hours = hours;
        self
    }

    pub const fn minutes(mut self, minutes: u64) -> Self {
        self.minutes = minutes;
        self
    }

    pub const fn seconds(mut self, seconds: f64) -> Self {
        self.seconds = seconds;
        self
    }

    /// Total delay as a single [`Duration`].
    pub fn as_duration(&self) -> Duration {
        let whole = self
            .days
            .saturating_mul(SECS_PER_DAY)
            .saturating_add(self.hours.saturating_mul(SECS_PER_HOUR))
            .saturating_add(self.minutes.saturating_mul(SECS_PER_MINUTE));
        let total = whole as f64 + self.seconds;

        if total.is_nan() || total <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(total).unwrap_or(Duration::MAX)
    }
}

impl From<Delay> for Duration {
    fn from(delay: Delay) -> Self {
        delay.as_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_are_summed() {
        let d = Delay::new().days(1).hours(2).minutes(3).seconds(4.0);
        assert_eq!(d.as_duration(), Duration::from_secs(86_400 + 7_200 + 180 + 4));
    }

    #[test]
    fn test_zero_by_default() {
        assert_eq!(Delay::default().as_duration(), Duration::ZERO);
        assert_eq!(Delay::new(), Delay::default());
    }

    #[test]
    fn test_negative_total_clamps_to_zero() {
        assert_eq!(Delay::new().seconds(-5.0).as_duration(), Duration::ZERO);
        assert_eq!(Delay::new().seconds(f64::NAN).as_duration(), Duration::ZERO);
    }

    #[test]
    fn test_huge_values_saturate() {
        assert_eq!(Delay::new().days(u64::MAX).as_duration(), Duration::MAX);
        assert_eq!(Delay::new().seconds(f64::INFINITY).as_duration(), Duration::MAX);
    }
}
