use crate::config;

/// A span of time counted by the capture timer.
pub type Ticks = fugit::Duration<u64, 1, { config::clk::TIMER_TICK_HZ }>;

/// Convert a tick span to seconds.
pub fn to_secs(ticks: Ticks) -> f64 {
    // u64 -> f64 is exact for any span a capture can produce (< 2^53 ticks)
    #[allow(clippy::cast_precision_loss)]
    let ticks = ticks.ticks() as f64;
    ticks / f64::from(config::clk::TIMER_TICK_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_counter_period_matches_overflow_constant() {
        let period = Ticks::from_ticks(u64::from(config::capture::COUNTER_TICKS));
        assert_eq!(to_secs(period), 0.00262144);
        #[allow(clippy::cast_possible_truncation)]
        let period = to_secs(period) as f32;
        assert!((period - config::capture::OVERFLOW_PERIOD_SECS).abs() <= f32::EPSILON * period);
    }

    #[test]
    fn calibration_ticks_match_calibration() {
        let calibration = Ticks::from_ticks(u64::from(config::speed::CALIBRATION_TICKS));
        assert!((to_secs(calibration) - 0.03).abs() < 1e-12);
    }
}
