//! Trend-based quote suppression.

use crate::config::MakerConfig;

/// True when the trend signal is strictly outside `[trend_lower, trend_upper]`.
pub fn should_suppress(trend_signal: f64, config: &MakerConfig) -> bool {
    trend_signal > config.trend_upper || trend_signal < config.trend_lower
}
