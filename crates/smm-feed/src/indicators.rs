//! Indicator maths over close series.
//!
//! Values are `f64`: indicators feed a spread multiplier and a threshold
//! comparison, never an order price directly.

/// Relative strength index at every position of `closes`.
///
/// Gains and losses of the close-to-close diffs are each smoothed with an
/// adjusted exponentially-weighted mean (`alpha = 1 / length`), emitting a
/// value once `length` diffs have been observed. A window with neither gains
/// nor losses yields 50.
pub fn rsi_series(closes: &[f64], length: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if length == 0 || closes.len() < 2 {
        return out;
    }

    let alpha = 1.0 / length as f64;
    let mut gains = AdjustedEwm::new(alpha);
    let mut losses = AdjustedEwm::new(alpha);

    for i in 1..closes.len() {
        let diff = closes[i] - closes[i - 1];
        let avg_gain = gains.push(diff.max(0.0));
        let avg_loss = losses.push(diff.min(0.0));

        if i >= length {
            out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    out
}

/// RSI of the newest close, or `None` with fewer than `length + 1` closes.
pub fn rsi(closes: &[f64], length: usize) -> Option<f64> {
    rsi_series(closes, length).last().copied().flatten()
}

/// Sample standard deviation (ddof = 1) of the trailing `length` values.
pub fn rolling_std(values: &[f64], length: usize) -> Option<f64> {
    if length < 2 || values.len() < length {
        return None;
    }
    sample_std(&values[values.len() - length..])
}

/// Rolling sample standard deviation at every position of `values`.
pub fn rolling_std_series(values: &[f64], length: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| rolling_std(&values[..=i], length))
        .collect()
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

// === Private helpers ===

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let denom = avg_gain + avg_loss.abs();
    if denom == 0.0 {
        return 50.0;
    }
    100.0 * avg_gain / denom
}

/// Running adjusted EWM: weights `(1 - alpha)^k` normalised over all
/// observations seen so far.
struct AdjustedEwm {
    decay: f64,
    weighted: Option<f64>,
    old_wt: f64,
}

impl AdjustedEwm {
    fn new(alpha: f64) -> Self {
        Self {
            decay: 1.0 - alpha,
            weighted: None,
            old_wt: 1.0,
        }
    }

    fn push(&mut self, cur: f64) -> f64 {
        let next = match self.weighted {
            None => cur,
            Some(prev) => {
                self.old_wt *= self.decay;
                let next = if prev == cur {
                    prev
                } else {
                    (self.old_wt * prev + cur) / (self.old_wt + 1.0)
                };
                self.old_wt += 1.0;
                next
            }
        };
        self.weighted = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rsi_needs_length_plus_one_closes() {
        let closes: Vec<f64> = (1..=14).map(f64::from).collect();
        assert!(rsi(&closes, 14).is_none());

        let closes: Vec<f64> = (1..=15).map(f64::from).collect();
        assert!(rsi(&closes, 14).is_some());
    }

    #[test]
    fn test_rsi_short_length_known_value() {
        // gains [1, 0], losses [0, -1] smoothed with alpha 0.5:
        // gain = (0.5 * 1 + 0) / 1.5, loss = -1 / 1.5
        let value = rsi(&[1.0, 2.0, 1.0], 2).unwrap();
        assert!(approx(value, 100.0 / 3.0));
    }

    #[test]
    fn test_rsi_monotonic_up_is_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!(approx(rsi(&closes, 14).unwrap(), 100.0));
    }

    #[test]
    fn test_rsi_monotonic_down_is_0() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        assert!(approx(rsi(&closes, 14).unwrap(), 0.0));
    }

    #[test]
    fn test_rsi_flat_market_is_50() {
        let closes = vec![2000.0; 20];
        assert_eq!(rsi(&closes, 14), Some(50.0));
    }

    #[test]
    fn test_rsi_in_range() {
        let closes: Vec<f64> = (0..50)
            .map(|i| 2000.0 + ((i * 7) % 11) as f64 - 5.0)
            .collect();
        for value in rsi_series(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_series_alignment() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = rsi_series(&closes, 14);
        assert_eq!(series.len(), 20);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn test_sample_std_known_value() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!(approx(sample_std(&values).unwrap(), 3.0276503540974917));
    }

    #[test]
    fn test_rolling_std_uses_trailing_window() {
        let mut values = vec![1000.0; 5];
        values.extend((1..=10).map(f64::from));
        assert!(approx(rolling_std(&values, 10).unwrap(), 3.0276503540974917));
        assert!(rolling_std(&values[..9], 10).is_none());
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        assert_eq!(rolling_std(&[5.0; 10], 10), Some(0.0));
    }
}
