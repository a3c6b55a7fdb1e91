// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean of the most recent `window` values:
//   SMA = (v[n-window] + ... + v[n-1]) / window

/// Mean of the last `window` values.
///
/// Returns `None` when `window == 0` or fewer than `window` values are
/// available.
pub fn calculate_sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }

    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}
