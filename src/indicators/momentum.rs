// =============================================================================
// Momentum — relative price change over a fixed look-back
// =============================================================================
//
//   momentum = (close_last - close_{last-period}) / close_{last-period}
//
// Expressed as a ratio (0.05 == +5%), not a percentage.

/// Momentum of the latest close against the close `period` bars earlier.
///
/// Returns `None` when:
/// - Fewer than `period + 1` closes are available.
/// - The reference close is exactly zero (degenerate, not an error).
pub fn calculate_momentum(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() <= period {
        return None;
    }

    let base = closes[closes.len() - period - 1];
    let last = closes[closes.len() - 1];

    if base == 0.0 {
        return None;
    }

    Some((last - base) / base)
}
