// =============================================================================
// Indicator Snapshot — the fixed indicator set reported per stock
// =============================================================================

use serde::Serialize;

use crate::indicators::{calculate_momentum, calculate_rsi, calculate_sma};
use crate::series::PriceSeries;

pub const SHORT_MA_WINDOW: usize = 5;
pub const LONG_MA_WINDOW: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const MOMENTUM_PERIOD: usize = 3;

/// Latest values of the standard indicators. A field is `None` when the
/// series is too short (or degenerate) for that computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub ma_5: Option<f64>,
    pub ma_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub momentum_3d: Option<f64>,
}

impl IndicatorResult {
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        Self {
            ma_5: calculate_sma(&closes, SHORT_MA_WINDOW),
            ma_20: calculate_sma(&closes, LONG_MA_WINDOW),
            rsi_14: calculate_rsi(&closes, RSI_PERIOD),
            momentum_3d: calculate_momentum(&closes, MOMENTUM_PERIOD),
        }
    }
}
