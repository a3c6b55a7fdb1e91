// =============================================================================
// Prediction Engine — rule-based short-horizon up-probability ("dummy_v1")
// =============================================================================
//
// Not a forecasting model. The probability is a fixed blend of three
// adjustments on top of a 50% prior:
//
//   1. recent return over `horizon_days`:  +clamp(return * 2, -0.15, +0.15)
//   2. RSI(14):       < 35 => +0.05,   > 70 => -0.05
//   3. momentum(3):   > 0  => +0.03,   < 0  => -0.03
//
// The sum is clamped to [0.05, 0.95]. Expected return is the recent return
// expressed in percent.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::indicators::snapshot::{MOMENTUM_PERIOD, RSI_PERIOD};
use crate::indicators::{calculate_momentum, calculate_rsi};
use crate::series::PriceSeries;

pub const MODEL_VERSION: &str = "dummy_v1";

const BASE_PROBABILITY: f64 = 0.5;
const RETURN_WEIGHT: f64 = 2.0;
const MAX_RETURN_ADJUSTMENT: f64 = 0.15;
const RSI_OVERSOLD: f64 = 35.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_ADJUSTMENT: f64 = 0.05;
const MOMENTUM_ADJUSTMENT: f64 = 0.03;
const MIN_PROBABILITY: f64 = 0.05;
const MAX_PROBABILITY: f64 = 0.95;

/// Output of [`predict`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub horizon_days: usize,
    pub latest_date: NaiveDate,
    pub latest_close: f64,
    /// Probability of an up move, always within [0.05, 0.95].
    pub prob_up: f64,
    /// Expected return in percent (3.4 == +3.4%).
    pub expected_return: f64,
    pub model_version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error("horizon_days must be at least 1")]
    InvalidHorizon,
    #[error("window_days must be at least 1")]
    InvalidWindow,
    #[error("insufficient price data: need at least {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Run the heuristic over the most recent `window_days` points of `series`.
///
/// Needs at least `horizon_days + 1` points inside the window.
pub fn predict(
    series: &PriceSeries,
    horizon_days: usize,
    window_days: usize,
) -> Result<PredictionResult, PredictionError> {
    if horizon_days == 0 {
        return Err(PredictionError::InvalidHorizon);
    }
    if window_days == 0 {
        return Err(PredictionError::InvalidWindow);
    }

    let window = series.tail(window_days);
    let required = horizon_days.saturating_add(1);
    let latest = match window.latest() {
        Some(latest) if window.len() >= required => latest,
        _ => {
            return Err(PredictionError::InsufficientData {
                required,
                available: window.len(),
            })
        }
    };

    let closes = window.closes();
    let base = closes[closes.len() - required];
    let recent_return = if base <= 0.0 {
        0.0
    } else {
        (latest.close - base) / base
    };

    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let momentum = calculate_momentum(&closes, MOMENTUM_PERIOD);

    Ok(PredictionResult {
        horizon_days,
        latest_date: latest.date,
        latest_close: latest.close,
        prob_up: up_probability(recent_return, rsi, momentum),
        expected_return: recent_return * 100.0,
        model_version: MODEL_VERSION,
    })
}

/// Combine the three signals into a bounded up-probability.
pub fn up_probability(recent_return: f64, rsi: Option<f64>, momentum: Option<f64>) -> f64 {
    let mut prob = BASE_PROBABILITY;

    prob += (recent_return * RETURN_WEIGHT).clamp(-MAX_RETURN_ADJUSTMENT, MAX_RETURN_ADJUSTMENT);

    if let Some(rsi) = rsi {
        if rsi < RSI_OVERSOLD {
            prob += RSI_ADJUSTMENT;
        } else if rsi > RSI_OVERBOUGHT {
            prob -= RSI_ADJUSTMENT;
        }
    }

    if let Some(momentum) = momentum {
        if momentum > 0.0 {
            prob += MOMENTUM_ADJUSTMENT;
        } else if momentum < 0.0 {
            prob -= MOMENTUM_ADJUSTMENT;
        }
    }

    prob.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}
