// =============================================================================
// Shared types used across the stock insight backend
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorResult;
use crate::prediction::PredictionResult;
use crate::series::PricePoint;

fn default_currency() -> String {
    "KRW".to_string()
}

// =============================================================================
// Stocks
// =============================================================================

/// Request body for creating or replacing a stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCreate {
    /// Ticker, e.g. `005930.KS`. Unique across stocks.
    pub symbol: String,
    pub name: String,
    /// Listing market (KOSPI, KOSDAQ, NASDAQ, ...).
    pub market: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub market: String,
    pub sector: Option<String>,
    pub currency: String,
}

// =============================================================================
// Prices
// =============================================================================

/// Request body for recording one daily bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCreate {
    pub stock_id: i64,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: i64,
    pub stock_id: i64,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl From<Price> for PricePoint {
    fn from(p: Price) -> Self {
        PricePoint {
            date: p.date,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
        }
    }
}

// =============================================================================
// Computed summaries
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub stock_id: i64,
    /// Number of bars actually used.
    pub days: usize,
    pub latest_date: Option<NaiveDate>,
    pub latest_close: Option<f64>,
    pub ma_5: Option<f64>,
    pub ma_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub momentum_3d: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub stock_id: i64,
    pub horizon_days: usize,
    pub latest_date: Option<NaiveDate>,
    pub latest_close: Option<f64>,
    pub prob_up: f64,
    /// Percent, e.g. 3.5 == +3.5%.
    pub expected_return: f64,
    pub model_version: String,
}

impl PredictionSummary {
    pub fn new(stock_id: i64, prediction: PredictionResult) -> Self {
        Self {
            stock_id,
            horizon_days: prediction.horizon_days,
            latest_date: Some(prediction.latest_date),
            latest_close: Some(prediction.latest_close),
            prob_up: prediction.prob_up,
            expected_return: prediction.expected_return,
            model_version: prediction.model_version.to_string(),
        }
    }
}

/// Stock metadata, latest price, indicators and prediction in one payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockFullSummary {
    pub stock_id: i64,
    pub symbol: String,
    pub name: String,
    pub market: String,
    pub sector: Option<String>,
    pub currency: String,

    pub latest_date: Option<NaiveDate>,
    pub latest_close: Option<f64>,

    pub ma_5: Option<f64>,
    pub ma_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub momentum_3d: Option<f64>,

    pub horizon_days: usize,
    pub prob_up: f64,
    pub expected_return: f64,
    pub model_version: String,
}

impl StockFullSummary {
    pub fn new(stock: Stock, indicators: IndicatorResult, prediction: PredictionResult) -> Self {
        Self {
            stock_id: stock.id,
            symbol: stock.symbol,
            name: stock.name,
            market: stock.market,
            sector: stock.sector,
            currency: stock.currency,
            latest_date: Some(prediction.latest_date),
            latest_close: Some(prediction.latest_close),
            ma_5: indicators.ma_5,
            ma_20: indicators.ma_20,
            rsi_14: indicators.rsi_14,
            momentum_3d: indicators.momentum_3d,
            horizon_days: prediction.horizon_days,
            prob_up: prediction.prob_up,
            expected_return: prediction.expected_return,
            model_version: prediction.model_version.to_string(),
        }
    }
}
