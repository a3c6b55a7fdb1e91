// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions over oldest-first closing prices.
// Every public function returns `Option<f64>` so callers are forced to handle
// insufficient-data and degenerate-input cases explicitly.

pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod snapshot;

pub use momentum::calculate_momentum;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use snapshot::IndicatorResult;
