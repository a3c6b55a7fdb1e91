// =============================================================================
// Price Series — chronologically ordered OHLCV bars for one stock
// =============================================================================
//
// Every indicator and prediction entry point consumes a `PriceSeries` rather
// than a raw slice, so oldest-first ordering is checked once at construction
// instead of being a silent caller convention.
//
// The store naturally returns "most recent N" rows newest-first; those go
// through `PriceSeries::from_newest_first`, which reverses before validating.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading session's bar for a single stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series is not oldest-first: {current} at index {index} follows {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// Oldest-first run of price points. Dates never decrease.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points that are already oldest-first.
    pub fn from_chronological(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].date < pair[0].date {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from a newest-first query result.
    pub fn from_newest_first(mut points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        points.reverse();
        Self::from_chronological(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The trailing `count` points as a new series. Ordering is inherited.
    pub fn tail(&self, count: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(count);
        PriceSeries {
            points: self.points[start..].to_vec(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::series_from_closes;
    use super::*;

    fn point(y: i32, m: u32, d: u32, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Some(1_000.0),
        }
    }

    #[test]
    fn chronological_input_is_accepted() {
        let series = PriceSeries::from_chronological(vec![
            point(2024, 3, 1, 10.0),
            point(2024, 3, 4, 11.0),
            point(2024, 3, 5, 12.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.latest().unwrap().close, 12.0);
    }

    #[test]
    fn out_of_order_input_is_rejected() {
        let err = PriceSeries::from_chronological(vec![
            point(2024, 3, 5, 12.0),
            point(2024, 3, 4, 11.0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SeriesError::OutOfOrder {
                index: 1,
                previous: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                current: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            }
        );
    }

    #[test]
    fn newest_first_input_is_reversed() {
        let series = PriceSeries::from_newest_first(vec![
            point(2024, 3, 5, 12.0),
            point(2024, 3, 4, 11.0),
            point(2024, 3, 1, 10.0),
        ])
        .unwrap();
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn newest_first_rejects_oldest_first_input() {
        // Passing an already-ascending run through the newest-first door
        // flips it into descending order.
        assert!(PriceSeries::from_newest_first(vec![
            point(2024, 3, 1, 10.0),
            point(2024, 3, 4, 11.0),
        ])
        .is_err());
    }

    #[test]
    fn empty_series_has_no_latest() {
        let series = PriceSeries::from_chronological(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.latest().is_none());
    }

    #[test]
    fn tail_keeps_most_recent_points() {
        let series = series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(series.tail(2).closes(), vec![4.0, 5.0]);
        assert_eq!(series.tail(10).len(), 5);
        assert!(series.tail(0).is_empty());
    }
}
