// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Stocks, prices, and the computed views (indicators, prediction, summary).
// Handlers only validate, fetch and serialise; every number comes from the
// indicator library and the prediction engine.
//
// CORS is restricted to the origins listed in the service config.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::ApiError;
use crate::app_state::AppState;
use crate::indicators::IndicatorResult;
use crate::prediction::predict;
use crate::types::{
    IndicatorSummary, Price, PriceCreate, PredictionSummary, Stock, StockCreate, StockFullSummary,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        // ── Stocks ──────────────────────────────────────────────────
        .route("/stocks", get(list_stocks).post(create_stock))
        .route(
            "/stocks/:stock_id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        .route("/stocks/:stock_id/summary", get(stock_summary))
        // ── Prices ──────────────────────────────────────────────────
        .route("/prices", post(create_price))
        .route("/prices/by_stock/:stock_id", get(list_prices_for_stock))
        .route("/prices/:price_id", get(get_price))
        // ── Computed views ──────────────────────────────────────────
        .route("/indicators/:stock_id", get(indicators))
        .route("/predict/:stock_id", get(prediction))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        message: "backend server is running",
        uptime_secs: state.uptime_secs(),
    })
}

// =============================================================================
// Stocks
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn create_stock(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<StockCreate>,
) -> ApiResult<Stock> {
    let stock = state.store.create_stock(&req)?;
    info!(id = stock.id, symbol = %stock.symbol, "stock created");
    Ok(Json(stock))
}

async fn list_stocks(
    State(state): State<Arc<AppState>>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Vec<Stock>> {
    let stocks = state.store.list_stocks(
        page.skip.unwrap_or(0),
        page.limit.unwrap_or(state.config.list_limit),
    )?;
    Ok(Json(stocks))
}

async fn get_stock(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
) -> ApiResult<Stock> {
    let stock = find_stock(&state, stock_id)?;
    Ok(Json(stock))
}

async fn update_stock(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
    ApiJson(req): ApiJson<StockCreate>,
) -> ApiResult<Stock> {
    let stock = state
        .store
        .update_stock(stock_id, &req)?
        .ok_or(ApiError::StockNotFound(stock_id))?;
    info!(id = stock.id, symbol = %stock.symbol, "stock updated");
    Ok(Json(stock))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

async fn delete_stock(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
) -> ApiResult<DeleteResponse> {
    if !state.store.delete_stock(stock_id)? {
        return Err(ApiError::StockNotFound(stock_id));
    }
    info!(id = stock_id, "stock deleted");
    Ok(Json(DeleteResponse {
        message: format!("stock {stock_id} deleted"),
    }))
}

// =============================================================================
// Prices
// =============================================================================

async fn create_price(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PriceCreate>,
) -> ApiResult<Price> {
    let price = state.store.create_price(&req)?;
    info!(stock_id = price.stock_id, date = %price.date, "price recorded");
    Ok(Json(price))
}

async fn list_prices_for_stock(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Vec<Price>> {
    let prices = state.store.list_prices_by_stock(
        stock_id,
        page.skip.unwrap_or(0),
        page.limit.unwrap_or(state.config.price_list_limit),
    )?;
    Ok(Json(prices))
}

async fn get_price(
    State(state): State<Arc<AppState>>,
    ApiPath(price_id): ApiPath<i64>,
) -> ApiResult<Price> {
    let price = state
        .store
        .get_price(price_id)?
        .ok_or(ApiError::PriceNotFound(price_id))?;
    Ok(Json(price))
}

// =============================================================================
// Indicators
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct IndicatorQuery {
    days: Option<usize>,
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<IndicatorQuery>,
) -> ApiResult<IndicatorSummary> {
    find_stock(&state, stock_id)?;

    let days = query.days.unwrap_or(state.config.indicator_days);
    let series = state.store.recent_series(stock_id, days)?;
    let latest = series.latest().ok_or(ApiError::NoPriceData(stock_id))?;
    let result = IndicatorResult::compute(&series);

    Ok(Json(IndicatorSummary {
        stock_id,
        days: series.len(),
        latest_date: Some(latest.date),
        latest_close: Some(latest.close),
        ma_5: result.ma_5,
        ma_20: result.ma_20,
        rsi_14: result.rsi_14,
        momentum_3d: result.momentum_3d,
    }))
}

// =============================================================================
// Prediction & summary
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct PredictionQuery {
    horizon_days: Option<usize>,
    window_days: Option<usize>,
}

async fn prediction(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PredictionQuery>,
) -> ApiResult<PredictionSummary> {
    find_stock(&state, stock_id)?;

    let horizon_days = query.horizon_days.unwrap_or(state.config.predict_horizon_days);
    let window_days = query.window_days.unwrap_or(state.config.predict_window_days);

    let series = state.store.recent_series(stock_id, window_days)?;
    let result = predict(&series, horizon_days, window_days)?;
    debug!(
        stock_id,
        horizon_days,
        prob_up = result.prob_up,
        expected_return = result.expected_return,
        "prediction computed"
    );

    Ok(Json(PredictionSummary::new(stock_id, result)))
}

async fn stock_summary(
    State(state): State<Arc<AppState>>,
    ApiPath(stock_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PredictionQuery>,
) -> ApiResult<StockFullSummary> {
    let stock = find_stock(&state, stock_id)?;

    let horizon_days = query.horizon_days.unwrap_or(state.config.predict_horizon_days);
    let window_days = query.window_days.unwrap_or(state.config.summary_window_days);

    let series = state.store.recent_series(stock_id, window_days)?;
    let result = predict(&series, horizon_days, window_days)?;
    let indicators = IndicatorResult::compute(&series);

    Ok(Json(StockFullSummary::new(stock, indicators, result)))
}

// =============================================================================
// Internal helpers
// =============================================================================

fn find_stock(state: &AppState, stock_id: i64) -> Result<Stock, ApiError> {
    state
        .store
        .get_stock(stock_id)?
        .ok_or(ApiError::StockNotFound(stock_id))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServiceConfig;
    use crate::store::Store;

    const SAMPLE: [f64; 15] = [
        100.0, 102.0, 101.0, 103.0, 105.0, 107.0, 106.0, 108.0, 110.0, 111.0, 113.0, 112.0,
        114.0, 116.0, 118.0,
    ];

    fn test_app() -> Router {
        let store = Store::open_in_memory().unwrap();
        router(Arc::new(AppState::new(ServiceConfig::default(), store)))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn seed_stock(app: &Router, closes: &[f64]) -> i64 {
        let (status, stock) = call(
            app,
            "POST",
            "/stocks",
            Some(json!({ "symbol": "005930.KS", "name": "Samsung", "market": "KOSPI" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = stock["id"].as_i64().unwrap();

        for (i, close) in closes.iter().enumerate() {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(i as i64);
            let (status, _) = call(
                app,
                "POST",
                "/prices",
                Some(json!({
                    "stock_id": id, "date": date, "open": close, "high": close,
                    "low": close, "close": close, "volume": 1000.0
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        id
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app();
        let (status, body) = call(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn stock_crud_lifecycle() {
        let app = test_app();
        let id = seed_stock(&app, &[]).await;

        let (status, body) = call(&app, "GET", &format!("/stocks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "KRW");

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/stocks/{id}"),
            Some(json!({ "symbol": "005930.KS", "name": "Samsung Electronics",
                         "market": "KOSPI", "sector": "IT" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sector"], "IT");

        let (status, body) = call(&app, "GET", "/stocks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = call(&app, "DELETE", &format!("/stocks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", &format!("/stocks/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "STOCK_NOT_FOUND");
    }

    #[tokio::test]
    async fn duplicate_symbol_is_bad_request() {
        let app = test_app();
        seed_stock(&app, &[]).await;
        let (status, body) = call(
            &app,
            "POST",
            "/stocks",
            Some(json!({ "symbol": "005930.KS", "name": "Other", "market": "KOSPI" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "DUPLICATE_SYMBOL");
    }

    #[tokio::test]
    async fn price_for_unknown_stock_is_bad_request() {
        let app = test_app();
        let (status, body) = call(
            &app,
            "POST",
            "/prices",
            Some(json!({ "stock_id": 9, "date": "2024-01-02", "open": 1.0,
                         "high": 1.0, "low": 1.0, "close": 1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_STOCK");
    }

    #[tokio::test]
    async fn prices_are_listed_newest_first() {
        let app = test_app();
        let id = seed_stock(&app, &[1.0, 2.0, 3.0]).await;

        let (status, body) = call(&app, "GET", &format!("/prices/by_stock/{id}?limit=2"), None).await;
        assert_eq!(status, StatusCode::OK);
        let closes: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["close"].as_f64().unwrap())
            .collect();
        assert_eq!(closes, vec![3.0, 2.0]);

        let price_id = body[0]["id"].as_i64().unwrap();
        let (status, body) = call(&app, "GET", &format!("/prices/{price_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2024-01-03");

        let (status, _) = call(&app, "GET", "/prices/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn indicators_for_sample_series() {
        let app = test_app();
        let id = seed_stock(&app, &SAMPLE).await;

        let (status, body) = call(&app, "GET", &format!("/indicators/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], 15);
        assert_eq!(body["latest_close"], 118.0);
        assert_eq!(body["latest_date"], "2024-01-15");
        assert!(body["ma_20"].is_null());
        assert!((body["ma_5"].as_f64().unwrap() - 114.6).abs() < 1e-9);
        assert!((body["rsi_14"].as_f64().unwrap() - 87.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn indicators_without_prices_is_not_found() {
        let app = test_app();
        let id = seed_stock(&app, &[]).await;
        let (status, body) = call(&app, "GET", &format!("/indicators/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NO_PRICE_DATA");
    }

    #[tokio::test]
    async fn prediction_and_summary_agree() {
        let app = test_app();
        let id = seed_stock(&app, &SAMPLE).await;

        let (status, predicted) = call(&app, "GET", &format!("/predict/{id}?horizon_days=3"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(predicted["model_version"], "dummy_v1");
        let recent = (118.0 - 112.0) / 112.0;
        let expected = 0.5 + recent * 2.0 - 0.05 + 0.03;
        assert!((predicted["prob_up"].as_f64().unwrap() - expected).abs() < 1e-12);

        let (status, summary) = call(&app, "GET", &format!("/stocks/{id}/summary"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["symbol"], "005930.KS");
        assert_eq!(summary["prob_up"], predicted["prob_up"]);
        assert_eq!(summary["expected_return"], predicted["expected_return"]);
        assert_eq!(summary["horizon_days"], 3);
    }

    #[tokio::test]
    async fn prediction_rejects_bad_input() {
        let app = test_app();
        let id = seed_stock(&app, &[100.0, 101.0]).await;

        let (status, body) = call(&app, "GET", &format!("/predict/{id}?horizon_days=0"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAMETER");

        let (status, body) = call(&app, "GET", &format!("/predict/{id}?horizon_days=3"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_DATA");

        let (status, _) = call(&app, "GET", "/predict/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn huge_horizon_is_insufficient_data() {
        let app = test_app();
        let id = seed_stock(&app, &[100.0, 101.0, 102.0]).await;

        let uri = format!("/predict/{id}?horizon_days={}", usize::MAX);
        let (status, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_DATA");

        let uri = format!("/stocks/{id}/summary?horizon_days={}", usize::MAX);
        let (status, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = test_app();
        let id = seed_stock(&app, &[100.0, 101.0]).await;

        let (status, body) = call(&app, "GET", &format!("/predict/{id}?horizon_days=-1"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(body["error"].is_string());

        let (status, body) = call(&app, "GET", "/stocks/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");

        let (status, body) = call(&app, "POST", "/stocks", Some(json!({ "symbol": "X" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }
}
