//! HTTP surface of the Comfycast server.
//!
//! Three endpoints: a liveness message at `/`, the six-day forecast at
//! `/weather/forecast`, and the per-person comfort evaluation at
//! `/weather/comfort`. Only caller mistakes map to 4xx responses; upstream
//! weather trouble has already degraded to empty data further down.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Local, NaiveDate};
use comfycast_comfort::{ComfortResult, Sex};
use comfycast_core::{CacheError, ComfortError};
use comfycast_weather::{DailyWeatherRecord, WeatherService};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state handed to every handler.
pub struct AppContext {
    pub service: WeatherService,
}

/// Build the application router.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/weather/forecast", get(handle_forecast))
        .route("/weather/comfort", get(handle_comfort))
        .with_state(context)
}

/// Error shape returned to clients: a status code plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        let status = match e {
            CacheError::DayNotCached { .. } => StatusCode::NOT_FOUND,
            CacheError::Storage(_) => {
                tracing::error!("Cache storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            detail: e.user_message(),
        }
    }
}

impl From<ComfortError> for ApiError {
    fn from(e: ComfortError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: e.user_message(),
        }
    }
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Comfycast is running. Try /weather/forecast?city=Kyiv"
    }))
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    city: String,
}

async fn handle_forecast(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Vec<DailyWeatherRecord>>, ApiError> {
    tracing::info!("Forecast request: city={}", query.city);
    let records = context.service.forecast(&query.city).await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
struct ComfortQuery {
    age: f64,
    weight: f64,
    height: f64,
    sex: String,
    city: String,
    ts: Option<i64>,
}

async fn handle_comfort(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<ComfortQuery>,
) -> Result<Json<ComfortResult>, ApiError> {
    let sex: Sex = query.sex.parse().map_err(ApiError::from)?;
    let date = resolve_date(query.ts);
    tracing::info!(
        "Comfort request: city={} date={} age={} height={} weight={}",
        query.city,
        date,
        query.age,
        query.height,
        query.weight
    );

    let result = context.service.comfort(
        &query.city,
        date,
        query.age,
        query.height,
        query.weight,
        sex,
    )?;
    Ok(Json(result))
}

/// Resolve the optional `ts` query parameter to a local calendar date.
///
/// Accepts epoch seconds or milliseconds, detected by magnitude. Absent,
/// zero, or out-of-range timestamps fall back to today.
fn resolve_date(ts: Option<i64>) -> NaiveDate {
    match ts {
        Some(raw) if raw != 0 => {
            let seconds = if raw > 1_000_000_000_000 { raw / 1000 } else { raw };
            DateTime::from_timestamp(seconds, 0)
                .map(|moment| moment.with_timezone(&Local).date_naive())
                .unwrap_or_else(|| Local::now().date_naive())
        }
        _ => Local::now().date_naive(),
    }
}
