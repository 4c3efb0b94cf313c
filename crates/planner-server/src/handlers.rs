//! HTTP Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use travel_planner::PlanRequest;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// `{success, data | error, code}`
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub code: u16,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: StatusCode::OK.as_u16(),
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Envelope::<()> {
        success: false,
        data: None,
        error: Some(message.into()),
        code: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: Vec<String>,
    pub weather: String,
    pub trains: String,
}

#[derive(Serialize)]
pub struct WeatherData {
    pub city: String,
    pub days: u32,
    pub weather: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrainQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

const DEFAULT_CITY: &str = "北京";
const DEFAULT_DAYS: u32 = 3;

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        providers: state.providers.as_ref().clone(),
        weather: state.weather.name().to_string(),
        trains: state.trains.name().to_string(),
    })
}

/// Synthesize a travel plan
pub async fn plan_handler(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return failure(
                StatusCode::BAD_REQUEST,
                format!("Missing or invalid parameters: {}", rejection.body_text()),
            );
        }
    };

    if let Err(e) = request.validate() {
        return failure(StatusCode::BAD_REQUEST, e.to_string());
    }

    match state.planner.plan(&request).await {
        Ok(plan) => Json(Envelope::ok(plan)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Plan synthesis failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
        }
    }
}

/// Forecast for a city
pub async fn weather_handler(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Response {
    let Ok(Query(query)) = query else {
        return failure(StatusCode::BAD_REQUEST, "days must be a positive integer");
    };

    let city = query
        .city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CITY.into());
    let days = query.days.unwrap_or(DEFAULT_DAYS);
    let weather = state.weather.forecast(&city, days).await;

    Json(Envelope::ok(WeatherData { city, days, weather })).into_response()
}

/// Train tickets between two cities
pub async fn train_tickets_handler(
    State(state): State<AppState>,
    Query(query): Query<TrainQuery>,
) -> Response {
    let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(start), Some(end), Some(date)) = (present(query.start), present(query.end), present(query.date)) else {
        return failure(StatusCode::BAD_REQUEST, "start, end and date are required");
    };

    let Ok(date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        return failure(StatusCode::BAD_REQUEST, format!("date '{}' is not in YYYY-MM-DD format", date));
    };

    let lookup = state.trains.lookup(&start, &end, date).await;
    if !lookup.success {
        tracing::warn!(%start, %end, error = ?lookup.error, "Train lookup failed");
    }
    Json(lookup).into_response()
}
