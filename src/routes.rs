use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    caching::CachePolicy,
    config::Config,
    docs::openapi_json,
    error::ApiError,
    irristrat::{
        client::{IrristratClient, UpstreamError},
        types::{Granularity, ObservationSet},
    },
    validation::{DateRange, StationId},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub irristrat: Arc<IrristratClient>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyQuery {
    /// First day, `YYYY-MM-DD`. Defaults to seven days before `to`.
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`. Defaults to today in the station timezone.
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

// Route handlers
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/stations",
    tag = "stations",
    responses(
        (status = 200, description = "Known stations", body = [crate::irristrat::types::Station]),
        (status = 500, description = "Irristrat request failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_stations(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.irristrat.stations().await {
        Ok(stations) => Ok(cached_json(CachePolicy::STATIONS, stations)),
        Err(e) => {
            tracing::error!("Failed to fetch station list: {}", e);
            Err(ApiError::upstream(e, &state.config.fallback_messages.stations))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/daily",
    tag = "stations",
    params(("station_id" = String, Path, description = "Station identifier"), DailyQuery),
    responses(
        (status = 200, description = "Daily observations keyed by date", body = std::collections::BTreeMap<String, crate::irristrat::types::Observation>),
        (status = 400, description = "Invalid station identifier or date range", body = crate::error::ErrorResponse),
        (status = 500, description = "Irristrat request failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_daily(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Query(params): Query<DailyQuery>,
) -> Result<Response, ApiError> {
    let station = parse_station(&station_id)?;

    let today = chrono::Utc::now()
        .with_timezone(&state.config.station_timezone)
        .date_naive();
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref(), today)
        .map_err(|e| {
            tracing::warn!("Rejected daily range for station {}: {}", station, e);
            ApiError::from(e)
        })?;

    let result = state.irristrat.daily(&station, &range).await;
    observations_response(&state, &station, Granularity::Daily, result)
}

#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/hourly",
    tag = "stations",
    params(("station_id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Hourly observations keyed by `YYYY-MM-DD HH:MM`", body = std::collections::BTreeMap<String, crate::irristrat::types::Observation>),
        (status = 400, description = "Invalid station identifier", body = crate::error::ErrorResponse),
        (status = 500, description = "Irristrat request failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_hourly(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Response, ApiError> {
    let station = parse_station(&station_id)?;
    let result = state.irristrat.hourly(&station).await;
    observations_response(&state, &station, Granularity::Hourly, result)
}

#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/10min",
    tag = "stations",
    params(("station_id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "10-minute observations keyed by `YYYY-MM-DD HH:MM`", body = std::collections::BTreeMap<String, crate::irristrat::types::Observation>),
        (status = 400, description = "Invalid station identifier", body = crate::error::ErrorResponse),
        (status = 500, description = "Irristrat request failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_ten_minute(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Response, ApiError> {
    let station = parse_station(&station_id)?;
    let result = state.irristrat.ten_minute(&station).await;
    observations_response(&state, &station, Granularity::TenMinute, result)
}

fn parse_station(raw: &str) -> Result<StationId, ApiError> {
    StationId::parse(raw).map_err(|e| {
        tracing::warn!("Rejected station identifier {:?}: {}", raw, e);
        ApiError::from(e)
    })
}

fn observations_response(
    state: &AppState,
    station: &StationId,
    granularity: Granularity,
    result: Result<ObservationSet, UpstreamError>,
) -> Result<Response, ApiError> {
    match result {
        Ok(set) => Ok(cached_json(CachePolicy::for_granularity(granularity), set)),
        Err(e) => {
            tracing::error!(
                "Failed to fetch {} data for station {}: {}",
                granularity,
                station,
                e
            );
            Err(ApiError::upstream(
                e,
                state.config.fallback_messages.for_granularity(granularity),
            ))
        }
    }
}

fn cached_json<T: Serialize>(policy: CachePolicy, body: T) -> Response {
    (
        [(header::CACHE_CONTROL, policy.header_value())],
        Json(body),
    )
        .into_response()
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/:station_id/daily", get(get_daily))
        .route("/api/stations/:station_id/hourly", get(get_hourly))
        .route("/api/stations/:station_id/10min", get(get_ten_minute))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri()
                )
            }),
        )
        .with_state(state)
}
