use axum::response::Json;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::irristrat::types::{Observation, Station};
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Station data gateway",
        description = "Cached proxy for irristrat weather-station observations"
    ),
    paths(
        routes::health,
        routes::list_stations,
        routes::get_daily,
        routes::get_hourly,
        routes::get_ten_minute
    ),
    components(schemas(Observation, Station, ErrorResponse, routes::HealthResponse)),
    tags(
        (name = "stations", description = "Station observations proxied from irristrat"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
