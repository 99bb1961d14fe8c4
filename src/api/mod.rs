use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::coordinator::CityFetchCoordinator;
use crate::models::{CatalogCity, WeatherSnapshot};

#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<CityFetchCoordinator>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/weather", get(get_weather))
        .with_state(state)
}

async fn get_cities(State(state): State<ApiState>) -> Json<Vec<CatalogCity>> {
    Json(state.coordinator.catalog().cities().to_vec())
}

async fn get_weather(
    State(state): State<ApiState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, (StatusCode, &'static str)> {
    match state.coordinator.fetch_by_name(&query.city).await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "City not found")),
        Err(e) => {
            tracing::error!("Error fetching weather data: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Error fetching weather data"))
        }
    }
}
