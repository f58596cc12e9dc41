use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Json;

use crate::server::AppState;
use crate::server::error::Result;
use crate::sources::weather::{WeatherReport, WeatherSource};

/// GET /weather/{source}/{country}/{location}
pub async fn current(
    State(state): State<AppState>,
    path: std::result::Result<Path<(String, String, String)>, PathRejection>,
) -> Result<Json<WeatherReport>> {
    let Path((source, country, location)) = path?;
    let source: WeatherSource = source.parse()?;
    Ok(Json(state.sources.weather.current(source, &country, &location).await?))
}
