use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::server::AppState;
use crate::server::error::Result;
use crate::sources::gsmarena::{PhoneDetails, PhoneListing};

#[derive(Debug, Deserialize)]
pub struct PhoneParams {
    id: String,
}

/// GET /phones/gsmarena/top
pub async fn top(State(state): State<AppState>) -> Result<Json<PhoneListing>> {
    Ok(Json(state.sources.gsmarena.top().await?))
}

/// GET /phones/gsmarena/{query}
pub async fn search(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<PhoneListing>> {
    let Path(query) = path?;
    Ok(Json(state.sources.gsmarena.search(&query).await?))
}

/// GET /phones/gsmarena?id=
pub async fn details(
    State(state): State<AppState>,
    params: std::result::Result<Query<PhoneParams>, QueryRejection>,
) -> Result<Json<PhoneDetails>> {
    let Query(PhoneParams { id }) = params?;
    Ok(Json(state.sources.gsmarena.phone(&id).await?))
}
