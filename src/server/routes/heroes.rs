use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::server::AppState;
use crate::server::error::Result;
use crate::sources::heroes::{HeroDetail, HeroListing};

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    start: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    heroid: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: String,
}

/// GET /hero/heroes?start=
pub async fn index(
    State(state): State<AppState>,
    params: std::result::Result<Query<IndexParams>, QueryRejection>,
) -> Result<Json<HeroListing>> {
    let Query(IndexParams { start }) = params?;
    Ok(Json(state.sources.heroes.index(&start).await?))
}

/// GET /hero/details?heroid=
pub async fn details(
    State(state): State<AppState>,
    params: std::result::Result<Query<DetailParams>, QueryRejection>,
) -> Result<Json<HeroDetail>> {
    let Query(DetailParams { heroid }) = params?;
    Ok(Json(state.sources.heroes.hero(&heroid).await?))
}

/// GET /hero/search?query=
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<HeroListing>> {
    let Query(SearchParams { query }) = params?;
    Ok(Json(state.sources.heroes.search(&query).await?))
}
