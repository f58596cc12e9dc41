//! MyAnimeList endpoints under `/anime/mal`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::extract::SearchQuery;
use crate::server::AppState;
use crate::server::error::Result;
use crate::sources::myanimelist::models::{
    AnimeDetails, CharacterDetails, PersonDetails, RankingPage, SearchPage, SeasonalListing,
};
use crate::sources::myanimelist::{RankingList, Season};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonParams {
    y: Option<i32>,
    s: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdParams {
    id: u32,
}

/// `genre` is a comma-separated list of genre names.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: String,
    page: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    score: Option<u8>,
    status: Option<String>,
    genre: Option<String>,
    adult: Option<bool>,
    demographic: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        SearchQuery {
            q: params.q,
            page: params.page.unwrap_or(1),
            kind: params.kind,
            score: params.score,
            status: params.status,
            genres: params
                .genre
                .map(|genres| {
                    genres
                        .split(',')
                        .map(str::trim)
                        .filter(|genre| !genre.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            demographic: params.demographic,
            adult: params.adult,
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

/// GET /anime/mal/{list}
pub async fn ranking(
    State(state): State<AppState>,
    Path(list): Path<String>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<RankingPage>> {
    let Query(params) = params?;
    let list: RankingList = list.parse()?;
    let page = state.sources.myanimelist.ranking(list, params.page.unwrap_or(1)).await?;
    Ok(Json(page))
}

/// GET /anime/mal/season
pub async fn season(
    State(state): State<AppState>,
    params: std::result::Result<Query<SeasonParams>, QueryRejection>,
) -> Result<Json<SeasonalListing>> {
    let Query(params) = params?;
    let season = params.s.as_deref().map(str::parse::<Season>).transpose()?;
    Ok(Json(state.sources.myanimelist.season(params.y, season).await?))
}

/// GET /anime/mal/schedule
pub async fn schedule(State(state): State<AppState>) -> Result<Json<SeasonalListing>> {
    Ok(Json(state.sources.myanimelist.schedule().await?))
}

/// GET /anime/mal/search
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchPage>> {
    let Query(params) = params?;
    let query = SearchQuery::from(params);
    Ok(Json(state.sources.myanimelist.search(&query).await?))
}

/// GET /anime/mal/details
pub async fn details(
    State(state): State<AppState>,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<AnimeDetails>> {
    let Query(IdParams { id }) = params?;
    Ok(Json(state.sources.myanimelist.anime(id).await?))
}

/// GET /anime/mal/character
pub async fn character(
    State(state): State<AppState>,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<CharacterDetails>> {
    let Query(IdParams { id }) = params?;
    Ok(Json(state.sources.myanimelist.character(id).await?))
}

/// GET /anime/mal/person
pub async fn person(
    State(state): State<AppState>,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<PersonDetails>> {
    let Query(IdParams { id }) = params?;
    Ok(Json(state.sources.myanimelist.person(id).await?))
}
