//! Route table of the query surface.
//!
//! - `GET /` and `GET /health`
//! - `GET /anime/mal/...` MyAnimeList listings and detail pages
//! - `GET /weather/{source}/{country}/{location}`
//! - `GET /books/libgen/...` book search and mirror links
//! - `GET /phones/gsmarena...` device listings and spec sheets
//! - `GET /hero/...` hero wiki index, details and search

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use serde_json::{Value, json};

use super::AppState;

pub mod anime;
pub mod books;
pub mod heroes;
pub mod phones;
pub mod weather;

pub fn create_router() -> Router<AppState> {
    let anime = Router::new()
        .route("/season", get(anime::season))
        .route("/schedule", get(anime::schedule))
        .route("/search", get(anime::search))
        .route("/details", get(anime::details))
        .route("/character", get(anime::character))
        .route("/person", get(anime::person))
        .route("/{list}", get(anime::ranking));

    let books = Router::new()
        .route("/{bookname}", get(books::search))
        .route("/download/{source}/{download_id}", get(books::download));

    let phones = Router::new()
        .route("/top", get(phones::top))
        .route("/{query}", get(phones::search));

    let heroes = Router::new()
        .route("/heroes", get(heroes::index))
        .route("/details", get(heroes::details))
        .route("/search", get(heroes::search));

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .nest("/anime/mal", anime)
        .route("/weather/{source}/{country}/{location}", get(weather::current))
        .nest("/books/libgen", books)
        .route("/phones/gsmarena", get(phones::details))
        .nest("/phones/gsmarena", phones)
        .nest("/hero", heroes)
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Infinite API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
