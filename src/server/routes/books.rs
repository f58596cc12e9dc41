use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Json;

use crate::server::AppState;
use crate::server::error::Result;
use crate::sources::libgen::{BookListing, DownloadLink, Mirror};

/// GET /books/libgen/{bookname}
pub async fn search(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<BookListing>> {
    let Path(bookname) = path?;
    Ok(Json(state.sources.libgen.search(&bookname).await?))
}

/// GET /books/libgen/download/{source}/{download_id}
pub async fn download(
    State(state): State<AppState>,
    path: std::result::Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<DownloadLink>> {
    let Path((source, download_id)) = path?;
    let mirror: Mirror = source.parse()?;
    Ok(Json(state.sources.libgen.download_link(mirror, &download_id).await?))
}
