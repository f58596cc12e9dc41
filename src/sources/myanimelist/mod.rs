//! MyAnimeList: ranking tables, seasonal lists, search and detail pages.

mod anime;
mod character;
pub mod models;
mod person;
mod ranking;
mod search;
mod seasonal;

use chrono::Local;
use tracing::info;

pub use anime::parse_anime;
pub use character::parse_character;
pub use person::{parse_about, parse_person};
pub use ranking::{RankingList, parse_ranking};
pub use search::parse_search;
pub use seasonal::{SCHEDULE_KEYS, SEASON_KEYS, Season, parse_seasonal};

use self::models::{
    AnimeDetails, CharacterDetails, PersonDetails, RankingPage, SearchPage, SeasonalListing,
};
use crate::error::{Result, ScrapeError};
use crate::extract::{SearchQuery, Taxonomy};
use crate::fetch::Fetcher;

/// Fetches MyAnimeList pages and assembles them into records.
#[derive(Clone)]
pub struct MyAnimeList {
    fetcher: Fetcher,
    base: String,
    taxonomy: Taxonomy,
}

impl MyAnimeList {
    pub fn new(fetcher: Fetcher, base: impl Into<String>) -> Self {
        Self {
            fetcher,
            base: base.into(),
            taxonomy: Taxonomy::myanimelist(),
        }
    }

    pub async fn ranking(&self, list: RankingList, page: u32) -> Result<RankingPage> {
        let total_pages = list.total_pages();
        if !(1..=total_pages).contains(&page) {
            return Err(ScrapeError::invalid(format!(
                "Page must be between 1 and {total_pages} for {}",
                list.slug()
            )));
        }
        info!(list = list.slug(), page, "Scraping ranking list");
        let html = self.fetcher.fetch(&list.url(&self.base, page)).await?;
        Ok(parse_ranking(&html, page, total_pages))
    }

    /// Season listing; the current season when `year` or `season` is absent.
    pub async fn season(&self, year: Option<i32>, season: Option<Season>) -> Result<SeasonalListing> {
        let (season, year) = match (season, year) {
            (Some(season), Some(year)) => (season, year),
            _ => Season::containing(Local::now().date_naive()),
        };
        info!(year, %season, "Scraping anime season");
        let url = format!("{}/anime/season/{year}/{season}", self.base);
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_seasonal(&html, SEASON_KEYS, year, season, &self.taxonomy))
    }

    pub async fn schedule(&self) -> Result<SeasonalListing> {
        let (season, year) = Season::containing(Local::now().date_naive());
        info!("Scraping anime schedule");
        let url = format!("{}/anime/season/schedule", self.base);
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_seasonal(&html, SCHEDULE_KEYS, year, season, &self.taxonomy))
    }

    /// Caller errors in `query` are reported before anything is fetched.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let params = self.taxonomy.map_query(query)?;
        let page = query.page.max(1);
        info!(q = %query.q, page, "Searching anime");
        let url = format!("{}/anime.php?{}", self.base, params.encode());
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_search(&html, page))
    }

    pub async fn anime(&self, id: u32) -> Result<AnimeDetails> {
        info!(id, "Scraping anime details");
        let html = self.fetcher.fetch(&format!("{}/anime/{id}", self.base)).await?;
        parse_anime(&html, &self.base)
    }

    pub async fn character(&self, id: u32) -> Result<CharacterDetails> {
        info!(id, "Scraping character details");
        let html = self.fetcher.fetch(&format!("{}/character/{id}", self.base)).await?;
        parse_character(&html, &self.base)
    }

    pub async fn person(&self, id: u32) -> Result<PersonDetails> {
        info!(id, "Scraping person details");
        let html = self.fetcher.fetch(&format!("{}/people/{id}", self.base)).await?;
        parse_person(&html, &self.base)
    }
}
