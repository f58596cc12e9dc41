use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{SeasonalAnime, SeasonalListing};
use crate::error::ScrapeError;
use crate::extract::reader::{attr, first, first_text, lazy_src, non_empty_text, text};
use crate::extract::taxonomy::Taxonomy;
use crate::extract::text::clean_synopsis;
use crate::extract::{CategoryMap, Chain};
use crate::selector;

pub const SEASON_KEYS: &[&str] = &["TV (New)", "TV (Continuing)", "ONA", "OVA", "Movie", "Special"];

pub const SCHEDULE_KEYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
    "Other",
    "Unknown",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// The season a calendar month falls in.
    pub fn of_month(month: u32) -> Self {
        match month {
            1..=3 => Season::Winter,
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Season and year of `date`.
    pub fn containing(date: NaiveDate) -> (Self, i32) {
        (Season::of_month(date.month()), date.year())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        })
    }
}

impl FromStr for Season {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            _ => Err(ScrapeError::invalid(format!(
                "Invalid season: {s}. Valid seasons are: winter, spring, summer, fall"
            ))),
        }
    }
}

fn seasonal_item(item: ElementRef<'_>, taxonomy: &Taxonomy) -> Option<SeasonalAnime> {
    let link = first(item, selector!("a.link-title"))?;
    let url = attr(link, "href")?;
    let title = first_text(item, selector!("h2.h2_anime_title"))
        .or_else(|| non_empty_text(link))
        .unwrap_or_else(|| "N/A".to_string());

    // the plain `src` is preferred here, unlike the ranking tables
    let image_url = first(item, selector!("img"))
        .and_then(|img| attr(img, "src").or_else(|| lazy_src(img)))
        .unwrap_or_else(|| "N/A".to_string());

    let score = Chain::new()
        .text(selector!(".score"))
        .or("N/A")
        .read(Some(item));

    let genres: Vec<String> = item.select(selector!(".genre a")).map(text).collect();
    let adult = genres.iter().any(|genre| {
        taxonomy
            .explicit_genres()
            .any(|explicit| explicit.name.eq_ignore_ascii_case(genre))
    });

    let synopsis = first(item, selector!(".preline"))
        .map(|el| clean_synopsis(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    Some(SeasonalAnime {
        url,
        title,
        image_url,
        score,
        adult,
        genres,
        synopsis,
    })
}

/// Groups every `div.seasonal-anime` under its list header. Headers outside
/// `keys` are dropped; a list with no header is filed as `Unknown`.
pub fn parse_seasonal(
    html: &str,
    keys: &[&'static str],
    year: i32,
    season: Season,
    taxonomy: &Taxonomy,
) -> SeasonalListing {
    let document = Html::parse_document(html);
    let mut results = CategoryMap::new(keys);

    for list in document.select(selector!("div.seasonal-anime-list")) {
        let category = first_text(list, selector!("div.anime-header"))
            .unwrap_or_else(|| "Unknown".to_string());
        for item in list.select(selector!("div.seasonal-anime")) {
            if let Some(anime) = seasonal_item(item, taxonomy) {
                // every item of a list shares its header
                if !results.insert(&category, anime) {
                    break;
                }
            }
        }
    }

    let total_results = results.total();
    info!(total_results, %season, year, "Parsed seasonal listing");
    SeasonalListing {
        total_results,
        year,
        season: season.to_string(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, genres: &[&str]) -> String {
        let genres: String = genres
            .iter()
            .map(|g| format!(r#"<span class="genre"><a href="/g">{g}</a></span>"#))
            .collect();
        format!(
            r#"<div class="js-anime-category-producer seasonal-anime">
                <div class="title"><a class="link-title" href="https://myanimelist.net/anime/1/{title}">{title}</a>
                    <h2 class="h2_anime_title">{title}</h2></div>
                <div class="genres-inner">{genres}</div>
                <div class="image"><img src="https://cdn.myanimelist.net/images/anime/1.jpg"></div>
                <div class="synopsis"><p class="preline">A story.
                    Continued.

[Written by MAL Rewrite]</p></div>
                <div class="scormem-item score">  8.12 </div>
            </div>"#
        )
    }

    #[test]
    fn test_groups_by_header() {
        let html = format!(
            r#"<div class="seasonal-anime-list"><div class="anime-header">TV (New)</div>{}{}</div>
               <div class="seasonal-anime-list"><div class="anime-header">Movie</div>{}</div>"#,
            item("Alpha", &["Action"]),
            item("Beta", &["Comedy", "Ecchi"]),
            item("Gamma", &["Drama"]),
        );
        let listing = parse_seasonal(&html, SEASON_KEYS, 2024, Season::Spring, &Taxonomy::myanimelist());
        assert_eq!(listing.total_results, 3);
        assert_eq!(listing.season, "spring");

        let new = listing.results.get("TV (New)").unwrap();
        assert_eq!(new.len(), 2);
        assert!(!new[0].adult);
        assert!(new[1].adult);
        assert_eq!(new[1].genres, ["Comedy", "Ecchi"]);
        assert_eq!(new[0].score, "8.12");
        assert!(new[0].synopsis.starts_with("A story."));
        assert!(new[0].synopsis.ends_with("Continued."));
        assert_eq!(listing.results.get("Movie").unwrap()[0].title, "Gamma");
    }

    #[test]
    fn test_unknown_headers_leave_all_keys_empty() {
        let html = format!(
            r#"<div class="seasonal-anime-list"><div class="anime-header">Music</div>{}</div>"#,
            item("Delta", &[])
        );
        let listing = parse_seasonal(&html, SEASON_KEYS, 2024, Season::Fall, &Taxonomy::myanimelist());
        assert_eq!(listing.total_results, 0);
        assert_eq!(listing.results.keys().collect::<Vec<_>>(), SEASON_KEYS);
        assert!(SEASON_KEYS.iter().all(|key| listing.results.get(key).unwrap().is_empty()));
    }

    #[test]
    fn test_headerless_list_is_unknown_day() {
        let html = format!(r#"<div class="seasonal-anime-list">{}</div>"#, item("Epsilon", &[]));
        let listing = parse_seasonal(&html, SCHEDULE_KEYS, 2024, Season::Fall, &Taxonomy::myanimelist());
        assert_eq!(listing.results.get("Unknown").unwrap().len(), 1);
    }

    #[test]
    fn test_items_without_title_link_are_dropped() {
        let html = r#"<div class="seasonal-anime-list"><div class="anime-header">Monday</div>
            <div class="seasonal-anime"><h2 class="h2_anime_title">No link</h2></div></div>"#;
        let listing = parse_seasonal(html, SCHEDULE_KEYS, 2024, Season::Fall, &Taxonomy::myanimelist());
        assert_eq!(listing.total_results, 0);
    }

    #[test]
    fn test_season_of_month() {
        assert_eq!(Season::of_month(2), Season::Winter);
        assert_eq!(Season::of_month(6), Season::Spring);
        assert_eq!(Season::of_month(9), Season::Summer);
        assert_eq!(Season::of_month(10), Season::Fall);
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(Season::containing(date), (Season::Fall, 2026));
        assert!("autumn".parse::<Season>().unwrap_err().is_caller_error());
    }
}
