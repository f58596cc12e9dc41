//! Taxonomy Mapper: caller-facing category names to site query codes.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::{Result, ScrapeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub name: &'static str,
    pub code: u32,
    /// Adult-only; admitted into a search only when the caller opts in.
    pub explicit: bool,
}

const fn code(name: &'static str, code: u32) -> Code {
    Code {
        name,
        code,
        explicit: false,
    }
}

const fn explicit(name: &'static str, code: u32) -> Code {
    Code {
        name,
        code,
        explicit: true,
    }
}

const MAL_TYPES: &[Code] = &[
    code("tv", 1),
    code("ova", 2),
    code("movie", 3),
    code("special", 4),
    code("ona", 5),
    code("music", 6),
];

const MAL_DEMOGRAPHICS: &[Code] = &[
    code("josei", 43),
    code("kids", 15),
    code("seinen", 42),
    code("shoujo", 25),
    code("shounen", 27),
];

const MAL_GENRES: &[Code] = &[
    code("action", 1),
    code("adventure", 2),
    code("avant garde", 5),
    code("award winning", 46),
    code("boys love", 28),
    code("comedy", 4),
    code("drama", 8),
    code("fantasy", 10),
    code("girls love", 26),
    code("gourmet", 47),
    code("horror", 14),
    code("mystery", 7),
    code("romance", 22),
    code("sci-fi", 24),
    code("slice of life", 36),
    code("sports", 30),
    code("supernatural", 37),
    code("suspense", 41),
    explicit("ecchi", 9),
    explicit("erotica", 49),
    explicit("hentai", 12),
];

const MAL_STATUSES: &[Code] = &[code("airing", 1), code("finished", 2), code("not_aired", 3)];

/// The code tables of one site. Immutable; handed to [`Taxonomy::map_query`].
#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    pub types: &'static [Code],
    pub demographics: &'static [Code],
    pub genres: &'static [Code],
    pub statuses: &'static [Code],
    /// Results per page, used to turn a page number into an offset.
    pub page_size: u32,
}

/// A search as the caller phrases it.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: String,
    pub page: u32,
    pub kind: Option<String>,
    pub score: Option<u8>,
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub demographic: Option<String>,
    pub adult: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Ordered site query parameters.
///
/// Keys named in `trailing` are serialized after every other pair,
/// whatever order they were pushed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteParams {
    pairs: Vec<(String, String)>,
    trailing: &'static [&'static str],
}

impl SiteParams {
    pub fn new(trailing: &'static [&'static str]) -> Self {
        Self {
            pairs: Vec::new(),
            trailing,
        }
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// Values of `key` in insertion order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Pairs in serialization order.
    pub fn ordered(&self) -> Vec<(&str, &str)> {
        let (tail, head): (Vec<_>, Vec<_>) = self
            .pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .partition(|(k, _)| self.trailing.iter().any(|t| t == k));
        head.into_iter().chain(tail).collect()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.ordered())
            .finish()
    }
}

impl Taxonomy {
    pub const fn myanimelist() -> Self {
        Self {
            types: MAL_TYPES,
            demographics: MAL_DEMOGRAPHICS,
            genres: MAL_GENRES,
            statuses: MAL_STATUSES,
            page_size: 50,
        }
    }

    pub fn explicit_genres(&self) -> impl Iterator<Item = &Code> {
        self.genres.iter().filter(|genre| genre.explicit)
    }

    /// Translates a caller search into site parameters.
    ///
    /// Unknown category values and malformed dates are caller errors. Unless
    /// the caller explicitly allows adult content, explicit genres are left
    /// out of `genre[]` and listed in `genre_ex[]`.
    pub fn map_query(&self, query: &SearchQuery) -> Result<SiteParams> {
        let q = query.q.trim();
        if q.is_empty() {
            return Err(ScrapeError::invalid("Search query must not be empty"));
        }
        let page = query.page.max(1);
        let adult = query.adult == Some(true);

        let mut params = SiteParams::new(&["show"]);
        // moved behind every other pair by `ordered`
        params.push("show", (page - 1) * self.page_size);
        params.push("q", q);
        params.push("cat", "anime");

        if let Some(kind) = &query.kind {
            params.push("type", lookup("type", self.types, kind)?.code);
        }
        if let Some(score) = query.score {
            if !(1..=10).contains(&score) {
                return Err(ScrapeError::invalid(format!(
                    "Invalid score: {score}. Score must be between 1 and 10"
                )));
            }
            params.push("score", score);
        }
        if let Some(status) = &query.status {
            params.push("status", lookup("status", self.statuses, status)?.code);
        }

        let mut genre_codes = Vec::new();
        for genre in &query.genres {
            let genre = lookup("genre", self.genres, genre)?;
            if genre.explicit && !adult {
                debug!(genre = genre.name, "Explicit genre withheld without adult flag");
                continue;
            }
            genre_codes.push(genre.code);
        }
        if let Some(demographic) = &query.demographic {
            genre_codes.push(lookup("demographic", self.demographics, demographic)?.code);
        }
        for genre_code in genre_codes {
            params.push("genre[]", genre_code);
        }

        if let Some(start) = &query.start_date {
            let date = parse_date("start_date", start)?;
            params.push("sd", date.day());
            params.push("sm", date.month());
            params.push("sy", date.year());
        }
        if let Some(end) = &query.end_date {
            let date = parse_date("end_date", end)?;
            params.push("ed", date.day());
            params.push("em", date.month());
            params.push("ey", date.year());
        }

        if !adult {
            for genre in self.explicit_genres() {
                params.push("genre_ex[]", genre.code);
            }
        }

        Ok(params)
    }
}

fn lookup(kind: &str, table: &'static [Code], value: &str) -> Result<Code> {
    let wanted = value.trim().to_lowercase();
    match table.iter().find(|entry| entry.name == wanted) {
        Some(entry) => Ok(*entry),
        None => {
            warn!(kind, value, "Rejected unknown taxonomy value");
            let valid: Vec<&str> = table.iter().map(|entry| entry.name).collect();
            Err(ScrapeError::invalid(format!(
                "Invalid {kind}: {value}. Valid values are: {}",
                valid.join(", ")
            )))
        }
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
        .map_err(|_| {
            ScrapeError::invalid(format!(
                "Invalid {field} format: {raw}. Use DD-MM-YYYY or YYYY-MM-DD"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query(q: &str) -> SearchQuery {
        SearchQuery {
            q: q.to_string(),
            page: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_table_sizes() {
        let mal = Taxonomy::myanimelist();
        assert_eq!(mal.types.len(), 6);
        assert_eq!(mal.demographics.len(), 5);
        assert_eq!(mal.genres.len(), 21);
        let explicit: Vec<&str> = mal.explicit_genres().map(|g| g.name).collect();
        assert_eq!(explicit, ["ecchi", "erotica", "hentai"]);
    }

    #[test]
    fn test_offset_is_serialized_last() {
        let mut search = query("naruto");
        search.page = 3;
        search.kind = Some("TV".to_string());
        let encoded = Taxonomy::myanimelist().map_query(&search).unwrap().encode();
        assert!(encoded.starts_with("q=naruto&cat=anime&type=1&"));
        assert!(encoded.ends_with("&show=100"), "{encoded}");
    }

    #[test]
    fn test_unknown_values_are_caller_errors() {
        let mal = Taxonomy::myanimelist();

        let mut search = query("x");
        search.kind = Some("cartoon".to_string());
        let err = mal.map_query(&search).unwrap_err();
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("Invalid type: cartoon"));

        let mut search = query("x");
        search.genres = vec!["action".to_string(), "western".to_string()];
        assert!(mal.map_query(&search).unwrap_err().is_caller_error());

        let mut search = query("x");
        search.status = Some("paused".to_string());
        assert!(mal.map_query(&search).unwrap_err().is_caller_error());

        assert!(mal.map_query(&query("   ")).unwrap_err().is_caller_error());
    }

    #[test]
    fn test_adult_flag_admits_explicit_genres() {
        let mut search = query("x");
        search.genres = vec!["Ecchi".to_string(), "comedy".to_string()];
        search.adult = Some(true);
        let params = Taxonomy::myanimelist().map_query(&search).unwrap();
        assert_eq!(params.values("genre[]"), ["9", "4"]);
        assert!(params.values("genre_ex[]").is_empty());
    }

    #[test]
    fn test_demographic_joins_genres() {
        let mut search = query("x");
        search.genres = vec!["drama".to_string()];
        search.demographic = Some("seinen".to_string());
        let params = Taxonomy::myanimelist().map_query(&search).unwrap();
        assert_eq!(params.values("genre[]"), ["8", "42"]);
    }

    #[test]
    fn test_dates_accept_both_orders() {
        let mut search = query("x");
        search.start_date = Some("05-01-2020".to_string());
        search.end_date = Some("2021-12-31".to_string());
        let params = Taxonomy::myanimelist().map_query(&search).unwrap();
        assert_eq!(params.values("sd"), ["5"]);
        assert_eq!(params.values("sm"), ["1"]);
        assert_eq!(params.values("sy"), ["2020"]);
        assert_eq!(params.values("ed"), ["31"]);
        assert_eq!(params.values("ey"), ["2021"]);

        search.end_date = Some("31/12/2021".to_string());
        assert!(Taxonomy::myanimelist().map_query(&search).unwrap_err().is_caller_error());
    }

    #[test]
    fn test_score_range() {
        let mut search = query("x");
        search.score = Some(11);
        assert!(Taxonomy::myanimelist().map_query(&search).unwrap_err().is_caller_error());
        search.score = Some(7);
        let params = Taxonomy::myanimelist().map_query(&search).unwrap();
        assert_eq!(params.values("score"), ["7"]);
    }

    proptest! {
        #[test]
        fn prop_explicit_genres_are_gated(
            picks in proptest::collection::vec(0usize..21, 1..8),
            adult in proptest::option::of(Just(false)),
        ) {
            let mal = Taxonomy::myanimelist();
            let mut search = query("x");
            search.adult = adult;
            search.genres = picks.iter().map(|i| mal.genres[*i].name.to_string()).collect();

            let params = mal.map_query(&search).unwrap();
            let positive = params.values("genre[]");
            let excluded = params.values("genre_ex[]");
            for genre in mal.explicit_genres() {
                let code = genre.code.to_string();
                prop_assert!(!positive.contains(&code.as_str()));
                prop_assert!(excluded.contains(&code.as_str()));
            }
        }
    }
}
