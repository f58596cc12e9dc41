//! Text Disambiguator: splits loosely formatted text into typed sub-fields.
//!
//! Rules are data. A [`RuleSet`] is an ordered list of (pattern, capture
//! group → field) mappings evaluated by one generic matcher; the first rule
//! that matches wins and an unmatched text becomes the fallback field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::form_urlencoded;

pub type Fields = BTreeMap<&'static str, String>;

pub struct Rule {
    pattern: Regex,
    captures: &'static [(&'static str, usize)],
}

impl Rule {
    /// Panics on an invalid pattern; rules are built from literals only.
    pub fn new(pattern: &str, captures: &'static [(&'static str, usize)]) -> Self {
        match Regex::new(pattern) {
            Ok(pattern) => Self { pattern, captures },
            Err(err) => panic!("invalid rule pattern {pattern:?}: {err}"),
        }
    }

    fn apply(&self, text: &str) -> Option<Fields> {
        let caps = self.pattern.captures(text)?;
        let fields: Fields = self
            .captures
            .iter()
            .filter_map(|(field, group)| {
                let value = caps.get(*group)?.as_str().trim().trim_matches('"').trim();
                (!value.is_empty()).then(|| (*field, value.to_string()))
            })
            .collect();
        (!fields.is_empty()).then_some(fields)
    }
}

pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: Option<&'static str>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fallback: None,
        }
    }

    /// Field that receives the whole text when no rule matches.
    pub fn or_whole_text_as(mut self, field: &'static str) -> Self {
        self.fallback = Some(field);
        self
    }

    pub fn disambiguate(&self, text: &str) -> Fields {
        let text = text.trim();
        if let Some(fields) = self.rules.iter().find_map(|rule| rule.apply(text)) {
            return fields;
        }
        match self.fallback {
            Some(field) if !text.is_empty() => Fields::from([(field, text.to_string())]),
            _ => Fields::new(),
        }
    }
}

static TITLE_ARTIST: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new(vec![
        // "Title" by Artist (eps 1-12)
        Rule::new(r#""(.+)"\s*by\s+(.+?)(?:\s*\(|$)"#, &[("title", 1), ("artist", 2)]),
        // Title by Artist, quotes optional
        Rule::new(r#"(?::\s*)?"?(.+?)"?\s+by\s+(.+?)(?:\s*\(|$)"#, &[("title", 1), ("artist", 2)]),
    ])
    .or_whole_text_as("title")
});

static EPISODES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new(vec![
        Rule::new(r"\(eps\s*([^)]+)\)", &[("episodes", 1)]),
        Rule::new(r"\((.+?:\s*[\d-]+)\)", &[("episodes", 1)]),
    ])
});

/// A theme-song line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongCredit {
    pub title: String,
    pub artist: Option<String>,
    pub episodes: Option<String>,
}

/// `"Tank!" by The Seatbelts (eps 1-25)` → title, artist, episode range.
///
/// The episode range is matched independently and never decides whether
/// title and artist were found.
pub fn song_credit(text: &str) -> SongCredit {
    let mut fields = TITLE_ARTIST.disambiguate(text);
    let episodes = EPISODES.disambiguate(text).remove("episodes");
    SongCredit {
        title: fields.remove("title").unwrap_or_default(),
        artist: fields.remove("artist"),
        episodes,
    }
}

/// A reading from a `Label: value unit` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Temperature {
        #[serde(rename = "C")]
        celsius: String,
        #[serde(rename = "F")]
        fahrenheit: String,
    },
    Value {
        value: String,
    },
}

pub const NOT_AVAILABLE: &str = "N/A";

impl Reading {
    pub fn missing() -> Self {
        Self::Value {
            value: NOT_AVAILABLE.to_string(),
        }
    }
}

/// `Pressure: 1015 mbar` → `{value: "1015 mbar"}`;
/// `Dew Point: 8 °C` → `{C: "8", F: "46.4"}`.
pub fn reading(text: Option<&str>) -> Reading {
    let Some((_, rest)) = text.and_then(|t| t.split_once(':')) else {
        return Reading::missing();
    };
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Reading::missing();
    };

    let is_celsius = first.ends_with("°C") || tokens.get(1).is_some_and(|t| *t == "°C");
    if is_celsius {
        return match first.trim_end_matches("°C").parse::<f64>() {
            Ok(celsius) => Reading::Temperature {
                celsius: format_number(celsius),
                fahrenheit: format!("{:.1}", celsius_to_fahrenheit(celsius)),
            },
            Err(_) => Reading::missing(),
        };
    }

    Reading::Value {
        value: tokens.join(" "),
    }
}

/// `F = C*9/5+32`, rounded to one decimal.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_to(celsius * 9.0 / 5.0 + 32.0, 1)
}

/// Inverse of [`celsius_to_fahrenheit`], rounded to two decimals.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    round_to((fahrenheit - 32.0) * 5.0 / 9.0, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?").unwrap_or_else(|err| panic!("invalid number pattern: {err}"))
});

/// First integer or float token in noisy text.
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// `Forecast: 15 / 8 °C` → `(15.0, 8.0)`. Anything but exactly two numbers
/// is treated as absent.
pub fn high_low(text: &str) -> Option<(f64, f64)> {
    let numbers: Vec<f64> = NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    match numbers.as_slice() {
        [high, low] => Some((*high, *low)),
        _ => None,
    }
}

static REDIRECT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/r/[^/]+/").unwrap_or_else(|err| panic!("invalid redirect pattern: {err}"))
});

/// Drops an embedded `r/<token>/` resize segment and the query string:
/// `https://cdn.myanimelist.net/r/50x70/images/anime/1.jpg?s=x`
/// → `https://cdn.myanimelist.net/images/anime/1.jpg`.
pub fn canonical_url(url: &str) -> String {
    let direct = REDIRECT_SEGMENT.replacen(url, 1, "/");
    match direct.split_once('?') {
        Some((path, _)) => path.to_string(),
        None => direct.into_owned(),
    }
}

static TRAILING_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[[^\]]*\]$").unwrap_or_else(|err| panic!("invalid bracket pattern: {err}"))
});

/// Removes line breaks and a trailing `[Written by MAL Rewrite]` note.
pub fn clean_synopsis(text: &str) -> String {
    let flat: String = text.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    TRAILING_BRACKET.replace(flat.trim_end(), "").into_owned()
}

static TRAILING_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\(([^()]*)\)\s*$").unwrap_or_else(|err| panic!("invalid paren pattern: {err}"))
});

/// `Adaptation (Manga)` → `("Adaptation", Some("Manga"))`.
pub fn split_trailing_paren(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    match TRAILING_PAREN.captures(text) {
        Some(caps) => (
            caps[1].trim().to_string(),
            Some(caps[2].trim().to_string()).filter(|kind| !kind.is_empty()),
        ),
        None => (text.to_string(), None),
    }
}

/// Last non-empty path segment of a link, without query or fragment.
pub fn last_segment(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Percent-encodes a single query value.
pub fn query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

static SOURCE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(Source:[^)]*\)").unwrap_or_else(|err| panic!("invalid citation pattern: {err}"))
});

/// Strips `(Source: ...)` citations and collapses whitespace.
pub fn strip_citations(text: &str) -> String {
    let stripped = SOURCE_CITATION.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
