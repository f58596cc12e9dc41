use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::extract::CategoryMap;

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAnime {
    pub rank: String,
    pub title: String,
    pub url: String,
    pub image_small_url: String,
    pub image_url: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results_here: usize,
    pub results: Vec<RankedAnime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalAnime {
    pub url: String,
    pub title: String,
    pub image_url: String,
    pub score: String,
    pub adult: bool,
    pub genres: Vec<String>,
    pub synopsis: String,
}

/// Season or weekly schedule, grouped by anime type or by weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalListing {
    pub total_results: usize,
    pub year: i32,
    pub season: String,
    pub results: CategoryMap<SeasonalAnime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub episodes: String,
    pub score: String,
    pub synopsis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedEntry {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub image_url: Option<String>,
}

/// Related entries keyed by relation ("Sequel", "Adaptation", ...).
pub type RelatedEntries = IndexMap<String, Vec<RelatedEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceActor {
    pub name: String,
    pub url: String,
    pub image_url: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastMember {
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub role: String,
    pub voice_actors: Vec<VoiceActor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSong {
    pub number: String,
    pub title: String,
    pub artist: String,
    pub episodes: Option<String>,
    /// Streaming platform name to track URL.
    pub platforms: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeSongs {
    pub opening: Vec<ThemeSong>,
    pub ending: Vec<ThemeSong>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub recommenders: String,
}

/// Labelled fields of the information sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimeInformation {
    #[serde(rename = "type")]
    pub kind: String,
    pub episodes: String,
    pub status: String,
    pub aired: String,
    pub premiered: String,
    pub broadcast: String,
    pub producers: IndexMap<String, String>,
    pub licensors: Vec<String>,
    pub studios: IndexMap<String, String>,
    pub source: String,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub demographics: Vec<String>,
    pub duration: String,
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimeDetails {
    pub title: String,
    pub english_title: Option<String>,
    #[serde(flatten)]
    pub information: AnimeInformation,
    pub score: String,
    pub ranked: String,
    pub popularity: String,
    pub synopsis: String,
    pub related_entries: RelatedEntries,
    pub characters: Vec<CastMember>,
    pub theme_songs: ThemeSongs,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterVoiceActor {
    pub name: String,
    pub language: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterDetails {
    pub name: String,
    pub image_url: Option<String>,
    pub details: String,
    pub spoiler: Option<String>,
    pub voice_actors: Vec<CharacterVoiceActor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceActingRole {
    pub anime_name: String,
    pub anime_url: Option<String>,
    pub anime_image: Option<String>,
    pub character_name: String,
    pub character_url: Option<String>,
    pub character_image: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffPosition {
    pub anime: String,
    pub anime_url: Option<String>,
    pub anime_image: Option<String>,
    pub position: String,
}

/// The free-text "more" section of a person page, split into parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct About {
    pub personal_info: IndexMap<String, String>,
    pub background: Vec<String>,
    pub awards: Vec<String>,
    pub profile: Vec<String>,
    pub social_media: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetails {
    pub name: String,
    pub image_url: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub alternate_names: Vec<String>,
    pub birthday: Option<String>,
    pub about: About,
    pub voice_acting_roles: Vec<VoiceActingRole>,
    pub anime_staff_positions: Vec<StaffPosition>,
}
