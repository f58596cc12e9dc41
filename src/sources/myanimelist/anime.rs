//! The anime detail page.
//!
//! The information sidebar is the anchor: without it the page is not an
//! anime page and the call fails. Every other block is an independent stage
//! that degrades to an empty result.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{
    AnimeDetails, AnimeInformation, CastMember, Recommendation, RelatedEntries, RelatedEntry,
    ThemeSong, ThemeSongs, VoiceActor,
};
use crate::error::Result;
use crate::extract::reader::{
    absolute_url, attr, first, first_attr, first_text, labelled_links, labelled_value, lazy_src,
    non_empty_text, text,
};
use crate::extract::text::{song_credit, split_trailing_paren};
use crate::extract::{Chain, Stage, region, stage};
use crate::selector;

const TABLE_ENTRY_IMAGE: &str = "https://cdn.myanimelist.net/images/qm_50.gif";
const RECOMMENDATION_IMAGE: &str = "https://via.placeholder.com/90x140";
const PLATFORMS: [&str; 4] = ["spotify", "apple", "amazon", "youtube"];

pub fn parse_anime(html: &str, base: &str) -> Result<AnimeDetails> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let info_block = region(root, selector!("div#content table"), "information block")?;

    let title = Chain::new()
        .text(selector!("h1.title-name strong"))
        .text(selector!("h1.title-name"))
        .or("")
        .read(Some(root));
    let english_title = Chain::new().text(selector!("p.title-english")).optional().read(Some(root));
    let score = Chain::new().text(selector!("div.score-label")).or("").read(Some(root));
    let ranked = Chain::new().text(selector!("span.ranked strong")).or("").read(Some(root));
    let popularity = Chain::new()
        .text(selector!("span.popularity strong"))
        .or("")
        .read(Some(root));
    let synopsis = Chain::new()
        .text(selector!("p[itemprop=\"description\"]"))
        .or("No synopsis available")
        .read(Some(root));

    let information = stage(Stage::Taxonomy, || Ok(information(info_block, base)));

    let mut related_entries = stage(Stage::RelatedEntries, || related_tiles(root, base));
    for (relation, entries) in stage(Stage::RelatedEntries, || related_table(root, base)) {
        related_entries.entry(relation).or_default().extend(entries);
    }

    let characters = stage(Stage::Cast, || cast(root, base));
    let theme_songs = stage(Stage::Themes, || theme_songs(root));
    let recommendations = stage(Stage::Recommendations, || recommendations(root, base));

    info!(
        title = %title,
        related = related_entries.len(),
        characters = characters.len(),
        recommendations = recommendations.len(),
        "Parsed anime details"
    );
    Ok(AnimeDetails {
        title,
        english_title,
        information,
        score,
        ranked,
        popularity,
        synopsis,
        related_entries,
        characters,
        theme_songs,
        recommendations,
    })
}

fn information(block: ElementRef<'_>, base: &str) -> AnimeInformation {
    let label = selector!("span.dark_text");
    let value = |name: &str| labelled_value(block, label, name).unwrap_or_else(|| "Unknown".to_string());
    let names = |names: &[&str]| -> Vec<String> {
        names
            .iter()
            .map(|name| labelled_links(block, label, name))
            .find(|links| !links.is_empty())
            .unwrap_or_default()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    };
    let links = |name: &str| -> IndexMap<String, String> {
        labelled_links(block, label, name)
            .into_iter()
            .filter_map(|(name, href)| Some((name, absolute_url(base, &href?))))
            .collect()
    };

    AnimeInformation {
        kind: value("Type:"),
        episodes: value("Episodes:"),
        status: value("Status:"),
        aired: value("Aired:"),
        premiered: value("Premiered:"),
        broadcast: value("Broadcast:"),
        producers: links("Producers:"),
        licensors: names(&["Licensors:"]),
        studios: links("Studios:"),
        source: value("Source:"),
        genres: names(&["Genres:", "Genre:"]),
        themes: names(&["Themes:", "Theme:"]),
        demographics: names(&["Demographics:", "Demographic:"]),
        duration: value("Duration:"),
        rating: value("Rating:"),
    }
}

/// Tile form: the entry type is the trailing `(X)` of the relation label.
fn related_tiles(root: ElementRef<'_>, base: &str) -> Result<RelatedEntries> {
    let related = region(root, selector!("div.related-entries"), "related entries")?;
    let mut entries = RelatedEntries::new();

    for tile in related.select(selector!("div.entry")) {
        let (Some(relation), Some(link)) = (
            first_text(tile, selector!("div.relation")),
            first(tile, selector!("div.title a")),
        ) else {
            continue;
        };
        let (relation, kind) = split_trailing_paren(&relation);
        entries.entry(relation).or_default().push(RelatedEntry {
            title: text(link),
            url: absolute_url(base, &attr(link, "href").unwrap_or_default()),
            kind: kind.unwrap_or_else(|| "Unknown".to_string()),
            image_url: first(tile, selector!("div.image a img")).and_then(lazy_src),
        });
    }
    Ok(entries)
}

/// Table form: the entry type is the trailing `(X)` of each list item.
fn related_table(root: ElementRef<'_>, base: &str) -> Result<RelatedEntries> {
    let related = region(root, selector!("div.related-entries"), "related entries")?;
    let mut entries = RelatedEntries::new();

    for row in related.select(selector!("table.entries-table tr")) {
        let Some(relation) = first_text(row, selector!("td.ar.fw-n")) else {
            continue;
        };
        let relation = relation.trim_end_matches(':').trim().to_string();
        for item in row.select(selector!("ul.entries li")) {
            let Some(link) = first(item, selector!("a")) else {
                continue;
            };
            let (_, kind) = split_trailing_paren(&text(item));
            entries.entry(relation.clone()).or_default().push(RelatedEntry {
                title: text(link),
                url: absolute_url(base, &attr(link, "href").unwrap_or_default()),
                kind: kind.unwrap_or_else(|| "Unknown".to_string()),
                image_url: Some(TABLE_ENTRY_IMAGE.to_string()),
            });
        }
    }
    Ok(entries)
}

fn cast(root: ElementRef<'_>, base: &str) -> Result<Vec<CastMember>> {
    region(root, selector!("div.detail-characters-list"), "characters")?;
    let mut members = Vec::new();

    let columns = root.select(selector!(
        "div.detail-characters-list .left-column, div.detail-characters-list .left-right"
    ));
    for column in columns {
        // a character table is followed by the table of its voice actor
        let tables: Vec<ElementRef<'_>> = column.select(selector!("table")).collect();
        for pair in tables.chunks(2) {
            if let Some(member) = cast_member(pair[0], pair.get(1).copied(), base) {
                members.push(member);
            }
        }
    }
    Ok(members)
}

fn cast_member(table: ElementRef<'_>, va_table: Option<ElementRef<'_>>, base: &str) -> Option<CastMember> {
    let image = first(table, selector!("td:first-child img"))?;
    let info = first(table, selector!("td:nth-child(2)"))?;
    // staff tables share the layout but carry no h3
    first(info, selector!("h3"))?;

    let voice_actors = va_table
        .and_then(|va| first(va, selector!("tr")))
        .and_then(|row| {
            let name = first(row, selector!("td.va-t a"))?;
            Some(VoiceActor {
                name: text(name),
                url: absolute_url(base, &attr(name, "href").unwrap_or_default()),
                image_url: first(row, selector!("td:last-child img")).and_then(lazy_src),
                language: first_text(row, selector!("td.va-t small")).unwrap_or_else(|| "N/A".to_string()),
            })
        })
        .into_iter()
        .collect();

    Some(CastMember {
        name: first_text(info, selector!("h3 a")).unwrap_or_else(|| "Unknown".to_string()),
        url: first_attr(info, selector!("h3 a"), "href").map(|href| absolute_url(base, &href)),
        image_url: lazy_src(image),
        role: first_text(info, selector!("div.spaceit_pad small")).unwrap_or_else(|| "N/A".to_string()),
        voice_actors,
    })
}

fn theme_songs(root: ElementRef<'_>) -> Result<ThemeSongs> {
    let mut songs = ThemeSongs::default();
    for block in root.select(selector!("div.theme-songs")) {
        // the site spells the opening class "opnening"
        let opening = block
            .value()
            .classes()
            .any(|class| class == "opnening" || class == "opening");
        let target = if opening { &mut songs.opening } else { &mut songs.ending };
        target.extend(block.select(selector!("table tr")).filter_map(theme_song));
    }
    Ok(songs)
}

fn theme_song(row: ElementRef<'_>) -> Option<ThemeSong> {
    let cell = text(first(row, selector!("td:nth-of-type(2)"))?);
    if !(cell.contains('"') || cell.contains("by")) {
        return None;
    }

    let index = first_text(row, selector!("span.theme-song-index"));
    let number = match &index {
        Some(index) => index.trim_end_matches(':').to_string(),
        None if cell.starts_with('S') => cell.split(':').next().unwrap_or_default().trim().to_string(),
        None => "Unknown".to_string(),
    };
    let credit_text = index
        .as_deref()
        .and_then(|index| cell.strip_prefix(index))
        .unwrap_or(&cell);
    let credit = song_credit(credit_text);

    let platforms = PLATFORMS
        .iter()
        .zip([
            selector!("input[id^=\"spotify_url_\"]"),
            selector!("input[id^=\"apple_url_\"]"),
            selector!("input[id^=\"amazon_url_\"]"),
            selector!("input[id^=\"youtube_url_\"]"),
        ])
        .filter_map(|(platform, input)| Some((platform.to_string(), first_attr(row, input, "value")?)))
        .collect::<BTreeMap<_, _>>();

    Some(ThemeSong {
        number,
        title: Some(credit.title).filter(|t| !t.is_empty()).unwrap_or_else(|| "Unknown".to_string()),
        artist: credit.artist.unwrap_or_else(|| "Unknown".to_string()),
        episodes: credit.episodes,
        platforms,
    })
}

fn recommendations(root: ElementRef<'_>, base: &str) -> Result<Vec<Recommendation>> {
    let section = region(root, selector!("#anime_recommendation"), "recommendations")?;
    let items = section.select(selector!("div.anime-slide-outer ul.anime-slide li.btn-anime"));

    Ok(items
        .map(|item| Recommendation {
            title: first_text(item, selector!("span.title")).unwrap_or_else(|| "N/A".to_string()),
            url: absolute_url(base, &first_attr(item, selector!("a"), "href").unwrap_or_default()),
            image_url: first(item, selector!("img"))
                .and_then(lazy_src)
                .unwrap_or_else(|| RECOMMENDATION_IMAGE.to_string()),
            recommenders: first(item, selector!("span.users"))
                .and_then(non_empty_text)
                .and_then(|users| users.split_whitespace().next().map(str::to_string))
                .unwrap_or_else(|| "0".to_string()),
        })
        .collect())
}
