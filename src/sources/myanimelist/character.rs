use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{CharacterDetails, CharacterVoiceActor};
use crate::error::{Result, ScrapeError};
use crate::extract::reader::{absolute_url, attr, first, first_text, lazy_src, non_empty_text, text};
use crate::extract::text::strip_citations;
use crate::extract::{Chain, Stage, region, stage};
use crate::selector;

pub fn parse_character(html: &str, base: &str) -> Result<CharacterDetails> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let content = region(root, selector!("div#content"), "character page")?;

    let name = Chain::new()
        .text(selector!("h2.normal_header"))
        .text(selector!("h2"))
        .or("Unknown")
        .read(Some(content));
    let image_url = first(content, selector!("img.portrait-225x350")).and_then(lazy_src);
    let details = stage(Stage::Biography, || Ok(biography(content)));
    let spoiler = first_text(content, selector!("div.spoiler span.spoiler_content"));
    let voice_actors = stage(Stage::Cast, || voice_actors(content, base));

    info!(name = %name, voice_actors = voice_actors.len(), "Parsed character details");
    Ok(CharacterDetails {
        name,
        image_url,
        details,
        spoiler,
        voice_actors,
    })
}

/// Text following the name header, up to the spoiler or the voice actor list.
fn biography(content: ElementRef<'_>) -> String {
    let Some(header) = first(content, selector!("h2.normal_header")) else {
        return String::new();
    };

    let mut parts: Vec<String> = Vec::new();
    for sibling in header.next_siblings() {
        if let Some(fragment) = sibling.value().as_text() {
            if fragment.contains("Voice Actors") {
                break;
            }
            parts.push(fragment.trim().to_string());
        } else if let Some(element) = ElementRef::wrap(sibling) {
            let is_spoiler = element.value().classes().any(|class| class == "spoiler");
            let body = text(element);
            if is_spoiler || body.starts_with("Voice Actors") {
                break;
            }
            parts.push(body);
        }
    }

    let details = strip_citations(&parts.join(" "));
    match details.find("Voice Actors") {
        Some(cut) => details[..cut].trim_end().to_string(),
        None => details,
    }
}

fn voice_actors(content: ElementRef<'_>, base: &str) -> Result<Vec<CharacterVoiceActor>> {
    let header = content
        .select(selector!("div.normal_header"))
        .find(|el| text(*el).contains("Voice Actors"))
        .ok_or(ScrapeError::MissingSection("voice actors"))?;

    Ok(header
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .filter_map(|table| {
            let link = first(table, selector!("td.borderClass:nth-of-type(2) a"))?;
            let language = first_text(table, selector!("td.borderClass:nth-of-type(2) small"))?;
            Some(CharacterVoiceActor {
                name: non_empty_text(link)?,
                language,
                url: attr(link, "href").map(|href| absolute_url(base, &href)),
                image_url: first(table, selector!("td.borderClass img")).and_then(lazy_src),
            })
        })
        .collect())
}
