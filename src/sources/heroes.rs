//! Hero wiki: category index, article details and site search.

use std::sync::LazyLock;

use indexmap::IndexMap;
use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::extract::reader::{attr, first, first_attr, first_text, lazy_src, text, text_with_breaks};
use crate::extract::text::{last_segment, query_value};
use crate::extract::reader::{Locate, Pick};
use crate::extract::{Chain, Field, Stage, collect_groups, region, stage};
use crate::fetch::Fetcher;
use crate::selector;

const GALLERY_LIMIT: usize = 5;

/// A member link's `title`, else its text.
static MEMBER_NAME: LazyLock<Field> =
    LazyLock::new(|| Chain::new().own_attr("title").step(Locate::Node, Pick::Text).or(""));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSummary {
    pub name: String,
    pub hero_id: String,
    pub thumbnail: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroListing {
    pub total_results: usize,
    pub results: Vec<HeroSummary>,
}

impl HeroListing {
    fn new(results: Vec<HeroSummary>) -> Self {
        Self {
            total_results: results.len(),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub url: String,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroDetail {
    pub hero_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub details: IndexMap<String, String>,
    pub biography: String,
    pub gallery: Vec<GalleryImage>,
}

/// Members of a category page.
pub fn parse_index(html: &str) -> HeroListing {
    let document = Html::parse_document(html);
    let members = document.select(selector!("div.category-page__members li.category-page__member"));
    let results = collect_groups(members, "category members", |member| {
        let link = first(member, selector!("a.category-page__member-link"))?;
        Some(HeroSummary {
            hero_id: attr(link, "href").and_then(|href| last_segment(&href))?,
            name: MEMBER_NAME.read(Some(link)),
            thumbnail: first(member, selector!("img.category-page__member-thumbnail")).and_then(lazy_src),
            description: String::new(),
        })
    });

    info!(count = results.len(), "Parsed hero index");
    HeroListing::new(results)
}

pub fn parse_search(html: &str) -> HeroListing {
    let document = Html::parse_document(html);
    let items = document.select(selector!(".unified-search__result"));
    let results = collect_groups(items, "search results", |item| {
        let title = first(item, selector!(".unified-search__result__title"))?;
        Some(HeroSummary {
            name: text(title),
            hero_id: attr(title, "href").and_then(|href| last_segment(&href))?,
            thumbnail: attr(title, "data-thumbnail"),
            description: first_text(item, selector!(".unified-search__result__content")).unwrap_or_default(),
        })
    });

    info!(count = results.len(), "Parsed hero search");
    HeroListing::new(results)
}

/// An article. The parser output block is the anchor.
pub fn parse_hero(html: &str, hero_id: &str) -> Result<HeroDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let body = region(root, selector!("div.mw-parser-output"), "article body")?;

    let name = first_text(root, selector!("h1.page-header__title")).unwrap_or_else(|| hero_id.replace('_', " "));
    let image_url = first(body, selector!("figure.pi-item.pi-image img")).and_then(lazy_src);
    let details = infobox(body);
    let biography = stage(Stage::Biography, || Ok(biography(body)));
    let gallery = stage(Stage::Gallery, || gallery(root));

    info!(
        hero_id,
        details = details.len(),
        gallery = gallery.len(),
        "Parsed hero details"
    );
    Ok(HeroDetail {
        hero_id: hero_id.to_string(),
        name,
        image_url,
        details,
        biography,
        gallery,
    })
}

/// Infobox label → value, line breaks joined with `, `.
fn infobox(body: ElementRef<'_>) -> IndexMap<String, String> {
    body.select(selector!("div.pi-item.pi-data"))
        .filter_map(|item| {
            let label = first_text(item, selector!("h3.pi-data-label"))?;
            let value = first(item, selector!("div.pi-data-value"))?;
            Some((label, text_with_breaks(value, ", ")))
        })
        .collect()
}

/// Headed sections of the article body:
///
/// ```text
/// History:
///   - first paragraph
///   - list item
///
/// Powers:
///   - ...
/// ```
///
/// Content before the first header is the lead and is skipped.
fn biography(body: ElementRef<'_>) -> String {
    let mut sections: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut current: Option<String> = None;

    for child in body.children().filter_map(ElementRef::wrap) {
        let tag = child.value().name();
        if matches!(tag, "h2" | "h3" | "h4") {
            let header = first_text(child, selector!("span.mw-headline")).unwrap_or_else(|| text(child));
            sections.entry(header.clone()).or_default();
            current = Some(header);
            continue;
        }
        let Some(lines) = current.as_ref().and_then(|header| sections.get_mut(header)) else {
            continue;
        };
        match tag {
            "p" => lines.push(text(child)),
            "ul" | "ol" => lines.extend(child.select(selector!("li")).map(text)),
            "table" => {
                let rows: Vec<String> = child
                    .select(selector!("tr"))
                    .map(|tr| tr.select(selector!("td")).map(text).collect::<Vec<_>>().join(" "))
                    .filter(|row| !row.trim().is_empty())
                    .collect();
                lines.push(rows.join("\n"));
            }
            _ => {}
        }
        lines.retain(|line| !line.is_empty());
    }

    sections
        .iter()
        .map(|(header, lines)| {
            let mut section = format!("{header}:");
            for line in lines {
                section.push_str("\n  - ");
                section.push_str(line);
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn gallery(root: ElementRef<'_>) -> Result<Vec<GalleryImage>> {
    let gallery = region(root, selector!("div.wikia-gallery"), "gallery")?;
    Ok(gallery
        .select(selector!("div.wikia-gallery-item"))
        .filter_map(|item| {
            let img = first(item, selector!("img"))?;
            Some(GalleryImage {
                url: lazy_src(img)?,
                caption: attr(img, "alt").unwrap_or_default(),
            })
        })
        .take(GALLERY_LIMIT)
        .collect())
}

#[derive(Clone)]
pub struct HeroWiki {
    fetcher: Fetcher,
    base: String,
}

impl HeroWiki {
    pub fn new(fetcher: Fetcher, base: impl Into<String>) -> Self {
        Self {
            fetcher,
            base: base.into(),
        }
    }

    /// Heroes whose names start at `start`, a single letter A-Z.
    pub async fn index(&self, start: &str) -> Result<HeroListing> {
        let letter = match start.chars().collect::<Vec<_>>().as_slice() {
            [c] if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Err(ScrapeError::invalid("Invalid starting character. Please use A-Z.")),
        };
        info!(%letter, "Scraping hero index");
        let url = format!("{}/wiki/Category:Superheroes?from={letter}", self.base);
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_index(&html))
    }

    pub async fn hero(&self, hero_id: &str) -> Result<HeroDetail> {
        let hero_id = hero_id.trim();
        if hero_id.is_empty() {
            return Err(ScrapeError::invalid("Hero id must not be empty"));
        }
        info!(hero_id, "Scraping hero details");
        let html = self.fetcher.fetch(&format!("{}/wiki/{hero_id}", self.base)).await?;
        parse_hero(&html, hero_id)
    }

    pub async fn search(&self, query: &str) -> Result<HeroListing> {
        if query.trim().is_empty() {
            return Err(ScrapeError::invalid("Search query must not be empty"));
        }
        info!(query, "Searching heroes");
        let url = format!(
            "{}/wiki/Special:Search?query={}&scope=internal&navigationSearch=true",
            self.base,
            query_value(query)
        );
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_search(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><body>
        <h1 class="page-header__title">Spider-Man</h1>
        <div class="mw-parser-output">
            <aside class="portable-infobox">
                <figure class="pi-item pi-image"><a href="/x"><img src="https://static.wikia.nocookie.net/spiderman.png"></a></figure>
                <div class="pi-item pi-data pi-item-spacing pi-border-color"><h3 class="pi-data-label">Full Name</h3><div class="pi-data-value">Peter <b>Benjamin</b> Parker</div></div>
                <div class="pi-item pi-data pi-item-spacing pi-border-color"><h3 class="pi-data-label">Alias</h3><div class="pi-data-value">Spidey<br>Web-Head<br><a href="/wiki/Wall">Wall-Crawler</a></div></div>
            </aside>
            <p>Spider-Man is a superhero.</p>
            <div id="toc" class="toc">Contents</div>
            <h2><span class="mw-headline" id="History">History</span><span class="mw-editsection">[edit]</span></h2>
            <p>Bitten by a spider.</p>
            <ul><li>Learned responsibility.</li><li>Joined the Avengers.</li></ul>
            <h3><span class="mw-headline">Powers</span></h3>
            <table><tr><td>Strength</td><td>10 tons</td></tr><tr><th>Header only</th></tr></table>
            <h2>Trivia</h2>
        </div>
        <div class="wikia-gallery">
            <div class="wikia-gallery-item"><img src="/1.png" alt="Suit"></div>
            <div class="wikia-gallery-item"><img data-src="/2.png"></div>
            <div class="wikia-gallery-item">caption only</div>
            <div class="wikia-gallery-item"><img src="/3.png"></div>
            <div class="wikia-gallery-item"><img src="/4.png"></div>
            <div class="wikia-gallery-item"><img src="/5.png"></div>
            <div class="wikia-gallery-item"><img src="/6.png"></div>
        </div>
        </body></html>"#;

    #[test]
    fn test_article_infobox() {
        let hero = parse_hero(ARTICLE, "Spider-Man_(Marvel)").unwrap();
        assert_eq!(hero.name, "Spider-Man");
        assert_eq!(hero.image_url.as_deref(), Some("https://static.wikia.nocookie.net/spiderman.png"));
        assert_eq!(hero.details["Full Name"], "Peter Benjamin Parker");
        assert_eq!(hero.details["Alias"], "Spidey, Web-Head, Wall-Crawler");
    }

    #[test]
    fn test_sectioned_biography() {
        let hero = parse_hero(ARTICLE, "Spider-Man_(Marvel)").unwrap();
        assert_eq!(
            hero.biography,
            "History:\n  - Bitten by a spider.\n  - Learned responsibility.\n  - Joined the Avengers.\n\n\
             Powers:\n  - Strength 10 tons\n\n\
             Trivia:"
        );
    }

    #[test]
    fn test_gallery_is_capped() {
        let hero = parse_hero(ARTICLE, "Spider-Man_(Marvel)").unwrap();
        let urls: Vec<&str> = hero.gallery.iter().map(|image| image.url.as_str()).collect();
        assert_eq!(urls, ["/1.png", "/2.png", "/3.png", "/4.png", "/5.png"]);
        assert_eq!(hero.gallery[0].caption, "Suit");
        assert_eq!(hero.gallery[1].caption, "");
    }

    #[test]
    fn test_not_an_article() {
        let err = parse_hero("<html><body><p>Search</p></body></html>", "Nobody").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingSection(_)));
    }

    #[test]
    fn test_category_members() {
        let html = r#"<div class="category-page__members"><ul>
            <li class="category-page__member">
                <img class="category-page__member-thumbnail" src="data:image/gif;base64,R0lGOD" data-src="https://static.wikia.nocookie.net/aang.png">
                <a href="/wiki/Aang" class="category-page__member-link" title="Aang">Aang</a>
            </li>
            <li class="category-page__member"><span>no link</span></li>
            <li class="category-page__member"><a href="/wiki/Ant-Man_(Marvel)" class="category-page__member-link">Ant-Man</a></li>
        </ul></div>"#;
        let listing = parse_index(html);
        assert_eq!(listing.total_results, 2);
        assert_eq!(listing.results[0].hero_id, "Aang");
        assert_eq!(
            listing.results[0].thumbnail.as_deref(),
            Some("https://static.wikia.nocookie.net/aang.png")
        );
        assert_eq!(listing.results[1].hero_id, "Ant-Man_(Marvel)");
        assert_eq!(listing.results[1].name, "Ant-Man");
    }

    #[test]
    fn test_search_results() {
        let html = r#"<ul>
            <li class="unified-search__result">
                <a class="unified-search__result__title" href="https://hero.fandom.com/wiki/Batman_(DC)" data-thumbnail="https://static.wikia.nocookie.net/batman.png">Batman (DC)</a>
                <p class="unified-search__result__content">The Dark Knight of Gotham.</p>
            </li>
            <li class="unified-search__result"><p class="unified-search__result__content">orphan</p></li>
        </ul>"#;
        let listing = parse_search(html);
        assert_eq!(listing.total_results, 1);
        let batman = &listing.results[0];
        assert_eq!(batman.name, "Batman (DC)");
        assert_eq!(batman.hero_id, "Batman_(DC)");
        assert_eq!(batman.description, "The Dark Knight of Gotham.");
    }
}
