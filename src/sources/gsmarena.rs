//! GSMArena device listings and specification sheets.

use indexmap::IndexMap;
use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::extract::reader::{absolute_url, first, first_attr, first_text, non_empty_text, text};
use crate::extract::text::query_value;
use crate::extract::{Stage, collect_groups, region, stage};
use crate::fetch::Fetcher;
use crate::selector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub name: String,
    pub image_url: Option<String>,
    pub phone_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneListing {
    pub total_results: usize,
    pub phones: Vec<Phone>,
}

/// Spec rows grouped under their table header, in page order.
pub type Specifications = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Clone, Serialize)]
pub struct PhoneDetails {
    pub id: String,
    pub photo_url: Option<String>,
    pub specifications: Specifications,
}

/// `div.makers ul li` tiles. A missing list is an empty listing.
pub fn parse_phones(html: &str, base: &str) -> PhoneListing {
    let document = Html::parse_document(html);
    let items = document.select(selector!("div.makers ul li"));
    let phones = collect_groups(items, "phone tiles", |item| {
        let link = first(item, selector!("a"))?;
        let href = link.value().attr("href")?;
        Some(Phone {
            name: first_text(link, selector!("strong span"))
                .or_else(|| non_empty_text(link))?,
            image_url: first_attr(link, selector!("img"), "src"),
            phone_url: absolute_url(&format!("{base}/"), href),
        })
    });

    info!(count = phones.len(), "Parsed phone listing");
    PhoneListing {
        total_results: phones.len(),
        phones,
    }
}

/// The spec sheet of one device. `div#specs-list` is the anchor.
pub fn parse_phone_details(html: &str, id: &str) -> Result<PhoneDetails> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let specs_list = region(root, selector!("div#specs-list"), "specification list")?;

    let photo_url = first_attr(root, selector!("div.specs-photo-main img"), "src");
    let specifications = stage(Stage::Specs, || Ok(specifications(specs_list)));

    info!(id, categories = specifications.len(), "Parsed phone specifications");
    Ok(PhoneDetails {
        id: id.to_string(),
        photo_url,
        specifications,
    })
}

/// One category per table, named by its `th`. A row with a blank name
/// continues the value of the row above it.
fn specifications(specs_list: ElementRef<'_>) -> Specifications {
    let mut specifications = Specifications::new();
    for table in specs_list.select(selector!("table")) {
        let Some(category) = first_text(table, selector!("th")) else {
            debug!("Skipped spec table without a header");
            continue;
        };
        let specs = specifications.entry(category).or_default();
        let mut last_name: Option<String> = None;

        for row in table.select(selector!("tr")) {
            let (Some(name), Some(value)) = (
                first(row, selector!("td.ttl")).map(text),
                first(row, selector!("td.nfo")).and_then(non_empty_text),
            ) else {
                continue;
            };
            if name.is_empty() {
                if let Some(previous) = last_name.as_ref().and_then(|n| specs.get_mut(n)) {
                    previous.push('\n');
                    previous.push_str(&value);
                }
                continue;
            }
            specs.insert(name.clone(), value);
            last_name = Some(name);
        }
    }
    specifications
}

#[derive(Clone)]
pub struct GsmArena {
    fetcher: Fetcher,
    base: String,
}

impl GsmArena {
    pub fn new(fetcher: Fetcher, base: impl Into<String>) -> Self {
        Self {
            fetcher,
            base: base.into(),
        }
    }

    /// The first page of the catalog, fetched through the proxy.
    pub async fn top(&self) -> Result<PhoneListing> {
        info!("Scraping top phones");
        let url = format!("{}/results.php3?sQuickSearch=yes&sName=", self.base);
        let html = self.fetcher.fetch_proxied(&url).await?;
        Ok(parse_phones(&html, &self.base))
    }

    pub async fn search(&self, query: &str) -> Result<PhoneListing> {
        if !(1..=200).contains(&query.chars().count()) {
            return Err(ScrapeError::invalid("Search query must be 1 to 200 characters"));
        }
        info!(query, "Searching phones");
        let url = format!("{}/results.php3?sQuickSearch=yes&sName={}", self.base, query_value(query));
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_phones(&html, &self.base))
    }

    /// `id` is the page name on the site, e.g. `apple_iphone_15-12559.php`.
    pub async fn phone(&self, id: &str) -> Result<PhoneDetails> {
        let id = id.trim().trim_start_matches('/');
        if id.is_empty() {
            return Err(ScrapeError::invalid("Phone id must not be empty"));
        }
        info!(id, "Scraping phone specifications");
        let html = self.fetcher.fetch_proxied(&format!("{}/{id}", self.base)).await?;
        parse_phone_details(&html, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.gsmarena.com";

    #[test]
    fn test_phone_tiles() {
        let html = r#"<div class="makers"><ul>
            <li><a href="samsung_galaxy_s24-12773.php"><img src="https://fdn2.gsmarena.com/vv/bigpic/s24.jpg"><strong><span>Samsung<br>Galaxy S24</span></strong></a></li>
            <li><span>no link</span></li>
            <li><a href="apple_iphone_15-12559.php"><strong><span>Apple iPhone 15</span></strong></a></li>
        </ul></div>"#;
        let listing = parse_phones(html, BASE);
        assert_eq!(listing.total_results, 2);
        assert_eq!(listing.phones[0].name, "Samsung Galaxy S24");
        assert_eq!(
            listing.phones[0].phone_url,
            "https://www.gsmarena.com/samsung_galaxy_s24-12773.php"
        );
        assert_eq!(listing.phones[1].image_url, None);
    }

    #[test]
    fn test_missing_listing_is_empty() {
        assert_eq!(parse_phones("<html></html>", BASE).total_results, 0);
    }

    #[test]
    fn test_spec_tables() {
        let html = r##"<html><body>
            <div class="specs-photo-main"><a href="#"><img src="https://fdn2.gsmarena.com/vv/bigpic/iphone15.jpg"></a></div>
            <div id="specs-list">
                <table>
                    <tr><th rowspan="3">Network</th><td class="ttl"><a href="n.php">Technology</a></td><td class="nfo">GSM / HSPA / LTE / 5G</td></tr>
                    <tr><td class="ttl">2G bands</td><td class="nfo">GSM 850 / 900</td></tr>
                    <tr><td class="ttl">&nbsp;</td><td class="nfo">CDMA 800 / 1900</td></tr>
                </table>
                <table>
                    <tr><th>Battery</th><td class="ttl">Type</td><td class="nfo">Li-Ion 3349 mAh</td></tr>
                </table>
                <table><tr><td class="ttl">Orphan</td><td class="nfo">row</td></tr></table>
            </div></body></html>"##;
        let details = parse_phone_details(html, "apple_iphone_15-12559.php").unwrap();
        assert_eq!(
            details.photo_url.as_deref(),
            Some("https://fdn2.gsmarena.com/vv/bigpic/iphone15.jpg")
        );
        let categories: Vec<&str> = details.specifications.keys().map(String::as_str).collect();
        assert_eq!(categories, ["Network", "Battery"]);

        let network = &details.specifications["Network"];
        assert_eq!(network["Technology"], "GSM / HSPA / LTE / 5G");
        assert_eq!(network["2G bands"], "GSM 850 / 900\nCDMA 800 / 1900");
        assert_eq!(details.specifications["Battery"]["Type"], "Li-Ion 3349 mAh");
    }

    #[test]
    fn test_missing_spec_list() {
        let err = parse_phone_details("<html><body></body></html>", "x.php").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingSection(_)));
    }
}
