//! Record Assembler primitives shared by every source.

use std::fmt;

use indexmap::IndexMap;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};

/// Records grouped under a fixed, pre-declared set of category keys.
///
/// Every declared key is always present (possibly empty) and no other key
/// can be added: records filed under an unknown label are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryMap<T> {
    groups: IndexMap<&'static str, Vec<T>>,
}

impl<T> CategoryMap<T> {
    pub fn new(keys: &[&'static str]) -> Self {
        Self {
            groups: keys.iter().map(|key| (*key, Vec::new())).collect(),
        }
    }

    /// Files `record` under `label`. Returns whether the label is declared.
    pub fn insert(&mut self, label: &str, record: T) -> bool {
        match self.groups.get_mut(label) {
            Some(group) => {
                group.push(record);
                true
            }
            None => {
                debug!(label, "Dropped record with unrecognized category");
                false
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&[T]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.keys().copied()
    }

    /// Number of records across all categories.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Sub-extractions of a detail record, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Taxonomy,
    RelatedEntries,
    Cast,
    Themes,
    Recommendations,
    Conditions,
    Astronomy,
    Forecast,
    Specs,
    Biography,
    Gallery,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Taxonomy => "taxonomy",
            Stage::RelatedEntries => "related entries",
            Stage::Cast => "cast",
            Stage::Themes => "themes",
            Stage::Recommendations => "recommendations",
            Stage::Conditions => "conditions",
            Stage::Astronomy => "astronomy",
            Stage::Forecast => "forecast",
            Stage::Specs => "specs",
            Stage::Biography => "biography",
            Stage::Gallery => "gallery",
        };
        f.write_str(name)
    }
}

/// Runs one optional sub-extraction. A failure is logged and replaced by
/// the empty result so sibling stages still run.
pub fn stage<T: Default>(name: Stage, extract: impl FnOnce() -> Result<T>) -> T {
    match extract() {
        Ok(value) => value,
        Err(ScrapeError::MissingSection(section)) => {
            debug!(stage = %name, section, "Section absent, using empty result");
            T::default()
        }
        Err(err) => {
            warn!(stage = %name, error = %err, "Sub-extraction failed, using empty result");
            T::default()
        }
    }
}

/// The first element under `node` matching `selector`, or
/// [`ScrapeError::MissingSection`] naming the region.
pub fn region<'a>(node: ElementRef<'a>, selector: &Selector, name: &'static str) -> Result<ElementRef<'a>> {
    node.select(selector)
        .next()
        .ok_or(ScrapeError::MissingSection(name))
}

/// Maps every group through `assemble`, dropping the groups it rejects.
pub fn collect_groups<'a, T>(
    groups: impl Iterator<Item = ElementRef<'a>>,
    what: &'static str,
    assemble: impl Fn(ElementRef<'a>) -> Option<T>,
) -> Vec<T> {
    let mut dropped = 0usize;
    let records: Vec<T> = groups
        .filter_map(|group| {
            let record = assemble(group);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();
    if dropped > 0 {
        debug!(what, dropped, "Dropped groups missing required fields");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::reader::{first, first_text};
    use crate::selector;
    use scraper::Html;

    const DAYS: &[&str] = &["Monday", "Tuesday", "Other"];

    #[test]
    fn test_category_map_keeps_declared_keys() {
        let mut map: CategoryMap<u32> = CategoryMap::new(DAYS);
        assert!(map.insert("Monday", 1));
        assert!(!map.insert("Someday", 2));
        assert_eq!(map.keys().collect::<Vec<_>>(), DAYS);
        assert_eq!(map.get("Monday"), Some(&[1][..]));
        assert_eq!(map.get("Tuesday"), Some(&[][..]));
        assert_eq!(map.get("Someday"), None);
        assert_eq!(map.total(), 1);
    }

    #[test]
    fn test_empty_category_map_serializes_every_key() {
        let map: CategoryMap<u32> = CategoryMap::new(DAYS);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"Monday": [], "Tuesday": [], "Other": []}));
    }

    #[test]
    fn test_stage_isolates_failures() {
        let failed: Vec<u32> = stage(Stage::Cast, || Err(ScrapeError::MissingSection("cast")));
        assert!(failed.is_empty());
        let ok = stage(Stage::Themes, || Ok(vec![1, 2]));
        assert_eq!(ok, vec![1, 2]);
    }

    #[test]
    fn test_region_names_missing_section() {
        let html = Html::parse_fragment(r#"<div id="content"><table></table></div>"#);
        assert!(region(html.root_element(), selector!("#content table"), "information block").is_ok());
        let err = region(html.root_element(), selector!("#sidebar"), "sidebar").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingSection("sidebar")));
    }

    #[test]
    fn test_collect_groups_drops_partial_groups() {
        let html = Html::parse_fragment(
            r#"<ul>
                <li><a>First</a></li>
                <li><span>no anchor</span></li>
                <li><a>Third</a></li>
            </ul>"#,
        );
        let titles = collect_groups(html.root_element().select(selector!("li")), "items", |li| {
            first(li, selector!("a"))?;
            first_text(li, selector!("a"))
        });
        assert_eq!(titles, ["First", "Third"]);
    }
}
