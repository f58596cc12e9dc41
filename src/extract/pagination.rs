//! Pagination Resolver: total page count from pagination markup of varying
//! shapes.

use scraper::ElementRef;

use crate::extract::reader::text;
use crate::selector;

/// Largest page number advertised by a pagination container.
///
/// Plain numeric links contribute their value; a final `[N]` link, used when
/// the link list is truncated, contributes `N`. Without a container the
/// total is `current`, and the result is never below `current`.
pub fn resolve_pages(container: Option<ElementRef<'_>>, current: u32) -> u32 {
    let Some(container) = container else {
        return current;
    };

    let labels: Vec<String> = container.select(selector!("a")).map(text).collect();
    let numeric = labels
        .iter()
        .filter_map(|label| label.parse::<u32>().ok())
        .max()
        .unwrap_or(current);

    let bracketed = labels
        .last()
        .and_then(|label| label.strip_prefix('[')?.strip_suffix(']').map(str::to_string))
        // a bracket that is not a number leaves the numeric maximum in place
        .and_then(|inner| inner.trim().parse::<u32>().ok())
        .unwrap_or(current);

    numeric.max(bracketed).max(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::reader::first;
    use proptest::prelude::*;
    use scraper::Html;

    fn pages(html: &str, current: u32) -> u32 {
        let doc = Html::parse_fragment(html);
        let container = first(doc.root_element(), selector!(".fl-r.di-ib"));
        resolve_pages(container, current)
    }

    #[test]
    fn test_numeric_links_take_maximum() {
        let html = r#"<div class="fl-r di-ib">
            <span>1</span> <a href="?show=50">2</a> <a href="?show=100">3</a> <a href="?show=150">4</a>
        </div>"#;
        assert_eq!(pages(html, 1), 4);
    }

    #[test]
    fn test_trailing_bracket_count() {
        let html = r#"<div class="fl-r di-ib">
            <a>1</a> <a>2</a> <a>3</a> ... <a>[20]</a>
        </div>"#;
        assert_eq!(pages(html, 1), 20);
    }

    #[test]
    fn test_unparseable_bracket_is_ignored() {
        let html = r#"<div class="fl-r di-ib"><a>1</a> <a>7</a> <a>[next]</a></div>"#;
        assert_eq!(pages(html, 2), 7);
    }

    #[test]
    fn test_never_below_current_page() {
        let html = r#"<div class="fl-r di-ib"><a>1</a> <a>2</a></div>"#;
        assert_eq!(pages(html, 5), 5);
        let empty = r#"<div class="fl-r di-ib"></div>"#;
        assert_eq!(pages(empty, 3), 3);
    }

    proptest! {
        #[test]
        fn prop_missing_markup_keeps_current_page(page in 1u32..10_000) {
            prop_assert_eq!(pages("<p>no pagination here</p>", page), page);
        }
    }
}
