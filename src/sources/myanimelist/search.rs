use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{SearchPage, SearchResult};
use crate::extract::reader::{attr, first, lazy_src, non_empty_text, text};
use crate::extract::text::canonical_url;
use crate::extract::{collect_groups, resolve_pages};
use crate::selector;

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

fn cell_text(cell: ElementRef<'_>, default: &str) -> String {
    non_empty_text(cell).unwrap_or_else(|| default.to_string())
}

fn search_row(row: ElementRef<'_>) -> Option<SearchResult> {
    let cells = cells(row);
    let &[image_cell, title_cell, type_cell, eps_cell, score_cell, ..] = cells.as_slice() else {
        return None;
    };
    let title_link = first(title_cell, selector!("a.hoverinfo_trigger"))?;

    let image_small = first(image_cell, selector!("img")).and_then(lazy_src);
    let image_large = image_small.as_deref().map(canonical_url);

    Some(SearchResult {
        title: text(title_link),
        url: attr(title_link, "href").unwrap_or_else(|| "Not Available".to_string()),
        image_small,
        image_large,
        kind: cell_text(type_cell, "Not Available"),
        episodes: cell_text(eps_cell, "Not Available"),
        score: cell_text(score_cell, "No Rating"),
        synopsis: first(title_cell, selector!("div.pt4"))
            .and_then(non_empty_text)
            .unwrap_or_else(|| "Not Available".to_string()),
    })
}

/// One page of search results. Rows need all five columns and a title link.
pub fn parse_search(html: &str, page: u32) -> SearchPage {
    let document = Html::parse_document(html);

    let rows = document
        .select(selector!("div.js-categories-seasonal table tr"))
        .filter(|row| first(*row, selector!("td.borderClass")).is_some());
    let results = collect_groups(rows, "search rows", search_row);

    let pagination = document
        .select(selector!(".normal_header .fl-r.di-ib"))
        .next();
    let total_pages = resolve_pages(pagination, page);

    info!(page, total_pages, count = results.len(), "Parsed search results");
    SearchPage {
        page,
        total_pages,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: Option<&str>) -> String {
        let link = title
            .map(|t| format!(r#"<a class="hoverinfo_trigger fw-b fl-l" href="https://myanimelist.net/anime/20/{t}"><strong>{t}</strong></a>"#))
            .unwrap_or_default();
        format!(
            r#"<tr>
                <td class="borderClass bgColor0 ac"><div class="picSurround"><img data-src="https://cdn.myanimelist.net/r/50x70/images/anime/13/17405.jpg?s=59"></div></td>
                <td class="borderClass bgColor0">{link}<div class="pt4">Moments prior to Naruto Uzumaki's birth... <a href="/x">read more.</a></div></td>
                <td class="borderClass bgColor0 ac">TV</td>
                <td class="borderClass bgColor0 ac">220</td>
                <td class="borderClass bgColor0 ac">8.02</td>
            </tr>"#
        )
    }

    fn page(rows: &[String], pagination: &str) -> String {
        format!(
            r#"<html><body>
            <div class="normal_header clearfix pt16"><div class="fl-r di-ib pb4">{pagination}</div>Search Results</div>
            <div class="js-categories-seasonal js-block-list list"><table>
                <tr><td class="fw-b ac">Title</td><td>Type</td></tr>
                {}
            </table></div></body></html>"#,
            rows.join("")
        )
    }

    #[test]
    fn test_rows_in_order_with_invalid_row_dropped() {
        let html = page(&[row(Some("Naruto")), row(None), row(Some("Boruto"))], "");
        let result = parse_search(&html, 1);
        let titles: Vec<&str> = result.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Naruto", "Boruto"]);
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn test_row_columns() {
        let html = page(&[row(Some("Naruto"))], "");
        let result = parse_search(&html, 1);
        let naruto = &result.results[0];
        assert_eq!(naruto.kind, "TV");
        assert_eq!(naruto.episodes, "220");
        assert_eq!(naruto.score, "8.02");
        assert_eq!(naruto.url, "https://myanimelist.net/anime/20/Naruto");
        assert!(naruto.synopsis.starts_with("Moments prior"));
        assert_eq!(
            naruto.image_large.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/13/17405.jpg")
        );
    }

    #[test]
    fn test_pagination_block() {
        let html = page(
            &[row(Some("Naruto"))],
            r#"<span class="bgColor1">[<a href="?show=0">1</a>] <a href="?show=50">2</a> <a href="?show=100">3</a> ... <a href="?show=950">[20]</a></span>"#,
        );
        assert_eq!(parse_search(&html, 2).total_pages, 20);
    }
}
