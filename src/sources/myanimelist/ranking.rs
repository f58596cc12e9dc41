use std::str::FromStr;
use std::sync::LazyLock;

use scraper::{ElementRef, Html};
use tracing::info;

use super::models::{RankedAnime, RankingPage};
use crate::error::ScrapeError;
use crate::extract::reader::{Field, attr, first, lazy_src, non_empty_text};
use crate::extract::text::canonical_url;
use crate::extract::{Chain, collect_groups};
use crate::selector;

/// The ranking tables the site publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingList {
    Top,
    TopAiring,
    TopUpcoming,
    TopSeries,
    TopMovies,
    TopOva,
    TopOna,
    TopSpecial,
    MostPopular,
    MostFavorited,
}

impl RankingList {
    pub const ALL: [RankingList; 10] = [
        RankingList::Top,
        RankingList::TopAiring,
        RankingList::TopUpcoming,
        RankingList::TopSeries,
        RankingList::TopMovies,
        RankingList::TopOva,
        RankingList::TopOna,
        RankingList::TopSpecial,
        RankingList::MostPopular,
        RankingList::MostFavorited,
    ];

    /// Route segment naming the list.
    pub fn slug(self) -> &'static str {
        match self {
            RankingList::Top => "top",
            RankingList::TopAiring => "top_airing",
            RankingList::TopUpcoming => "top_upcoming",
            RankingList::TopSeries => "top_series",
            RankingList::TopMovies => "top_movies",
            RankingList::TopOva => "top_ova",
            RankingList::TopOna => "top_ona",
            RankingList::TopSpecial => "top_special",
            RankingList::MostPopular => "most_popular",
            RankingList::MostFavorited => "most_fav",
        }
    }

    /// Value of the site's `type` parameter; the overall ranking has none.
    fn site_type(self) -> Option<&'static str> {
        match self {
            RankingList::Top => None,
            RankingList::TopAiring => Some("airing"),
            RankingList::TopUpcoming => Some("upcoming"),
            RankingList::TopSeries => Some("tv"),
            RankingList::TopMovies => Some("movie"),
            RankingList::TopOva => Some("ova"),
            RankingList::TopOna => Some("ona"),
            RankingList::TopSpecial => Some("special"),
            RankingList::MostPopular => Some("bypopularity"),
            RankingList::MostFavorited => Some("favorite"),
        }
    }

    /// Number of pages the site serves for this list.
    pub fn total_pages(self) -> u32 {
        match self {
            RankingList::TopAiring => 5,
            RankingList::TopUpcoming => 6,
            RankingList::TopMovies => 40,
            RankingList::TopOva | RankingList::TopOna => 30,
            RankingList::TopSpecial => 36,
            RankingList::Top
            | RankingList::TopSeries
            | RankingList::MostPopular
            | RankingList::MostFavorited => 100,
        }
    }

    pub fn url(self, base: &str, page: u32) -> String {
        let limit = (page.max(1) - 1) * 50;
        match self.site_type() {
            Some(kind) => format!("{base}/topanime.php?type={kind}&limit={limit}"),
            None => format!("{base}/topanime.php?limit={limit}"),
        }
    }
}

impl FromStr for RankingList {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingList::ALL
            .into_iter()
            .find(|list| list.slug() == s)
            .ok_or_else(|| ScrapeError::invalid(format!("Unknown ranking list: {s}")))
    }
}

static RANK: LazyLock<Field> = LazyLock::new(|| Chain::new().text(selector!("td.rank span")).or("N/A"));
static SCORE: LazyLock<Field> = LazyLock::new(|| {
    Chain::new()
        .text(selector!("td.score span"))
        .text(selector!("td.score"))
        .or("N/A")
});

fn ranked_row(row: ElementRef<'_>) -> Option<RankedAnime> {
    let title_link = first(row, selector!("td.title div.detail a.hoverinfo_trigger"))
        .or_else(|| first(row, selector!("td.title h3 a")))?;
    let title = non_empty_text(title_link)?;
    let url = attr(title_link, "href").unwrap_or_else(|| "N/A".to_string());

    let image_small_url = first(row, selector!("td.title img"))
        .and_then(lazy_src)
        .unwrap_or_else(|| "N/A".to_string());
    let image_url = canonical_url(&image_small_url);

    Some(RankedAnime {
        rank: RANK.read(Some(row)),
        title,
        url,
        image_small_url,
        image_url,
        score: SCORE.read(Some(row)),
    })
}

/// A page of a ranking table. Rows without a title link are dropped.
pub fn parse_ranking(html: &str, page: u32, total_pages: u32) -> RankingPage {
    let document = Html::parse_document(html);
    let results = collect_groups(
        document.select(selector!("tr.ranking-list")),
        "ranking rows",
        ranked_row,
    );

    info!(page, count = results.len(), "Parsed ranking page");
    RankingPage {
        page,
        total_pages,
        total_results_here: results.len(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><table>
        <tr class="ranking-list">
            <td class="rank ac"><span class="lightLink top-anime-rank-text rank1">1</span></td>
            <td class="title al va-t word-break">
                <a class="hoverinfo_trigger fl-l ml12 mr8" href="https://myanimelist.net/anime/52991/Sousou_no_Frieren">
                    <img class="lazyload" data-src="https://cdn.myanimelist.net/r/50x70/images/anime/1015/138006.jpg?s=4b" alt="Frieren">
                </a>
                <div class="detail"><div class="di-ib clearfix">
                    <h3 class="fl-l fs14 fw-b anime_ranking_h3">
                        <a class="hoverinfo_trigger" href="https://myanimelist.net/anime/52991/Sousou_no_Frieren">Sousou no Frieren</a>
                    </h3>
                </div></div>
            </td>
            <td class="score ac fs14"><div class="js-top-ranking-score-col di-ib al"><span class="text on score-label score-9">9.30</span></div></td>
        </tr>
        <tr class="ranking-list">
            <td class="rank ac"><span>2</span></td>
            <td class="title al va-t word-break"><img data-src="https://cdn.myanimelist.net/images/x.jpg"></td>
            <td class="score ac fs14"><span>9.10</span></td>
        </tr>
        <tr class="ranking-list">
            <td class="rank ac"><span>3</span></td>
            <td class="title al va-t word-break">
                <div class="detail"><a class="hoverinfo_trigger" href="https://myanimelist.net/anime/9253/Steins_Gate">Steins;Gate</a></div>
            </td>
            <td class="score ac fs14"></td>
        </tr>
    </table></body></html>"#;

    #[test]
    fn test_rows_without_title_are_dropped() {
        let page = parse_ranking(PAGE, 1, 100);
        assert_eq!(page.total_results_here, 2);
        let titles: Vec<&str> = page.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Sousou no Frieren", "Steins;Gate"]);
    }

    #[test]
    fn test_row_fields_and_defaults() {
        let page = parse_ranking(PAGE, 2, 100);
        let frieren = &page.results[0];
        assert_eq!(frieren.rank, "1");
        assert_eq!(frieren.score, "9.30");
        assert_eq!(frieren.url, "https://myanimelist.net/anime/52991/Sousou_no_Frieren");
        assert_eq!(
            frieren.image_url,
            "https://cdn.myanimelist.net/images/anime/1015/138006.jpg"
        );

        let steins = &page.results[1];
        assert_eq!(steins.image_small_url, "N/A");
        assert_eq!(steins.score, "N/A");
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_list_urls_and_bounds() {
        assert_eq!(
            RankingList::Top.url("https://myanimelist.net", 3),
            "https://myanimelist.net/topanime.php?limit=100"
        );
        assert_eq!(
            RankingList::MostFavorited.url("https://myanimelist.net", 1),
            "https://myanimelist.net/topanime.php?type=favorite&limit=0"
        );
        assert_eq!("top_special".parse::<RankingList>().unwrap().total_pages(), 36);
        assert!("top_music".parse::<RankingList>().unwrap_err().is_caller_error());
    }
}
