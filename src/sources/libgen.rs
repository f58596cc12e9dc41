//! Library Genesis search listings and mirror download links.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::extract::collect_groups;
use crate::extract::reader::{first, first_attr, first_text, text};
use crate::extract::text::{first_number, last_segment, query_value};
use crate::fetch::Fetcher;
use crate::selector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub id: String,
    pub author: String,
    pub title: String,
    pub publisher: String,
    pub year: String,
    pub pages: String,
    pub language: String,
    pub size: String,
    pub extension: String,
    pub download_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookListing {
    pub total_results: u64,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadLink {
    pub download_link: String,
}

/// Mirrors that resolve a download id to a file link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    LibraryLol,
    LibgenLi,
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mirror::LibraryLol => "library_lol",
            Mirror::LibgenLi => "libgen_li",
        })
    }
}

impl FromStr for Mirror {
    type Err = ScrapeError;

    fn from_str(source: &str) -> Result<Self> {
        match source {
            "library_lol" => Ok(Mirror::LibraryLol),
            "libgen_li" => Ok(Mirror::LibgenLi),
            other => Err(ScrapeError::invalid(format!(
                "Invalid source: {other}. Must be 'library_lol' or 'libgen_li'"
            ))),
        }
    }
}

const DOWNLOAD_ID_LEN: usize = 32;

fn book_row(row: ElementRef<'_>) -> Option<Book> {
    let cells: Vec<ElementRef<'_>> = row.select(selector!("td")).collect();
    if cells.len() < 11 {
        return None;
    }
    let title_cell = cells[2];
    let title = first_text(title_cell, selector!("a[id]"))
        .or_else(|| first_text(title_cell, selector!("a")))
        .unwrap_or_else(|| text(title_cell));

    Some(Book {
        id: text(cells[0]),
        author: text(cells[1]),
        title,
        publisher: text(cells[3]),
        year: text(cells[4]),
        pages: text(cells[5]),
        language: text(cells[6]),
        size: text(cells[7]),
        extension: text(cells[8]),
        download_id: first_attr(cells[9], selector!("a"), "href").and_then(|href| last_segment(&href)),
    })
}

/// Rows of the `table.c` result grid after the header row.
pub fn parse_books(html: &str) -> BookListing {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let books = match first(root, selector!("table.c")) {
        Some(table) => collect_groups(table.select(selector!("tr")).skip(1), "book rows", book_row),
        None => Vec::new(),
    };

    let counted = root
        .select(selector!("div[style=\"float:left\"]"))
        .map(text)
        .find_map(|line| line.rsplit_once(" of ").and_then(|(_, total)| first_number(total)));
    let total_results = counted.map_or(books.len() as u64, |total| total as u64);

    info!(total_results, count = books.len(), "Parsed book listing");
    BookListing { total_results, books }
}

/// The `GET` link on a library.lol book page.
pub fn parse_library_lol(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    first_attr(document.root_element(), selector!("div#download h2 a"), "href")
        .ok_or_else(|| ScrapeError::NotFound("download link on library.lol".to_string()))
}

/// The highlighted link on a libgen.li ads page, resolved against `base`.
pub fn parse_libgen_li(html: &str, base: &str) -> Result<String> {
    let document = Html::parse_document(html);
    first_attr(document.root_element(), selector!("td[bgcolor=\"#A9F5BC\"] a"), "href")
        .map(|href| format!("{}/{}", base, href.trim_start_matches('/')))
        .ok_or_else(|| ScrapeError::NotFound("download link on libgen.li".to_string()))
}

#[derive(Clone)]
pub struct Libgen {
    fetcher: Fetcher,
    base: String,
    library_lol: String,
    libgen_li: String,
}

impl Libgen {
    pub fn new(
        fetcher: Fetcher,
        base: impl Into<String>,
        library_lol: impl Into<String>,
        libgen_li: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            base: base.into(),
            library_lol: library_lol.into(),
            libgen_li: libgen_li.into(),
        }
    }

    pub async fn search(&self, bookname: &str) -> Result<BookListing> {
        if !(1..=200).contains(&bookname.chars().count()) {
            return Err(ScrapeError::invalid("Book name must be 1 to 200 characters"));
        }
        info!(bookname, "Searching books");
        let url = format!("{}/search.php?req={}", self.base, query_value(bookname));
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse_books(&html))
    }

    pub async fn download_link(&self, mirror: Mirror, download_id: &str) -> Result<DownloadLink> {
        if download_id.chars().count() != DOWNLOAD_ID_LEN {
            return Err(ScrapeError::invalid(format!(
                "Download id must be {DOWNLOAD_ID_LEN} characters"
            )));
        }
        info!(%mirror, download_id, "Resolving download link");
        let download_link = match mirror {
            Mirror::LibraryLol => {
                let html = self
                    .fetcher
                    .fetch(&format!("{}/main/{download_id}", self.library_lol))
                    .await?;
                parse_library_lol(&html)?
            }
            Mirror::LibgenLi => {
                let html = self
                    .fetcher
                    .fetch(&format!("{}/ads.php?md5={download_id}", self.libgen_li))
                    .await?;
                parse_libgen_li(&html, &self.libgen_li)?
            }
        };
        Ok(DownloadLink { download_link })
    }
}
