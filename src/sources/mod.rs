//! One client per upstream site. Each fetches through the shared
//! [`Fetcher`](crate::fetch::Fetcher) and hands the document to a
//! synchronous `parse_*` function.

pub mod gsmarena;
pub mod heroes;
pub mod libgen;
pub mod myanimelist;
pub mod weather;

use crate::config::SourceUrls;
use crate::fetch::Fetcher;

pub use gsmarena::GsmArena;
pub use heroes::HeroWiki;
pub use libgen::Libgen;
pub use myanimelist::MyAnimeList;
pub use weather::Weather;

/// Every source client, sharing one connection pool.
#[derive(Clone)]
pub struct Sources {
    pub myanimelist: MyAnimeList,
    pub weather: Weather,
    pub libgen: Libgen,
    pub gsmarena: GsmArena,
    pub heroes: HeroWiki,
}

impl Sources {
    pub fn new(fetcher: Fetcher, urls: &SourceUrls) -> Self {
        Self {
            myanimelist: MyAnimeList::new(fetcher.clone(), &urls.myanimelist),
            weather: Weather::new(fetcher.clone(), &urls.wunderground, &urls.timeanddate),
            libgen: Libgen::new(fetcher.clone(), &urls.libgen, &urls.library_lol, &urls.libgen_li),
            gsmarena: GsmArena::new(fetcher.clone(), &urls.gsmarena),
            heroes: HeroWiki::new(fetcher, &urls.hero_wiki),
        }
    }
}
