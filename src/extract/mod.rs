//! The document-extraction pipeline shared by every source.
//!
//! Everything in here is synchronous: a source fetches a document, parses it
//! into a `scraper::Html`, and hands nodes to these components to build owned
//! records.

pub mod assemble;
pub mod pagination;
pub mod reader;
pub mod taxonomy;
pub mod text;

pub use assemble::{CategoryMap, Stage, collect_groups, region, stage};
pub use pagination::resolve_pages;
pub use reader::{Chain, Field, OptionalField};
pub use taxonomy::{SearchQuery, SiteParams, Taxonomy};
pub use text::{Reading, RuleSet, SongCredit};
