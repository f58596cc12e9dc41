//! Infinite API: typed records scraped from anime, weather, book, phone
//! and hero wiki sites, served over HTTP.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod server;
pub mod sources;
