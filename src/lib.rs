//! Rental listings from the suumo.jp listing index, one ward at a time,
//! with every listing's neighborhood geocoded through a file-backed cache.

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod geocode;
pub mod parsers;
pub mod pipeline;
pub mod scraper;

#[cfg(test)]
mod tests;
