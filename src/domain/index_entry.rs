// src/domain/index_entry.rs

use serde::Serialize;

use crate::domain::listing::Listing;

/// The document handed to the search-index importer: the listing itself
/// plus fields derived from it.
///
/// `location` is expected to be mapped as a geo point by the importer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry<'a> {
    #[serde(flatten)]
    pub listing: &'a Listing,
    pub yen_per_square_meter: f32,
}

impl<'a> IndexEntry<'a> {
    pub fn from_listing(listing: &'a Listing) -> Self {
        Self {
            listing,
            yen_per_square_meter: listing.price_per_month_yen as f32 / listing.square_meters,
        }
    }
}

pub fn index_entries(listings: &[Listing]) -> Vec<IndexEntry<'_>> {
    listings.iter().map(IndexEntry::from_listing).collect()
}
