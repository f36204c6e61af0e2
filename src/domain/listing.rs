// src/domain/listing.rs

use serde::{Deserialize, Serialize};

use crate::domain::ward::Ward;

/// A resolved position in degrees. Also the on-disk format of one geocode
/// cache file: `{ "lat": .., "lon": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationWalk {
    pub name: String,
    pub minutes: u32,
}

/// One rentable unit, as written to `listings/<ward>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    /// Free-text address fragment, also the geocode cache key.
    pub neighborhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    pub age_years: u32,
    pub floor: i32,
    pub price_per_month_yen: u64,
    pub layout: String,
    pub square_meters: f32,
    pub ward: Ward,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<StationWalk>,
}
