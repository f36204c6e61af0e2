// google.rs
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::Coordinate;
use crate::errors::GeocodeError;
use crate::geocode::ExternalGeocoder;
use crate::scraper::CancelToken;

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Maps Geocoding API.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GeocodeError::Lookup {
                neighborhood: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            api_key,
            timeout,
        })
    }
}

impl ExternalGeocoder for GoogleGeocoder {
    fn geocode(
        &self,
        query: &str,
        region: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Coordinate>, GeocodeError> {
        let lookup_err = |message: String| GeocodeError::Lookup {
            neighborhood: query.to_string(),
            message,
        };
        let cancelled = || GeocodeError::Cancelled {
            neighborhood: query.to_string(),
        };

        let timeout = cancel.cap(self.timeout).ok_or_else(cancelled)?;

        let resp = self
            .client
            .get(GEOCODE_ENDPOINT)
            .query(&[
                ("address", query),
                ("region", region),
                ("key", self.api_key.as_str()),
            ])
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if cancel.is_cancelled() {
                    cancelled()
                } else {
                    lookup_err(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(lookup_err(format!("HTTP {status}")));
        }

        let body = resp.text().map_err(|e| lookup_err(e.to_string()))?;
        parse_response(query, &body)
    }
}

/// `OK` and `ZERO_RESULTS` bodies yield their (possibly empty) candidate
/// list; every other status is a lookup failure.
pub(crate) fn parse_response(query: &str, body: &str) -> Result<Vec<Coordinate>, GeocodeError> {
    let lookup_err = |message: String| GeocodeError::Lookup {
        neighborhood: query.to_string(),
        message,
    };

    let body: GeocodeResponse = serde_json::from_str(body).map_err(|e| lookup_err(e.to_string()))?;

    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(body
            .results
            .into_iter()
            .map(|r| Coordinate::new(r.geometry.location.lat, r.geometry.location.lng))
            .collect()),
        other => Err(lookup_err(match body.error_message {
            Some(msg) => format!("{other}: {msg}"),
            None => other.to_string(),
        })),
    }
}
