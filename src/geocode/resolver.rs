// resolver.rs
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::domain::Coordinate;
use crate::errors::GeocodeError;
use crate::geocode::GeocodeStore;
use crate::scraper::CancelToken;

/// The external geocoding service. An empty result means "not found".
/// Implementations must give up promptly once `cancel` fires; the resolver
/// holds its lock across the call.
pub trait ExternalGeocoder: Send + Sync {
    fn geocode(
        &self,
        query: &str,
        region: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Coordinate>, GeocodeError>;
}

/// Neighborhood name -> coordinate, as the extractor sees it.
pub trait NeighborhoodResolver: Send + Sync {
    fn resolve(&self, neighborhood: &str, cancel: &CancelToken)
        -> Result<Coordinate, GeocodeError>;
}

/// Two-tier geocode cache in front of an `ExternalGeocoder`.
///
/// Lookups go memory -> file store -> external service, and everything
/// (including plain memory hits) runs under one resolver-wide lock. That
/// serializes all geocoding in the process, but it means the external
/// service is asked about a given neighborhood at most once, however many
/// wards are crawling at the same time.
///
/// Keys are exact strings; no normalization is applied. Entries are never
/// overwritten or evicted.
pub struct GeocodeResolver<G> {
    external: G,
    store: GeocodeStore,
    region: String,
    cache: Mutex<HashMap<String, Coordinate>>,
}

impl<G: ExternalGeocoder> GeocodeResolver<G> {
    pub fn new(external: G, store: GeocodeStore, region: impl Into<String>) -> Self {
        Self {
            external,
            store,
            region: region.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn external(&self) -> &G {
        &self.external
    }

    fn resolve_locked(
        &self,
        cache: &mut HashMap<String, Coordinate>,
        neighborhood: &str,
        cancel: &CancelToken,
    ) -> Result<Coordinate, GeocodeError> {
        if let Some(coordinate) = cache.get(neighborhood) {
            return Ok(*coordinate);
        }

        let mut unreadable = None;
        match self.store.load(neighborhood) {
            Ok(Some(coordinate)) => {
                cache.insert(neighborhood.to_string(), coordinate);
                return Ok(coordinate);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Ignoring unreadable geocode cache entry for {neighborhood:?}: {e}");
                unreadable = Some(e.to_string());
            }
        }

        if cancel.is_cancelled() {
            return Err(GeocodeError::Cancelled {
                neighborhood: neighborhood.to_string(),
            });
        }

        debug!("Geocoding {neighborhood:?}");
        let candidates = self
            .external
            .geocode(neighborhood, &self.region, cancel)
            .map_err(|e| match (e, unreadable) {
                (GeocodeError::Lookup { message, .. }, Some(file_err)) => GeocodeError::Lookup {
                    neighborhood: neighborhood.to_string(),
                    message: format!("{message} (cached entry unreadable: {file_err})"),
                },
                (e, _) => e,
            })?;

        let coordinate = *candidates.first().ok_or_else(|| GeocodeError::NoResults {
            neighborhood: neighborhood.to_string(),
        })?;

        if candidates.len() > 1 {
            warn!(
                "Unexpected number of geocode results for {neighborhood:?}: {}, using the first",
                candidates.len()
            );
        }

        // The coordinate is good even if it can't be cached on disk.
        if let Err(e) = self.store.save(neighborhood, &coordinate) {
            warn!("Failed to persist geocode for {neighborhood:?}: {e}");
        }

        cache.insert(neighborhood.to_string(), coordinate);
        Ok(coordinate)
    }
}

impl<G: ExternalGeocoder> NeighborhoodResolver for GeocodeResolver<G> {
    fn resolve(
        &self,
        neighborhood: &str,
        cancel: &CancelToken,
    ) -> Result<Coordinate, GeocodeError> {
        if cancel.is_cancelled() {
            return Err(GeocodeError::Cancelled {
                neighborhood: neighborhood.to_string(),
            });
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        self.resolve_locked(&mut cache, neighborhood, cancel)
    }
}
