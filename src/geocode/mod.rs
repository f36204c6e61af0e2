mod google;
mod resolver;
mod store;

pub use google::GoogleGeocoder;
pub(crate) use google::parse_response;
pub use resolver::{ExternalGeocoder, GeocodeResolver, NeighborhoodResolver};
pub use store::GeocodeStore;
