mod cancel;
mod extractor;
mod fetcher;
mod scraper_error;
mod throttle;
mod traverser;
mod wards;

pub use cancel::CancelToken;
pub use extractor::{DetailExtractor, Extraction};
pub use fetcher::{HttpFetcher, PageFetcher};
pub(crate) use fetcher::check_status;
pub use scraper_error::TraversalError;
pub use throttle::Throttle;
pub use traverser::{ward_index_url, IndexTraverser, WardResult};
pub use wards::{area_page_url, list_wards, parse_wards};
