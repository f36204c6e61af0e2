// traverser.rs
use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::domain::{Listing, Ward};
use crate::errors::RecordError;
use crate::events::{Observer, ProgressEvent};
use crate::geocode::NeighborhoodResolver;
use crate::scraper::extractor::selector;
use crate::scraper::{CancelToken, DetailExtractor, Extraction, PageFetcher, TraversalError};

const INDEX_URL: &str = "https://suumo.jp/jj/chintai/ichiran/FR301FC001/";

/// Link text of the pagination control's "next page" anchor.
const NEXT_LABEL: &str = "次へ";

/// Everything collected for one ward.
#[derive(Debug)]
pub struct WardResult {
    pub ward: Ward,
    pub listings: Vec<Listing>,
    pub failures: Vec<RecordError>,
    pub pages: usize,
    /// Pagination still had a next page when the page cap was hit.
    pub truncated: bool,
}

impl WardResult {
    /// Unit rows lost to record failures, counting every unit of a failed
    /// building.
    pub fn dropped_units(&self) -> usize {
        self.failures.iter().map(|f| f.dropped).sum()
    }
}

/// First page of a ward's listing index, all filters wide open.
pub fn ward_index_url(ward: &Ward) -> Result<Url, TraversalError> {
    Url::parse_with_params(
        INDEX_URL,
        &[
            ("ar", "030"),
            ("bs", "040"),
            ("ta", ward.prefecture.code.as_str()),
            ("sc", ward.code.as_str()),
            ("cb", "0.0"),
            ("ct", "9999999"),
            ("mb", "0"),
            ("mt", "9999999"),
            ("et", "9999999"),
            ("cn", "9999999"),
            ("shkr1", "03"),
            ("shkr2", "03"),
            ("shkr3", "03"),
            ("shkr4", "03"),
            ("sngz", ""),
            ("po1", "25"),
            ("pc", "10"),
            ("page", "1"),
        ],
    )
    .map_err(|e| TraversalError::InvalidUrl(e.to_string()))
}

/// Walks one ward's paginated listing index, page after page, following the
/// "next" link until there is none.
pub struct IndexTraverser<'a> {
    fetcher: &'a dyn PageFetcher,
    resolver: &'a dyn NeighborhoodResolver,
    observer: &'a dyn Observer,
    extractor: DetailExtractor,
    building: Selector,
    next_link: Selector,
    max_pages: usize,
}

impl<'a> IndexTraverser<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        resolver: &'a dyn NeighborhoodResolver,
        observer: &'a dyn Observer,
        max_pages: usize,
    ) -> Result<Self, TraversalError> {
        Ok(Self {
            fetcher,
            resolver,
            observer,
            extractor: DetailExtractor::new()?,
            building: selector(".l-cassetteitem > li")?,
            next_link: selector(".pagination p.pagination-parts:last-of-type a")?,
            max_pages: max_pages.max(1),
        })
    }

    pub fn traverse(&self, ward: &Ward, cancel: &CancelToken) -> Result<WardResult, TraversalError> {
        self.traverse_from(ward, ward_index_url(ward)?, cancel)
    }

    pub fn traverse_from(
        &self,
        ward: &Ward,
        start: Url,
        cancel: &CancelToken,
    ) -> Result<WardResult, TraversalError> {
        let mut result = WardResult {
            ward: ward.clone(),
            listings: Vec::new(),
            failures: Vec::new(),
            pages: 0,
            truncated: false,
        };
        let mut visited = HashSet::new();
        let mut next = Some(start);

        while let Some(url) = next.take() {
            if cancel.is_cancelled() {
                return Err(TraversalError::Cancelled);
            }

            if result.pages >= self.max_pages {
                result.truncated = true;
                self.observer.on_event(&ProgressEvent::PageLimitReached {
                    ward_code: ward.code.clone(),
                    pages: result.pages,
                });
                break;
            }

            if !visited.insert(url.clone()) {
                warn!(ward = %ward.code, "Next link points back to {url}, stopping");
                break;
            }

            let html = self.fetcher.fetch(&url, cancel)?;
            let (page, next_url) = self.visit_page(&html, &url, ward, cancel)?;
            result.pages += 1;

            self.observer.on_event(&ProgressEvent::PageVisited {
                ward_code: ward.code.clone(),
                page: result.pages,
                url: url.to_string(),
                records: page.listings.len(),
            });
            for listing in &page.listings {
                self.observer.on_event(&ProgressEvent::RecordExtracted {
                    ward_code: ward.code.clone(),
                    title: listing.title.clone(),
                });
            }
            for failure in &page.failures {
                self.observer.on_event(&ProgressEvent::RecordFailed(failure.clone()));
            }

            result.listings.extend(page.listings);
            result.failures.extend(page.failures);
            next = next_url;
        }

        Ok(result)
    }

    /// Extracts every building on the page and finds the next page, if any.
    fn visit_page(
        &self,
        html: &str,
        url: &Url,
        ward: &Ward,
        cancel: &CancelToken,
    ) -> Result<(Extraction, Option<Url>), TraversalError> {
        let document = Html::parse_document(html);
        let mut page = Extraction::default();

        for building in document.select(&self.building) {
            page.append(self.extractor.extract(building, ward, self.resolver, cancel));
            if cancel.is_cancelled() {
                return Err(TraversalError::Cancelled);
            }
        }

        let next = document
            .select(&self.next_link)
            .find(|a| a.text().collect::<String>().trim() == NEXT_LABEL)
            .and_then(|a| a.value().attr("href"))
            .map(|href| {
                url.join(href)
                    .map_err(|e| TraversalError::InvalidUrl(format!("{href}: {e}")))
            })
            .transpose()?;

        Ok((page, next))
    }
}
