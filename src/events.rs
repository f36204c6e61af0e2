// events.rs
//
// Progress of a crawl as a stream of events. The core only ever talks to an
// `Observer`; where the events end up (log, UI, test assertions) is the
// observer's business.

use tracing::{debug, info, warn};

use crate::errors::RecordError;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    WardStarted {
        ward_code: String,
        ward_name: String,
    },
    WardSkipped {
        ward_code: String,
        ward_name: String,
    },
    PageVisited {
        ward_code: String,
        page: usize,
        url: String,
        records: usize,
    },
    RecordExtracted {
        ward_code: String,
        title: String,
    },
    RecordFailed(RecordError),
    PageLimitReached {
        ward_code: String,
        pages: usize,
    },
    WardFinished {
        ward_code: String,
        ward_name: String,
        pages: usize,
        records: usize,
        failures: usize,
    },
    WardFailed {
        ward_code: String,
        ward_name: String,
        error: String,
    },
}

pub trait Observer: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Turns events into log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::WardStarted {
                ward_code,
                ward_name,
            } => info!("Fetching {ward_name} ({ward_code})"),
            ProgressEvent::WardSkipped {
                ward_code,
                ward_name,
            } => info!("Data already exists for {ward_name} ({ward_code}), skipping"),
            ProgressEvent::PageVisited {
                ward_code,
                page,
                url,
                records,
            } => info!(ward = %ward_code, page, records, "Visited page {url}"),
            ProgressEvent::RecordExtracted { ward_code, title } => {
                debug!(ward = %ward_code, "Extracted {title}")
            }
            ProgressEvent::RecordFailed(err) => warn!("Skipping record: {err}"),
            ProgressEvent::PageLimitReached { ward_code, pages } => {
                warn!(ward = %ward_code, "Stopped after {pages} pages, pagination did not end")
            }
            ProgressEvent::WardFinished {
                ward_code,
                ward_name,
                pages,
                records,
                failures,
            } => info!(
                ward = %ward_code,
                pages,
                records,
                failures,
                "Finished {ward_name}"
            ),
            ProgressEvent::WardFailed {
                ward_code,
                ward_name,
                error,
            } => warn!(ward = %ward_code, "Failed {ward_name}: {error}"),
        }
    }
}
