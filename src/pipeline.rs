// pipeline.rs
//
// Ward-level orchestration: skip wards that already have an output file,
// traverse the rest on a small worker pool, write each ward's listings once
// its traversal has fully completed.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::domain::{Listing, Ward};
use crate::errors::{PersistenceError, WardError};
use crate::events::{Observer, ProgressEvent};
use crate::geocode::NeighborhoodResolver;
use crate::scraper::{CancelToken, IndexTraverser, PageFetcher};

/// `failures` counts unit rows lost, not failure reports.
#[derive(Debug)]
pub enum WardOutcome {
    Fetched { records: usize, failures: usize },
    Skipped,
    Failed(WardError),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fetched: usize,
    pub skipped: usize,
    pub failed: usize,
    pub records: usize,
    pub record_failures: usize,
}

pub fn listing_path(dir: &Path, ward: &Ward) -> PathBuf {
    dir.join(format!("{}.json", ward.code))
}

/// Writes the whole array to a temporary sibling, then renames it into place.
/// The temporary is removed on every failure path.
pub fn write_listings(path: &Path, listings: &[Listing]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, listings)
            .map_err(|e| PersistenceError::json(path, e))?;
        writer.flush().map_err(|e| PersistenceError::io(path, e))?;
    }

    tmp.persist(path)
        .map(drop)
        .map_err(|e| PersistenceError::io(path, e.error))
}

pub struct Pipeline<'a> {
    fetcher: &'a dyn PageFetcher,
    resolver: &'a dyn NeighborhoodResolver,
    observer: &'a dyn Observer,
    listings_dir: PathBuf,
    max_pages: usize,
    workers: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        resolver: &'a dyn NeighborhoodResolver,
        observer: &'a dyn Observer,
        listings_dir: impl Into<PathBuf>,
        max_pages: usize,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            observer,
            listings_dir: listings_dir.into(),
            max_pages,
            workers: workers.max(1),
        }
    }

    /// Fetches one ward unless its output file already exists.
    pub fn fetch_ward(&self, ward: &Ward, cancel: &CancelToken) -> WardOutcome {
        let path = listing_path(&self.listings_dir, ward);

        if path.exists() {
            self.observer.on_event(&ProgressEvent::WardSkipped {
                ward_code: ward.code.clone(),
                ward_name: ward.name.clone(),
            });
            return WardOutcome::Skipped;
        }

        self.observer.on_event(&ProgressEvent::WardStarted {
            ward_code: ward.code.clone(),
            ward_name: ward.name.clone(),
        });

        match self.traverse_and_write(ward, &path, cancel) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.observer.on_event(&ProgressEvent::WardFailed {
                    ward_code: ward.code.clone(),
                    ward_name: ward.name.clone(),
                    error: error.to_string(),
                });
                WardOutcome::Failed(error)
            }
        }
    }

    fn traverse_and_write(
        &self,
        ward: &Ward,
        path: &Path,
        cancel: &CancelToken,
    ) -> Result<WardOutcome, WardError> {
        let traverser =
            IndexTraverser::new(self.fetcher, self.resolver, self.observer, self.max_pages)?;

        let result = traverser.traverse(ward, cancel)?;

        write_listings(path, &result.listings)?;

        self.observer.on_event(&ProgressEvent::WardFinished {
            ward_code: ward.code.clone(),
            ward_name: ward.name.clone(),
            pages: result.pages,
            records: result.listings.len(),
            failures: result.dropped_units(),
        });

        Ok(WardOutcome::Fetched {
            records: result.listings.len(),
            failures: result.dropped_units(),
        })
    }

    /// Runs every ward, at most `workers` at a time. A failed ward never
    /// stops its siblings.
    pub fn run(&self, wards: &[Ward], cancel: &CancelToken) -> RunSummary {
        let started_at = Utc::now();
        let next = AtomicUsize::new(0);
        let outcomes = Mutex::new(Vec::with_capacity(wards.len()));

        std::thread::scope(|s| {
            for _ in 0..self.workers.min(wards.len()) {
                s.spawn(|| loop {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    let Some(ward) = wards.get(i) else {
                        break;
                    };
                    let outcome = self.fetch_ward(ward, cancel);
                    outcomes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(outcome);
                });
            }
        });

        let mut summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            fetched: 0,
            skipped: 0,
            failed: 0,
            records: 0,
            record_failures: 0,
        };

        for outcome in outcomes.into_inner().unwrap_or_else(PoisonError::into_inner) {
            match outcome {
                WardOutcome::Fetched { records, failures } => {
                    summary.fetched += 1;
                    summary.records += records;
                    summary.record_failures += failures;
                }
                WardOutcome::Skipped => summary.skipped += 1,
                WardOutcome::Failed(_) => summary.failed += 1,
            }
        }

        summary
    }
}
