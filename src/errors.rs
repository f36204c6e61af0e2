// errors.rs
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::scraper::TraversalError;

/// Which scraped field a `ParseError` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AgeYears,
    Floor,
    Price,
    SquareMeters,
    WalkMinutes,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::AgeYears => "age",
            Field::Floor => "floor",
            Field::Price => "price",
            Field::SquareMeters => "square meters",
            Field::WalkMinutes => "walk minutes",
        };
        f.write_str(name)
    }
}

/// A raw text token that could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad {field}: {raw:?}")]
pub struct ParseError {
    pub field: Field,
    pub raw: String,
}

impl ParseError {
    pub fn new(field: Field, raw: &str) -> Self {
        Self {
            field,
            raw: raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("no geocode results for neighborhood {neighborhood:?}")]
    NoResults { neighborhood: String },

    #[error("geocode lookup failed for neighborhood {neighborhood:?}: {message}")]
    Lookup {
        neighborhood: String,
        message: String,
    },

    #[error("geocode lookup cancelled for neighborhood {neighborhood:?}")]
    Cancelled { neighborhood: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        PersistenceError::Json {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordErrorKind {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// One building or unit that could not be turned into a listing.
/// `unit` is `None` when the failure applies to the whole building, in which
/// case `dropped` counts every unit row lost with it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{ward_name} ({ward_code}) / {title:?} @ {neighborhood:?}{}: {kind}", unit_suffix(.unit, .dropped))]
pub struct RecordError {
    pub ward_code: String,
    pub ward_name: String,
    pub title: String,
    pub neighborhood: String,
    pub unit: Option<usize>,
    pub dropped: usize,
    pub kind: RecordErrorKind,
}

fn unit_suffix(unit: &Option<usize>, dropped: &usize) -> String {
    match unit {
        Some(i) => format!(" unit #{i}"),
        None => format!(" ({dropped} units)"),
    }
}

/// Failure of one ward as a whole. Siblings carry on.
#[derive(Debug, Error)]
pub enum WardError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("unknown prefecture code {0:?}")]
    UnknownPrefecture(String),
}

/// Top-level failure of a run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Traversal(#[from] TraversalError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}
