// store.rs
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::Coordinate;
use crate::errors::PersistenceError;

/// Keys longer than this are stored under their hash instead.
const MAX_FILE_STEM_BYTES: usize = 200;

/// One JSON file per neighborhood, `{ "lat": .., "lon": .. }`.
/// Files are only ever created, never rewritten.
#[derive(Debug, Clone)]
pub struct GeocodeStore {
    dir: PathBuf,
}

impl GeocodeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The key is used verbatim as the file name when it is a safe one,
    /// otherwise its SHA-256 is.
    pub fn path_for(&self, neighborhood: &str) -> PathBuf {
        let stem = if is_safe_file_stem(neighborhood) {
            neighborhood.to_string()
        } else {
            format!("sha256-{:x}", Sha256::digest(neighborhood.as_bytes()))
        };
        self.dir.join(format!("{stem}.json"))
    }

    pub fn load(&self, neighborhood: &str) -> Result<Option<Coordinate>, PersistenceError> {
        let path = self.path_for(neighborhood);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(path, e)),
        };

        serde_json::from_reader(BufReader::new(file))
            .map(Some)
            .map_err(|e| PersistenceError::json(path, e))
    }

    /// Fails if the file already exists. The entry is written to a hidden
    /// temporary sibling and only linked into place once complete, so an
    /// interrupted save never leaves a partial entry behind.
    pub fn save(&self, neighborhood: &str, coordinate: &Coordinate) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let path = self.path_for(neighborhood);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, coordinate)
                .map_err(|e| PersistenceError::json(&path, e))?;
            writer.flush().map_err(|e| PersistenceError::io(&path, e))?;
        }

        // Dropping the temporary (on any error above or here) removes it.
        tmp.persist_noclobber(&path)
            .map(drop)
            .map_err(|e| PersistenceError::io(&path, e.error))
    }
}

fn is_safe_file_stem(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_FILE_STEM_BYTES
        && !key.starts_with('.')
        && !key.starts_with("sha256-")
        && !key
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control())
}
