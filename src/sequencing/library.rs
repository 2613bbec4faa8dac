//! Melody files on disk.
//!
//! A library is a directory of `<name>.txt` melody files. Listings are
//! sorted by name and capped, so the browser never has to page through an
//! unbounded directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

use super::{
    format::{load_melody, save_melody},
    melody::Melody,
};

/// File extension melody files are stored with.
pub const MELODY_EXTENSION: &str = "txt";

/// Default cap on how many melodies a listing returns.
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// One melody file found in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MelodyEntry {
    /// File stem, shown to the user
    pub name: String,
    pub path: PathBuf,
}

/// A directory of melody files.
#[derive(Debug, Clone)]
pub struct MelodyLibrary {
    dir: PathBuf,
    max_entries: usize,
}

impl MelodyLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Cap the number of entries [`scan`](Self::scan) returns.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// List melody files, sorted by name, at most `max_entries` long.
    pub fn scan(&self) -> Result<Vec<MelodyEntry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = match dir_entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Failed to read entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(MELODY_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                entries.push(MelodyEntry {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        if entries.len() > self.max_entries {
            tracing::warn!(
                "{} melodies in {}, listing the first {}",
                entries.len(),
                self.dir.display(),
                self.max_entries
            );
            entries.truncate(self.max_entries);
        }
        tracing::debug!(count = entries.len(), dir = %self.dir.display(), "scanned melody library");
        Ok(entries)
    }

    pub fn load(&self, entry: &MelodyEntry) -> Result<Melody> {
        load_melody(&entry.path)
    }

    /// Path a melody with this name is stored at.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{MELODY_EXTENSION}")))
    }

    /// Save under `<name>.txt`, returning the written path.
    pub fn save(&self, name: &str, melody: &Melody) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        save_melody(&path, melody)?;
        Ok(path)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.chars().any(char::is_control);
    if plain {
        Ok(())
    } else {
        Err(Error::InvalidMelodyName(name.to_string()))
    }
}
