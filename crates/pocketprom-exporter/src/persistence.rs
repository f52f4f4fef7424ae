//! Counter persistence file (`metrics.json` in the data directory).
//!
//! A missing, unreadable, or undecodable file all mean "no prior state";
//! the three cases differ only in what gets logged. Any such load leaves the
//! file dirty so the canonical document is written back on the next save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pocketprom_core::{PersistedCounters, PersistedDocument};

pub const PERSISTENCE_FILE: &str = "metrics.json";

#[derive(Debug)]
pub struct PersistenceFile {
    path: PathBuf,
    dirty: bool,
}

impl PersistenceFile {
    pub fn new(data_dir: &Path) -> Self {
        Self { path: data_dir.join(PERSISTENCE_FILE), dirty: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn load(&mut self) -> Option<PersistedCounters> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.dirty = true;
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unable to read metrics persistence file, starting fresh"
                );
                self.dirty = true;
                return None;
            }
        };

        match PersistedDocument::decode(&contents) {
            Ok(doc) => Some(doc.into()),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    kind = e.kind().as_str(),
                    "failed to decode metrics persistence file, starting fresh"
                );
                self.dirty = true;
                None
            }
        }
    }

    /// Write `counters` if dirty. Returns true when the file is clean
    /// afterwards; on failure the dirty flag stays set for the next trigger.
    pub fn save(&mut self, counters: &PersistedCounters) -> bool {
        if !self.dirty {
            return true;
        }

        let payload = match counters.to_json_pretty() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode metrics persistence payload");
                return false;
            }
        };

        if let Err(e) = fs::write(&self.path, payload) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write metrics persistence file"
            );
            return false;
        }

        self.dirty = false;
        true
    }
}
