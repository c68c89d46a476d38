//! `journal.json`: the list of captured sessions and their scripts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub session: String,
    pub script_path: PathBuf,
    pub windows: usize,
    pub panes: usize,
    pub captured_at: DateTime<Utc>,
    /// SHA-256 of the script as written at capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_sha256: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Journal {
    /// Load the journal; a missing file is an empty journal.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(Error::io(format!("Failed to read {}", path.display()))(err)),
        };
        serde_json::from_str(&raw).map_err(|source| Error::Journal {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(Error::io(format!("Failed to create {}", dir.display())))?;
        }
        let mut json = serde_json::to_string_pretty(self).map_err(|source| Error::Journal {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        fs::write(path, json).map_err(Error::io(format!("Failed to write {}", path.display())))
    }

    /// Replace the entry for the same session (or add it), keeping entries
    /// sorted by session name.
    pub fn upsert(&mut self, entry: Entry) {
        match self.entries.iter_mut().find(|e| e.session == entry.session) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self.entries.sort_by(|a, b| a.session.cmp(&b.session));
    }

    pub fn find(&self, session: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.session == session)
    }
}

pub fn script_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
