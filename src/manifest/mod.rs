mod pickle;
pub mod types;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, ViewerError};

use self::types::RawRecord;
pub use self::types::{ScanEntry, ScanHighlight, SubScan};

/// A manifest record decoded on its own, or why it could not be.
pub(crate) type DecodedRecord = std::result::Result<RawRecord, String>;

/// Archive-root member names the manifest may be stored under, in lookup order.
pub const MANIFEST_MEMBERS: [&str; 2] = ["scandata.json", "scandata.pickle"];

/// Flat scan results keyed by normalized path. Read-only once loaded.
#[derive(Debug, Default, Clone)]
pub struct ScanManifest {
    entries: BTreeMap<String, ScanEntry>,
}

impl ScanManifest {
    /// Build a manifest from already-typed entries, normalizing their paths.
    pub fn from_entries(entries: impl IntoIterator<Item = ScanEntry>) -> Self {
        let mut manifest = ScanManifest::default();
        for mut entry in entries {
            let path = normalize_path(&entry.path);
            entry.path = path.clone();
            manifest.insert(path, entry);
        }
        manifest
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_reader(reader)
            .map_err(|e| ViewerError::ManifestMissing(format!("invalid JSON manifest: {}", e)))?;
        let records = raw
            .into_iter()
            .map(|(key, value)| {
                let decoded = serde_json::from_value::<RawRecord>(value).map_err(|e| e.to_string());
                (key, decoded)
            })
            .collect();
        Ok(Self::from_records(records))
    }

    /// Decode a manifest pickled by the BAT scanner. Byte-string keys and
    /// values that are not valid UTF-8 are decoded with replacement.
    pub fn from_pickle_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_records(pickle::read_records(reader)?))
    }

    /// Load the manifest from an extraction workspace.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        for member in MANIFEST_MEMBERS {
            let candidate = dir.join(member);
            if !candidate.is_file() {
                continue;
            }
            tracing::debug!("Loading scan manifest from {}", candidate.display());
            let reader = BufReader::new(File::open(&candidate)?);
            let manifest = if member.ends_with(".json") {
                Self::from_json_reader(reader)?
            } else {
                Self::from_pickle_reader(reader)?
            };
            tracing::info!("Scan manifest loaded: {} entries", manifest.len());
            return Ok(manifest);
        }
        Err(ViewerError::ManifestMissing(format!(
            "none of {:?} found in archive",
            MANIFEST_MEMBERS
        )))
    }

    /// Records with the wrong shape are skipped with a warning; the rest of
    /// the manifest still loads.
    fn from_records(mut records: Vec<(String, DecodedRecord)>) -> Self {
        // Sort keys first so duplicate resolution does not depend on hash order
        records.sort_by(|a, b| a.0.cmp(&b.0));

        let mut manifest = ScanManifest::default();
        for (key, record) in records {
            let record = match record {
                Ok(record) => record,
                Err(reason) => {
                    tracing::warn!("Skipping malformed manifest record '{}': {}", key, reason);
                    continue;
                }
            };
            let path = normalize_path(&key);
            let entry = record.into_entry(path.clone());
            manifest.insert(path, entry);
        }
        manifest
    }

    fn insert(&mut self, path: String, entry: ScanEntry) {
        if path.is_empty() {
            tracing::warn!("Skipping manifest entry with empty path");
            return;
        }
        match self.entries.entry(path) {
            Entry::Occupied(existing) => {
                tracing::warn!("Duplicate manifest path '{}', keeping first", existing.key());
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    pub fn entry(&self, path: &str) -> Option<&ScanEntry> {
        self.entries.get(path)
    }

    /// Checksum for a path, `None` when the path is unknown or has no reports.
    pub fn checksum_for(&self, path: &str) -> Option<&str> {
        self.entries
            .get(path)
            .filter(|e| e.has_reports())
            .map(|e| e.checksum.as_str())
    }

    pub fn contains_checksum(&self, checksum: &str) -> bool {
        !checksum.is_empty() && self.entries.values().any(|e| e.checksum == checksum)
    }

    /// Sub-scans of a path, most recent offset first.
    pub fn scan_highlights(&self, path: &str) -> Vec<ScanHighlight> {
        self.entries
            .get(path)
            .map(|e| e.subscans.iter().map(ScanHighlight::from).collect())
            .unwrap_or_default()
    }

    /// Paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize an archive-relative path: no leading slash, no empty or `.`
/// segments, `..` folds into its parent.
pub fn normalize_path(raw: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Directory part of a normalized path; `""` for top-level entries.
pub fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}
