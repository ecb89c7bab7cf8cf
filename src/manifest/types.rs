use serde::Deserialize;

/// One embedded object found inside a scanned file (e.g. an unpacked
/// archive member), located by its byte offset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubScan {
    pub offset: u64,
    /// Name of the scan that found it (`gzip`, `squashfs`, ...)
    pub name: String,
    pub size: u64,
}

/// Scan results for a single path, as stored in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Normalized, archive-relative path (no leading slash)
    pub path: String,
    /// Content hash; empty when the scanner produced no reports for this file
    pub checksum: String,
    pub size: u64,
    /// Free-text `file(1)`-style description
    pub magic: String,
    pub name: String,
    pub realpath: String,
    /// Tags in manifest order, duplicates removed
    pub tags: Vec<String>,
    /// Sorted by descending offset
    pub subscans: Vec<SubScan>,
}

impl ScanEntry {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            checksum: String::new(),
            size: 0,
            magic: String::new(),
            name: String::new(),
            realpath: String::new(),
            tags: Vec::new(),
            subscans: Vec::new(),
        }
    }

    pub fn with_checksum(mut self, checksum: &str) -> Self {
        self.checksum = checksum.to_string();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_magic(mut self, magic: &str) -> Self {
        self.magic = magic.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = dedup_tags(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_subscans(mut self, mut subscans: Vec<SubScan>) -> Self {
        sort_subscans(&mut subscans);
        self.subscans = subscans;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether page lookups by checksum are possible for this entry.
    pub fn has_reports(&self) -> bool {
        !self.checksum.is_empty()
    }

    /// Target of a symbolic link, parsed out of `magic`.
    ///
    /// The scanner writes ``symbolic link to `TARGET'``. Anything that does
    /// not follow that convention yields `None`.
    pub fn symlink_target(&self) -> Option<&str> {
        const MARKER: &str = "symbolic link to `";
        let start = self.magic.rfind(MARKER)? + MARKER.len();
        let rest = &self.magic[start..];
        let target = rest.strip_suffix('\'').unwrap_or(rest);
        if target.is_empty() {
            None
        } else {
            Some(target)
        }
    }
}

/// A sub-scan as handed to the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHighlight {
    pub offset: u64,
    pub name: String,
    pub size: u64,
}

impl From<&SubScan> for ScanHighlight {
    fn from(s: &SubScan) -> Self {
        Self {
            offset: s.offset,
            name: s.name.clone(),
            size: s.size,
        }
    }
}

/// Record layout of the `scandata` member. Every field is optional because
/// older scanner versions omit most of them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawRecord {
    pub checksum: Option<String>,
    pub size: Option<u64>,
    pub magic: Option<String>,
    pub realpath: Option<String>,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub scans: Option<Vec<RawScan>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawScan {
    pub offset: u64,
    pub scanname: String,
    pub size: u64,
}

impl RawRecord {
    pub(crate) fn into_entry(self, path: String) -> ScanEntry {
        let mut subscans: Vec<SubScan> = self
            .scans
            .unwrap_or_default()
            .into_iter()
            .map(|s| SubScan {
                offset: s.offset,
                name: s.scanname,
                size: s.size,
            })
            .collect();
        sort_subscans(&mut subscans);

        ScanEntry {
            path,
            checksum: self.checksum.unwrap_or_default(),
            size: self.size.unwrap_or(0),
            magic: self.magic.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            realpath: self.realpath.unwrap_or_default(),
            tags: dedup_tags(self.tags.unwrap_or_default()),
            subscans,
        }
    }
}

/// Most recent offset first, so nested structure reads bottom-up.
fn sort_subscans(subscans: &mut [SubScan]) {
    subscans.sort_by(|a, b| b.cmp(a));
}

fn dedup_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symlink_target_is_parsed_from_magic() {
        let entry = ScanEntry::new("bin/sh").with_magic("symbolic link to `../../bin/busybox'");
        assert_eq!(entry.symlink_target(), Some("../../bin/busybox"));
    }

    #[test]
    fn unconventional_magic_has_no_symlink_target() {
        assert_eq!(ScanEntry::new("a").with_magic("ELF 32-bit LSB").symlink_target(), None);
        assert_eq!(ScanEntry::new("a").with_magic("symbolic link to `'").symlink_target(), None);
        assert_eq!(
            ScanEntry::new("a").with_magic("symbolic link to `busybox").symlink_target(),
            Some("busybox")
        );
    }

    #[test]
    fn subscans_sorted_by_descending_offset() {
        let entry = ScanEntry::new("fw.bin").with_subscans(vec![
            SubScan { offset: 10, name: "gzip".into(), size: 5 },
            SubScan { offset: 300, name: "squashfs".into(), size: 50 },
            SubScan { offset: 42, name: "lzma".into(), size: 7 },
        ]);
        let offsets: Vec<u64> = entry.subscans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![300, 42, 10]);
    }

    #[test]
    fn duplicate_tags_collapse_keeping_first_position() {
        let entry = ScanEntry::new("a").with_tags(&["text", "static", "text"]);
        assert_eq!(entry.tags, vec!["text".to_string(), "static".to_string()]);
    }
}
