use crate::manifest::{normalize_path, MANIFEST_MEMBERS};

pub const REPORTS_PREFIX: &str = "reports/";
pub const IMAGES_PREFIX: &str = "images/";

/// Report pages extracted at open time in reduced mode.
pub const REDUCED_REPORT_SUFFIXES: [&str; 6] = [
    "unique.html.gz",
    "unmatched.html.gz",
    "assigned.html.gz",
    "guireport.html.gz",
    "elfreport.html.gz",
    "names.html.gz",
];

/// File name length of per-hash image assets (64 hex digits + `.png`).
pub const HASHED_ASSET_NAME_LEN: usize = 68;

/// Page name of the lazily extracted hex dump.
pub const HEXDUMP_PAGE: &str = "hexdump";

/// How much of the archive is materialized when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Whitelisted report pages and small image assets only
    Reduced,
    /// Every report and image (hex dumps still lazy)
    Advanced,
}

impl ExtractionMode {
    pub fn from_advanced(advanced: bool) -> Self {
        if advanced {
            ExtractionMode::Advanced
        } else {
            ExtractionMode::Reduced
        }
    }
}

/// Archive member name in canonical form (`./reports/x` → `reports/x`).
pub fn member_name(raw: &str) -> String {
    normalize_path(raw)
}

pub fn is_manifest(member: &str) -> bool {
    MANIFEST_MEMBERS.contains(&member)
}

fn base_name(member: &str) -> &str {
    member.rsplit('/').next().unwrap_or(member)
}

/// Hex-dump members are never extracted at open time.
pub fn is_hexdump(member: &str) -> bool {
    member.starts_with(REPORTS_PREFIX) && member.ends_with(&format!("-{}.gz", HEXDUMP_PAGE))
}

/// Whether `member` is materialized when the archive is opened.
pub fn select_at_open(member: &str, mode: ExtractionMode) -> bool {
    if is_manifest(member) {
        return true;
    }
    if is_hexdump(member) {
        return false;
    }
    match mode {
        ExtractionMode::Advanced => {
            member.starts_with(REPORTS_PREFIX) || member.starts_with(IMAGES_PREFIX)
        }
        ExtractionMode::Reduced => {
            if member.starts_with(REPORTS_PREFIX) {
                REDUCED_REPORT_SUFFIXES.iter().any(|s| member.ends_with(s))
            } else if member.starts_with(IMAGES_PREFIX) {
                base_name(member).len() != HASHED_ASSET_NAME_LEN
            } else {
                false
            }
        }
    }
}

/// Member holding `page` for `checksum`, HTML-wrapped or raw.
pub fn report_member(checksum: &str, page: &str, html: bool) -> String {
    if html {
        format!("{}{}-{}.html.gz", REPORTS_PREFIX, checksum, page)
    } else {
        format!("{}{}-{}.gz", REPORTS_PREFIX, checksum, page)
    }
}
