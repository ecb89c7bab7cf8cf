use crate::manifest::ScanEntry;

/// Mask shown on every directory row (circled D).
pub const DIRECTORY_GLYPH: &str = "\u{24b9}";

/// Mask replacing the tag glyphs of zero-size files.
pub const EMPTY_FILE_GLYPH: &str = "\u{2205}";

/// Glyph for a scanner tag, if the tag has one.
pub fn tag_glyph(tag: &str) -> Option<&'static str> {
    match tag {
        "text" => Some("\u{24c9}"),
        "graphics" => Some("\u{24bc}"),
        "compressed" => Some("\u{24b8}"),
        "resource" => Some("\u{24c7}"),
        "static" => Some("\u{24c8}"),
        "dalvik" => Some("\u{24b6}"),
        "ranking" => Some("\u{272a}"),
        "linuxkernel" => Some("\u{24c1}"),
        "duplicate" => Some("\u{229c}"),
        _ => None,
    }
}

/// Glyph string for a file: one glyph per known tag, in manifest tag order.
/// Zero-size files show only the empty-file glyph.
pub fn file_mask(entry: &ScanEntry) -> String {
    if entry.size == 0 {
        return EMPTY_FILE_GLYPH.to_string();
    }
    let mut mask = String::new();
    for glyph in entry.tags.iter().filter_map(|t| tag_glyph(t)) {
        mask.push_str("  ");
        mask.push_str(glyph);
    }
    mask
}

/// Display label for a file: its last path segment, with the link target
/// appended for symlinks.
pub fn file_label(segment: &str, entry: &ScanEntry) -> String {
    if entry.has_tag("symlink") {
        if let Some(target) = entry.symlink_target() {
            return format!("{} \u{2192} {}", segment, target);
        }
    }
    segment.to_string()
}
