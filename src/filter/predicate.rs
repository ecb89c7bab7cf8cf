use super::{ExcludedTokens, EMPTYDIR_TOKEN, EMPTY_TOKEN};
use crate::manifest::ScanEntry;

/// Attribute filter for one manifest entry. Knows nothing about tree shape.
///
/// Hidden when any tag is an excluded token (the `empty`/`emptydir`
/// pseudo-tokens excepted), or when the entry is zero-size and `empty` is
/// excluded. Visible otherwise.
pub fn visible(entry: &ScanEntry, excluded: &ExcludedTokens) -> bool {
    let tag_excluded = entry
        .tags
        .iter()
        .map(|t| t.as_str())
        .filter(|t| *t != EMPTY_TOKEN && *t != EMPTYDIR_TOKEN)
        .any(|t| excluded.contains(t));
    if tag_excluded {
        return false;
    }
    if entry.size == 0 && excluded.hides_empty_files() {
        return false;
    }
    true
}
