pub mod predicate;
pub mod view;

use std::collections::BTreeSet;

pub use self::predicate::visible;
pub use self::view::FilteredTreeView;

/// Pseudo-token hiding zero-size files.
pub const EMPTY_TOKEN: &str = "empty";
/// Pseudo-token hiding directories with no visible descendant.
pub const EMPTYDIR_TOKEN: &str = "emptydir";

/// Flat set of tokens currently excluded from the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedTokens(BTreeSet<String>);

impl ExcludedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn insert(&mut self, token: &str) {
        self.0.insert(token.to_string());
    }

    pub fn hides_empty_files(&self) -> bool {
        self.contains(EMPTY_TOKEN)
    }

    pub fn prunes_empty_dirs(&self) -> bool {
        self.contains(EMPTYDIR_TOKEN)
    }

    pub fn is_subset(&self, other: &ExcludedTokens) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ExcludedTokens {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        ExcludedTokens(iter.into_iter().map(str::to_string).collect())
    }
}

/// A user-facing filter: a label plus the tag tokens it hides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    pub tokens: Vec<String>,
    pub label: String,
}

impl FilterGroup {
    pub fn new(tokens: &[&str], label: &str) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            label: label.to_string(),
        }
    }
}

/// Ordered filter groups and which of them are enabled.
#[derive(Debug, Clone)]
pub struct FilterSet {
    groups: Vec<FilterGroup>,
    active: Vec<bool>,
}

impl FilterSet {
    pub fn new(groups: Vec<FilterGroup>) -> Self {
        let active = vec![false; groups.len()];
        Self { groups, active }
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Enable or disable the group at `index`. Returns false for an unknown index.
    pub fn set_active(&mut self, index: usize, on: bool) -> bool {
        match self.active.get_mut(index) {
            Some(slot) => {
                *slot = on;
                true
            }
            None => false,
        }
    }

    /// Enable or disable a group by label. Returns false for an unknown label.
    pub fn set_active_by_label(&mut self, label: &str, on: bool) -> bool {
        match self.groups.iter().position(|g| g.label == label) {
            Some(index) => self.set_active(index, on),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.active.iter_mut().for_each(|a| *a = false);
    }

    /// Labels of the enabled groups, in group order.
    pub fn active_labels(&self) -> Vec<&str> {
        self.groups
            .iter()
            .zip(&self.active)
            .filter(|(_, on)| **on)
            .map(|(g, _)| g.label.as_str())
            .collect()
    }

    /// Union of the tokens of every enabled group.
    pub fn excluded_tokens(&self) -> ExcludedTokens {
        self.groups
            .iter()
            .zip(&self.active)
            .filter(|(_, on)| **on)
            .flat_map(|(g, _)| g.tokens.iter().map(|t| t.as_str()))
            .collect()
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new(vec![
            FilterGroup::new(&["audio", "mp3", "ogg"], "Audio files"),
            FilterGroup::new(&["duplicate"], "Duplicate files"),
            FilterGroup::new(
                &[EMPTYDIR_TOKEN],
                "Empty directories (after filters have been applied)",
            ),
            FilterGroup::new(&[EMPTY_TOKEN], "Empty files"),
            FilterGroup::new(&["png", "bmp", "jpg", "gif", "graphics"], "Graphics files"),
            FilterGroup::new(&["pdf"], "PDF files"),
            FilterGroup::new(&["resource"], "Resource files"),
            FilterGroup::new(&["symlink"], "Symbolic links"),
            FilterGroup::new(&["text", "xml"], "Text files"),
            FilterGroup::new(&["video", "mp4"], "Video files"),
        ])
    }
}
