use regex::Regex;

use super::predicate;
use super::ExcludedTokens;
use crate::manifest::ScanManifest;
use crate::tree::arena::{FileTree, NodeId, NodeKind};

/// Name constraint typed into the search box. Matched anywhere in the
/// display label; text that is not a valid regex is matched literally.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    text: String,
    regex: Option<Regex>,
}

impl SearchPattern {
    pub fn new(text: &str) -> Self {
        let regex = match Regex::new(text) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::debug!("Search text '{}' is not a regex ({}), matching literally", text, e);
                None
            }
        };
        Self {
            text: text.to_string(),
            regex,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(name),
            None => name.contains(self.text.as_str()),
        }
    }
}

/// A visible row as walked by the presentation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub node: NodeId,
    /// Depth below the root (top-level rows are 1)
    pub depth: u16,
}

/// Structure-preserving filter over a built tree. Nodes are never removed;
/// visibility is recomputed from scratch on every query.
pub struct FilteredTreeView<'a> {
    tree: &'a FileTree,
    manifest: &'a ScanManifest,
    excluded: ExcludedTokens,
    search: Option<SearchPattern>,
    /// Prune empty directories regardless of the `emptydir` token
    force_prune: bool,
}

impl<'a> FilteredTreeView<'a> {
    pub fn new(tree: &'a FileTree, manifest: &'a ScanManifest) -> Self {
        Self {
            tree,
            manifest,
            excluded: ExcludedTokens::new(),
            search: None,
            force_prune: false,
        }
    }

    pub fn with_excluded(mut self, excluded: ExcludedTokens) -> Self {
        self.excluded = excluded;
        self
    }

    /// Set the name constraint. Non-empty text also turns on directory
    /// pruning so a search collapses branches without matches.
    pub fn with_search(mut self, text: &str) -> Self {
        self.set_search(text);
        self
    }

    pub fn set_excluded(&mut self, excluded: ExcludedTokens) {
        self.excluded = excluded;
    }

    pub fn set_search(&mut self, text: &str) {
        self.force_prune = !text.is_empty();
        self.search = if text.is_empty() {
            None
        } else {
            Some(SearchPattern::new(text))
        };
    }

    pub fn set_force_prune(&mut self, on: bool) {
        self.force_prune = on;
    }

    pub fn excluded(&self) -> &ExcludedTokens {
        &self.excluded
    }

    pub fn search_text(&self) -> &str {
        self.search.as_ref().map(|s| s.text()).unwrap_or("")
    }

    pub fn tree(&self) -> &'a FileTree {
        self.tree
    }

    pub fn manifest(&self) -> &'a ScanManifest {
        self.manifest
    }

    /// Whether directories without a visible descendant are hidden.
    pub fn prunes_empty_dirs(&self) -> bool {
        self.force_prune || self.excluded.prunes_empty_dirs()
    }

    fn file_visible(&self, id: NodeId) -> bool {
        let node = self.tree.get(id);
        if let Some(entry) = self.manifest.entry(&node.path) {
            if !predicate::visible(entry, &self.excluded) {
                return false;
            }
        }
        match &self.search {
            Some(pattern) => pattern.matches(&node.name),
            None => true,
        }
    }

    /// Whether the shell should render this row. The root is always visible.
    pub fn is_row_visible(&self, id: NodeId) -> bool {
        if id == self.tree.root {
            return true;
        }
        match self.tree.get(id).kind {
            NodeKind::File => self.file_visible(id),
            NodeKind::Directory => !self.prunes_empty_dirs() || self.has_visible_file(id),
        }
    }

    /// Whether any file below `dir` is visible. Under pruning a directory is
    /// visible exactly when this holds. Iterative so deep paths cannot
    /// exhaust the stack.
    fn has_visible_file(&self, dir: NodeId) -> bool {
        let mut stack: Vec<NodeId> = self.tree.children(dir).collect();
        while let Some(id) = stack.pop() {
            match self.tree.get(id).kind {
                NodeKind::File => {
                    if self.file_visible(id) {
                        return true;
                    }
                }
                NodeKind::Directory => stack.extend(self.tree.children(id)),
            }
        }
        false
    }

    /// Whether the row and all its ancestors are visible.
    pub fn is_path_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if !self.is_row_visible(node) {
                return false;
            }
            current = self.tree.get(node).parent;
        }
        true
    }

    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .children(id)
            .filter(|&c| self.is_row_visible(c))
            .collect()
    }

    /// Visibility of every node in one bottom-up pass, indexed by
    /// `NodeId::index()`. Same answers as `is_row_visible`.
    pub fn compute_visibility(&self) -> Vec<bool> {
        let prune = self.prunes_empty_dirs();
        let mut visible = vec![false; self.tree.len()];

        // Children always have higher indices than their parents
        for i in (0..self.tree.len()).rev() {
            let id = NodeId(i as u32);
            let node = self.tree.get(id);
            visible[i] = match node.kind {
                _ if id == self.tree.root => true,
                NodeKind::File => self.file_visible(id),
                NodeKind::Directory if prune => {
                    self.tree.children(id).any(|c| visible[c.index()])
                }
                NodeKind::Directory => true,
            };
        }

        visible
    }

    /// Visible rows in display order (pre-order), root excluded.
    pub fn rows(&self) -> Vec<VisibleRow> {
        let visible = self.compute_visibility();
        let mut rows = Vec::new();

        // Iterative pre-order walk; push children reversed so they pop in order
        let mut stack: Vec<NodeId> = self.tree.children(self.tree.root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if !visible[id.index()] {
                continue;
            }
            rows.push(VisibleRow {
                node: id,
                depth: self.tree.get(id).depth,
            });
            let mut children: Vec<NodeId> = self.tree.children(id).collect();
            children.reverse();
            stack.extend(children);
        }

        rows
    }

    /// Number of visible rows below the root.
    pub fn visible_count(&self) -> usize {
        self.compute_visibility().iter().skip(1).filter(|v| **v).count()
    }
}
