use std::path::Path;

use crate::archive::pages::no_report_html;
use crate::archive::selection::HEXDUMP_PAGE;
use crate::archive::{ArchiveReportStore, StoreOptions};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::filter::{FilterSet, FilteredTreeView};
use crate::manifest::{ScanHighlight, ScanManifest};
use crate::tree::arena::FileTree;
use crate::tree::build_tree;
use crate::tree::outline::format_size;

/// Application state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// No archive opened yet (or the last one was closed)
    NoArchive,
    /// An archive is open and its tree is built
    Ready,
}

/// Result of activating a tree row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The path has reports; the shell fetches pages by path
    Selected { path: String },
    /// No reports exist for the path; describe it from manifest metadata
    WithoutReport {
        path: String,
        name: String,
        realpath: String,
        size: u64,
        magic: String,
    },
}

impl Activation {
    /// One-line description for rows without reports.
    pub fn describe(&self) -> Option<String> {
        match self {
            Activation::Selected { .. } => None,
            Activation::WithoutReport {
                path,
                name,
                realpath,
                size,
                magic,
            } => {
                let name = if name.is_empty() { path.as_str() } else { name.as_str() };
                let mut out = format!("{} ({})", name, format_size(*size));
                if !realpath.is_empty() {
                    out.push_str(&format!(" in {}", realpath));
                }
                if !magic.is_empty() {
                    out.push_str(&format!(": {}", magic));
                }
                Some(out)
            }
        }
    }
}

/// Everything belonging to one opened archive.
pub struct Session {
    pub store: ArchiveReportStore,
    pub tree: FileTree,
}

impl Session {
    pub fn manifest(&self) -> &ScanManifest {
        self.store.manifest()
    }
}

/// Top-level application state behind the presentation shell.
pub struct App {
    pub phase: AppPhase,
    pub config: ViewerConfig,
    pub filters: FilterSet,
    session: Option<Session>,
    find_text: String,
    /// Prune empty directories independent of the `emptydir` filter
    force_prune: bool,
    selected: Option<String>,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            phase: AppPhase::NoArchive,
            config,
            filters: FilterSet::default(),
            session: None,
            find_text: String::new(),
            force_prune: false,
            selected: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Open an archive and make it the current session.
    ///
    /// The previous session is replaced (and its workspace removed) only
    /// once the new archive opened successfully; a failed open leaves it
    /// untouched. The previously selected path is re-selected when the
    /// new tree still contains it.
    pub fn open_archive(&mut self, path: &Path) -> Result<()> {
        let store = ArchiveReportStore::open(path, StoreOptions::from(&self.config))?;
        let tree = build_tree(store.manifest());

        if let Some(previous) = self.session.take() {
            if let Err(e) = previous.store.close() {
                tracing::warn!("Failed to remove previous workspace: {}", e);
            }
        }
        self.session = Some(Session { store, tree });
        self.phase = AppPhase::Ready;

        if let Some(selected) = self.selected.take() {
            if self.select(&selected) {
                tracing::info!("Re-selected {}", selected);
            }
        }
        Ok(())
    }

    /// Discard the current session and its workspace.
    pub fn close(&mut self) -> Result<()> {
        self.phase = AppPhase::NoArchive;
        self.selected = None;
        match self.session.take() {
            Some(session) => session.store.close(),
            None => Ok(()),
        }
    }

    /// Enable or disable a filter group by label.
    pub fn set_filter_active(&mut self, label: &str, on: bool) -> bool {
        let changed = self.filters.set_active_by_label(label, on);
        if !changed {
            tracing::warn!("Unknown filter group '{}'", label);
        }
        changed
    }

    /// Replace the enabled filter groups with exactly `labels`.
    pub fn set_excluded_groups(&mut self, labels: &[&str]) {
        self.filters.clear();
        for label in labels {
            self.set_filter_active(label, true);
        }
    }

    /// Set the search text. Non-empty text also prunes empty directories.
    pub fn set_find(&mut self, text: &str) {
        self.find_text = text.to_string();
        self.force_prune = !text.is_empty();
    }

    pub fn find_text(&self) -> &str {
        &self.find_text
    }

    /// Filtered view over the current tree; `None` without an open archive.
    pub fn view(&self) -> Option<FilteredTreeView<'_>> {
        let session = self.session.as_ref()?;
        let mut view = FilteredTreeView::new(&session.tree, session.manifest())
            .with_excluded(self.filters.excluded_tokens())
            .with_search(&self.find_text);
        view.set_force_prune(self.force_prune);
        Some(view)
    }

    /// Mark a path as selected if the current tree contains it.
    pub fn select(&mut self, path: &str) -> bool {
        let found = self
            .session
            .as_ref()
            .map(|s| s.tree.find(path).is_some())
            .unwrap_or(false);
        if found {
            self.selected = Some(path.to_string());
        }
        found
    }

    pub fn active_path(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Row activation: selects the path and tells the shell whether it has
    /// reports to show.
    pub fn on_node_activated(&mut self, path: &str) -> Activation {
        self.selected = Some(path.to_string());

        let entry = self.session.as_ref().and_then(|s| s.manifest().entry(path));
        match entry {
            Some(entry) if entry.has_reports() => Activation::Selected {
                path: path.to_string(),
            },
            Some(entry) => Activation::WithoutReport {
                path: path.to_string(),
                name: entry.name.clone(),
                realpath: entry.realpath.clone(),
                size: entry.size,
                magic: entry.magic.clone(),
            },
            None => Activation::WithoutReport {
                path: path.to_string(),
                name: String::new(),
                realpath: String::new(),
                size: 0,
                magic: String::new(),
            },
        }
    }

    fn checksum_for(&self, path: &str) -> Result<String> {
        self.session
            .as_ref()
            .and_then(|s| s.manifest().checksum_for(path))
            .map(str::to_string)
            .ok_or_else(|| ViewerError::NotFound(path.to_string()))
    }

    fn or_sentinel(path: &str, result: Result<String>) -> String {
        match result {
            Ok(page) => page,
            Err(e) => {
                if e.is_recoverable() {
                    tracing::debug!("No report for {}: {}", path, e);
                } else {
                    tracing::warn!("Failed to load report for {}: {}", path, e);
                }
                no_report_html(path)
            }
        }
    }

    /// Report page for a path. `hexdump` pages go through `get_hexdump`.
    pub fn get_page(&mut self, path: &str, page: &str) -> String {
        if page == HEXDUMP_PAGE {
            return self.get_hexdump(path, page);
        }
        let result = self.checksum_for(path).and_then(|checksum| {
            let session = self.session.as_ref().ok_or_else(|| ViewerError::NotFound(path.to_string()))?;
            session.store.report_page(&checksum, page)
        });
        Self::or_sentinel(path, result)
    }

    /// Hex-dump table for a path, extracted lazily from the archive.
    pub fn get_hexdump(&mut self, path: &str, page: &str) -> String {
        let result = self.checksum_for(path).and_then(|checksum| {
            let session = self.session.as_mut().ok_or_else(|| ViewerError::NotFound(path.to_string()))?;
            session.store.hexdump_page(&checksum, page)
        });
        Self::or_sentinel(path, result)
    }

    /// Sub-scans of a path, most recent offset first.
    pub fn get_scan_highlights(&self, path: &str) -> Vec<ScanHighlight> {
        self.session
            .as_ref()
            .map(|s| s.manifest().scan_highlights(path))
            .unwrap_or_default()
    }
}
