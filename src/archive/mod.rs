pub mod container;
pub mod pages;
pub mod selection;

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::manifest::ScanManifest;

pub use self::container::ContainerFormat;
pub use self::selection::ExtractionMode;

/// Settings for opening an archive.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub mode: ExtractionMode,
    /// Directory the session workspace is created in (system temp dir when unset)
    pub workspace_parent: Option<PathBuf>,
    pub hexdump_line_limit: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for StoreOptions {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            mode: ExtractionMode::from_advanced(config.advanced),
            workspace_parent: config.htmldir.clone(),
            hexdump_line_limit: config.hexdump_line_limit,
        }
    }
}

/// Which members of the archive have been materialized in the workspace.
/// Only grows during a session.
#[derive(Debug, Default)]
pub struct ExtractionRecord {
    extracted: BTreeSet<String>,
    /// Lazily extracted members already looked for, found or not
    attempted: HashSet<String>,
}

impl ExtractionRecord {
    pub fn is_extracted(&self, member: &str) -> bool {
        self.extracted.contains(member)
    }

    pub fn was_attempted(&self, member: &str) -> bool {
        self.attempted.contains(member)
    }

    pub fn extracted(&self) -> impl Iterator<Item = &str> {
        self.extracted.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.extracted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extracted.is_empty()
    }
}

/// One opened archive: its manifest, a private scratch workspace, and the
/// record of what has been extracted into it. Dropping the store removes
/// the workspace.
pub struct ArchiveReportStore {
    archive_path: PathBuf,
    format: ContainerFormat,
    options: StoreOptions,
    workspace: TempDir,
    manifest: ScanManifest,
    record: ExtractionRecord,
    archive_passes: usize,
}

impl ArchiveReportStore {
    /// Open an archive: detect its container format, extract the manifest
    /// and the mode-dependent set of pages, and load the manifest.
    ///
    /// On any failure the partially filled workspace is removed.
    pub fn open(archive_path: &Path, options: StoreOptions) -> Result<Self> {
        tracing::info!(
            "Opening archive {} ({:?} mode)",
            archive_path.display(),
            options.mode
        );
        let format = ContainerFormat::detect(archive_path)?;
        tracing::debug!("Container format: {:?}", format);

        let mut builder = tempfile::Builder::new();
        builder.prefix("batview-");
        let workspace = match &options.workspace_parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        let mut record = ExtractionRecord::default();
        let mode = options.mode;
        let count = extract_matching(
            archive_path,
            format,
            workspace.path(),
            &mut record,
            PassScope::Whole,
            |m| selection::select_at_open(m, mode),
        )?;
        tracing::info!(
            "Extracted {} members into {}",
            count,
            workspace.path().display()
        );

        let manifest = ScanManifest::load_from_dir(workspace.path())?;

        Ok(Self {
            archive_path: archive_path.to_path_buf(),
            format,
            options,
            workspace,
            manifest,
            record,
            archive_passes: 1,
        })
    }

    pub fn manifest(&self) -> &ScanManifest {
        &self.manifest
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    pub fn mode(&self) -> ExtractionMode {
        self.options.mode
    }

    pub fn workspace_dir(&self) -> &Path {
        self.workspace.path()
    }

    pub fn images_dir(&self) -> PathBuf {
        self.workspace.path().join("images")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.workspace.path().join("reports")
    }

    pub fn record(&self) -> &ExtractionRecord {
        &self.record
    }

    /// Number of full passes made over the archive, the open pass included.
    pub fn archive_passes(&self) -> usize {
        self.archive_passes
    }

    fn member_path(&self, member: &str) -> PathBuf {
        self.workspace.path().join(member)
    }

    fn require_checksum(&self, checksum: &str) -> Result<()> {
        if self.manifest.contains_checksum(checksum) {
            Ok(())
        } else {
            Err(ViewerError::NotFound(format!("checksum '{}'", checksum)))
        }
    }

    /// A report page extracted at open time, preferring the HTML-wrapped
    /// member over the raw one.
    pub fn report_page(&self, checksum: &str, page: &str) -> Result<String> {
        self.require_checksum(checksum)?;

        for html in [true, false] {
            let member = selection::report_member(checksum, page, html);
            let path = self.member_path(&member);
            if path.is_file() {
                tracing::debug!("Serving report page {}", member);
                let text = pages::read_gz_text(&path)?;
                return Ok(pages::substitute_images_dir(&text, &self.images_dir()));
            }
        }
        Err(ViewerError::NotFound(format!("page '{}' for {}", page, checksum)))
    }

    /// A hex-dump page, extracted from the archive on first request. Later
    /// requests for the same page never touch the archive again.
    pub fn hexdump_page(&mut self, checksum: &str, page: &str) -> Result<String> {
        self.require_checksum(checksum)?;

        let member = selection::report_member(checksum, page, false);
        if !self.record.was_attempted(&member) {
            self.record.attempted.insert(member.clone());
            if !self.record.is_extracted(&member) {
                tracing::info!("Extracting {} from archive", member);
                self.archive_passes += 1;
                let found = extract_matching(
                    &self.archive_path,
                    self.format,
                    self.workspace.path(),
                    &mut self.record,
                    PassScope::FirstMatch,
                    |m| m == member,
                )?;
                if found == 0 {
                    tracing::debug!("{} is not in the archive", member);
                }
            }
        }

        let path = self.member_path(&member);
        if !path.is_file() {
            return Err(ViewerError::NotFound(format!("page '{}' for {}", page, checksum)));
        }
        let html = pages::render_hexdump_file(&path, self.options.hexdump_line_limit)?;
        Ok(pages::substitute_images_dir(&html, &self.images_dir()))
    }

    /// Remove the workspace now instead of on drop.
    pub fn close(self) -> Result<()> {
        tracing::info!("Closing archive {}", self.archive_path.display());
        self.workspace.close()?;
        Ok(())
    }
}

/// How far one extraction pass reads into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassScope {
    /// Read every entry
    Whole,
    /// Stop right after the first member is unpacked
    FirstMatch,
}

/// One pass over the archive, unpacking every member accepted by `select`
/// into `dest`. Returns the number of members unpacked.
fn extract_matching<F>(
    archive_path: &Path,
    format: ContainerFormat,
    dest: &Path,
    record: &mut ExtractionRecord,
    scope: PassScope,
    select: F,
) -> Result<usize>
where
    F: Fn(&str) -> bool,
{
    let corrupt = |e: std::io::Error| ViewerError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut archive = format.open(archive_path).map_err(corrupt)?;
    let mut count = 0usize;
    for entry_result in archive.entries().map_err(corrupt)? {
        let mut entry = entry_result.map_err(corrupt)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let member = match entry.path() {
            Ok(p) => selection::member_name(&p.to_string_lossy()),
            Err(e) => {
                tracing::warn!("Skipping member with unreadable name: {}", e);
                continue;
            }
        };
        if !select(&member) {
            continue;
        }

        let unpacked = entry
            .unpack_in(dest)
            .map_err(|source| ViewerError::Extraction {
                member: member.clone(),
                source,
            })?;
        if unpacked {
            record.extracted.insert(member);
            count += 1;
            if scope == PassScope::FirstMatch {
                break;
            }
        } else {
            tracing::warn!("Refusing to unpack {} outside the workspace", member);
        }
    }
    Ok(count)
}
