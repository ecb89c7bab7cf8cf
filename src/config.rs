use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File as ConfigFile, FileFormat, Value};

use crate::error::Result;

/// Section holding viewer settings; every other section describes a scan type.
const VIEWER_SECTION: &str = "viewer";
/// Scanner-side section, not relevant to the viewer.
const BATCONFIG_SECTION: &str = "batconfig";

/// Cosmetic per-scan-type settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTypeConfig {
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

/// Configuration for the viewer.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Base directory for session workspaces (system temp dir when unset)
    pub htmldir: Option<PathBuf>,
    /// Extract every report and image at open time instead of the whitelist
    pub advanced: bool,
    /// Maximum number of lines rendered for a hex dump
    pub hexdump_line_limit: usize,
    pub scans: Vec<ScanTypeConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            htmldir: None,
            advanced: true,
            hexdump_line_limit: 1000,
            scans: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Load an INI configuration file, then apply `BATVIEW_SECTION__KEY`
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(ConfigFile::from(path).format(FileFormat::Ini))
            .add_source(Environment::with_prefix("BATVIEW").separator("__"))
            .build()?;
        Self::from_settings(settings)
    }

    pub fn from_ini_str(text: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(ConfigFile::from_str(text, FileFormat::Ini))
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let sections: HashMap<String, Value> = settings.try_deserialize()?;

        // Deterministic scan order regardless of map iteration
        let mut names: Vec<&String> = sections.keys().collect();
        names.sort();

        let mut config = ViewerConfig::default();
        for name in names {
            let Ok(table) = sections[name].clone().into_table() else {
                tracing::debug!("Ignoring top-level configuration key '{}'", name);
                continue;
            };
            let get = |key: &str| table.get(key).and_then(|v| v.clone().into_string().ok());

            match name.as_str() {
                BATCONFIG_SECTION => {}
                VIEWER_SECTION => {
                    if let Some(dir) = get("htmldir").filter(|d| !d.trim().is_empty()) {
                        config.htmldir = Some(PathBuf::from(dir.trim()));
                    }
                    if let Some(flag) = get("advanced") {
                        config.advanced = parse_flag(&flag);
                    }
                    if let Some(limit) = get("hexdumplines").and_then(|l| l.trim().parse().ok()) {
                        config.hexdump_line_limit = limit;
                    }
                }
                _ => match (get("description"), get("enabled")) {
                    (Some(description), Some(enabled)) => config.scans.push(ScanTypeConfig {
                        name: name.clone(),
                        description,
                        enabled: parse_flag(&enabled),
                    }),
                    _ => tracing::debug!("Scan section '{}' lacks description/enabled", name),
                },
            }
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_advanced_mode_and_1000_hexdump_lines() {
        let config = ViewerConfig::default();
        assert!(config.advanced);
        assert_eq!(config.hexdump_line_limit, 1000);
        assert!(config.htmldir.is_none());
    }

    #[test]
    fn ini_sections_map_to_viewer_and_scan_settings() {
        let text = "\
[batconfig]
multiprocessing = yes

[viewer]
htmldir = /tmp/bat-html
advanced = no

[identifier]
description = Identify strings
enabled = yes

[checksum]
description = Compute checksums
enabled = no

[broken]
enabled = yes
";
        let config = ViewerConfig::from_ini_str(text).unwrap();
        assert_eq!(config.htmldir, Some(PathBuf::from("/tmp/bat-html")));
        assert!(!config.advanced);
        assert_eq!(
            config.scans,
            vec![
                ScanTypeConfig {
                    name: "checksum".into(),
                    description: "Compute checksums".into(),
                    enabled: false,
                },
                ScanTypeConfig {
                    name: "identifier".into(),
                    description: "Identify strings".into(),
                    enabled: true,
                },
            ]
        );
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag(" true "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ViewerConfig::load(Path::new("/nonexistent/batview.ini")).unwrap_err();
        assert!(matches!(err, crate::error::ViewerError::Config(_)));
    }
}
