//! Configuration for the plugin
//!
//! Settings merge three layers: built-in defaults, `QTBUILD_*` environment
//! variables and an optional `qtbuild.toml` project file; CLI flags are
//! applied on top by the handlers. The locator owns the `QTDIR`/pkg-config
//! fallback chain; this layer only carries explicit overrides for it.
//!
//! Environment variables:
//! - `QTBUILD_CACHE_ENABLED`: use the detection cache (true|false) - default: "true"
//! - `QTBUILD_CACHE_PATH`: detection cache file - default: user cache dir + "qtbuild/toolkit.json"
//! - `QTBUILD_AUTOSCAN`: scan targets for companion artifacts (true|false) - default: "true"
//! - `QTBUILD_NO_MOC_INCLUDE_SCAN`: skip the generated-unit include scan - default: "false"
//! - `QTBUILD_LOG_LEVEL`: logging level - default: "info"

use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classify::ClassifyOptions;
use crate::locate::{LocateOptions, ToolkitCache};
use crate::rules::RuleParams;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the optional per-project configuration file.
pub const PROJECT_FILE: &str = "qtbuild.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    FileParse { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Resolved plugin configuration.
#[derive(Debug, Clone)]
pub struct QtBuildConfig {
    /// Toolkit location overrides.
    pub install_dir: Option<PathBuf>,
    pub include_dir: Option<PathBuf>,
    pub lib_dir: Option<PathBuf>,

    /// Detection cache.
    pub cache_enabled: bool,
    pub cache_path: PathBuf,

    /// Classifier switches.
    pub autoscan: bool,
    pub no_moc_include_scan: bool,

    /// Plugin search path handed to the UI compiler.
    pub uic_plugin_dir: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for QtBuildConfig {
    /// Loads from environment variables with defaults.
    fn default() -> Self {
        let cache_enabled = env::var("QTBUILD_CACHE_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let cache_path = env::var("QTBUILD_CACHE_PATH")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(ToolkitCache::default_path);

        let autoscan = env::var("QTBUILD_AUTOSCAN")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let no_moc_include_scan = env::var("QTBUILD_NO_MOC_INCLUDE_SCAN")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let log_level = env::var("QTBUILD_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            install_dir: None,
            include_dir: None,
            lib_dir: None,
            cache_enabled,
            cache_path,
            autoscan,
            no_moc_include_scan,
            uic_plugin_dir: None,
            log_level,
        }
    }
}

/// Shape of `qtbuild.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFile {
    #[serde(default)]
    toolkit: ProjectToolkit,
    #[serde(default)]
    scan: ProjectScan,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ProjectToolkit {
    install_dir: Option<PathBuf>,
    include_dir: Option<PathBuf>,
    lib_dir: Option<PathBuf>,
    uic_plugin_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ProjectScan {
    autoscan: Option<bool>,
    no_moc_include_scan: Option<bool>,
}

impl QtBuildConfig {
    /// Merges a `qtbuild.toml` project file over this configuration. File
    /// values win over environment values; missing keys change nothing.
    pub fn apply_project_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file: ProjectFile = toml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if file.toolkit.install_dir.is_some() {
            self.install_dir = file.toolkit.install_dir;
        }
        if file.toolkit.include_dir.is_some() {
            self.include_dir = file.toolkit.include_dir;
        }
        if file.toolkit.lib_dir.is_some() {
            self.lib_dir = file.toolkit.lib_dir;
        }
        if file.toolkit.uic_plugin_dir.is_some() {
            self.uic_plugin_dir = file.toolkit.uic_plugin_dir;
        }
        if let Some(autoscan) = file.scan.autoscan {
            self.autoscan = autoscan;
        }
        if let Some(no_scan) = file.scan.no_moc_include_scan {
            self.no_moc_include_scan = no_scan;
        }

        Ok(())
    }

    /// Loads the project file from a directory if one is present.
    pub fn apply_project_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            self.apply_project_file(&path)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn locate_options(&self) -> LocateOptions {
        LocateOptions {
            install_dir: self.install_dir.clone(),
            include_dir: self.include_dir.clone(),
            lib_dir: self.lib_dir.clone(),
        }
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            autoscan: self.autoscan,
            no_moc_include_scan: self.no_moc_include_scan,
        }
    }

    pub fn rule_params(&self) -> RuleParams {
        RuleParams {
            uic_plugin_dir: self.uic_plugin_dir.clone(),
            ..Default::default()
        }
    }
}

impl fmt::Display for QtBuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QtBuild Configuration:")?;
        if let Some(dir) = &self.install_dir {
            writeln!(f, "  Install Dir: {}", dir.display())?;
        }
        if let Some(dir) = &self.include_dir {
            writeln!(f, "  Include Dir: {}", dir.display())?;
        }
        if let Some(dir) = &self.lib_dir {
            writeln!(f, "  Lib Dir: {}", dir.display())?;
        }
        writeln!(f, "  Cache Enabled: {}", self.cache_enabled)?;
        writeln!(f, "  Cache Path: {}", self.cache_path.display())?;
        writeln!(f, "  Autoscan: {}", self.autoscan)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let config = QtBuildConfig::default();

        assert!(config.install_dir.is_none());
        assert!(config.cache_enabled);
        assert!(config.autoscan);
        assert!(!config.no_moc_include_scan);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("QTBUILD_CACHE_ENABLED", "false"),
            EnvGuard::set("QTBUILD_CACHE_PATH", "/tmp/cache.json"),
            EnvGuard::set("QTBUILD_AUTOSCAN", "false"),
            EnvGuard::set("QTBUILD_NO_MOC_INCLUDE_SCAN", "true"),
            EnvGuard::set("QTBUILD_LOG_LEVEL", "DEBUG"),
        ];

        let config = QtBuildConfig::default();

        assert!(!config.cache_enabled);
        assert_eq!(config.cache_path, PathBuf::from("/tmp/cache.json"));
        assert!(!config.autoscan);
        assert!(config.no_moc_include_scan);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_project_file_overrides_env() {
        let _guard = EnvGuard::set("QTBUILD_AUTOSCAN", "true");
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(PROJECT_FILE),
            r#"
[toolkit]
install-dir = "/opt/qt"
uic-plugin-dir = "/opt/qt/plugins"

[scan]
autoscan = false
"#,
        )
        .unwrap();

        let mut config = QtBuildConfig::default();
        config.apply_project_dir(temp.path()).unwrap();

        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/qt")));
        assert_eq!(
            config.uic_plugin_dir,
            Some(PathBuf::from("/opt/qt/plugins"))
        );
        assert!(!config.autoscan);
        // Keys the file does not mention keep their values.
        assert!(!config.no_moc_include_scan);
    }

    #[test]
    #[serial]
    fn test_project_dir_without_file_is_fine() {
        let temp = TempDir::new().unwrap();
        let mut config = QtBuildConfig::default();
        assert!(config.apply_project_dir(temp.path()).is_ok());
    }

    #[test]
    #[serial]
    fn test_project_file_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PROJECT_FILE);
        std::fs::write(&path, "[toolkit]\nbogus = true\n").unwrap();

        let mut config = QtBuildConfig::default();
        let result = config.apply_project_file(&path);
        assert!(matches!(result, Err(ConfigError::FileParse { .. })));
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_log_level() {
        let mut config = QtBuildConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_option_conversions() {
        let mut config = QtBuildConfig::default();
        config.install_dir = Some(PathBuf::from("/opt/qt"));
        config.no_moc_include_scan = true;

        let locate = config.locate_options();
        assert_eq!(locate.install_dir, Some(PathBuf::from("/opt/qt")));

        let classify = config.classify_options();
        assert!(classify.no_moc_include_scan);
        assert!(classify.autoscan);
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let config = QtBuildConfig::default();
        let display = format!("{}", config);
        assert!(display.contains("QtBuild Configuration:"));
        assert!(display.contains("Cache Enabled:"));
    }
}
