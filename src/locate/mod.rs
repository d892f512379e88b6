//! Toolkit installation discovery
//!
//! Resolves a Qt installation from an explicit override, the `QTDIR`
//! environment variable, or a pkg-config prefix query, then locates the
//! companion code generators (`uic`, `moc`) and the header and library
//! directories. Successful detections are persisted through [`cache`] so
//! later runs skip the probing.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

pub mod cache;

pub use cache::ToolkitCache;

/// Header probed to validate a candidate include directory.
const SENTINEL_HEADER: &str = "qlayout.h";

/// pkg-config package queried for the installation prefix.
const PKG_CONFIG_PACKAGE: &str = "qt-mt";

/// Debian-style split installation of the toolkit headers.
const DISTRO_INCLUDE_DIR: &str = "/usr/include/qt3";

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Qt installation not found. Set QTDIR or pass --qt-dir (e.g. /usr/lib/qt3)")]
    InstallNotFound,

    #[error("Toolkit executable not found: {name}")]
    ToolNotFound { name: String },

    #[error("Toolkit headers not found (qlayout.h missing in {probed:?})")]
    HeadersNotFound { probed: Vec<PathBuf> },
}

/// A fully resolved toolkit installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolkit {
    pub install_dir: PathBuf,
    pub uic: PathBuf,
    pub moc: PathBuf,
    pub include_dir: PathBuf,
    pub lib_dir: PathBuf,
}

/// Explicit overrides for the detection chain, typically sourced from CLI
/// flags or the project configuration file.
#[derive(Debug, Clone, Default)]
pub struct LocateOptions {
    pub install_dir: Option<PathBuf>,
    pub include_dir: Option<PathBuf>,
    pub lib_dir: Option<PathBuf>,
}

/// Resolves a [`Toolkit`] using a chain of fallback strategies.
pub struct ToolkitLocator {
    fs: Arc<dyn FileSystem>,
    options: LocateOptions,
}

impl ToolkitLocator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_options(fs, LocateOptions::default())
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: LocateOptions) -> Self {
        Self { fs, options }
    }

    /// Runs the full detection chain.
    pub fn locate(&self) -> Result<Toolkit, LocateError> {
        let install_dir = self.resolve_install_dir()?;
        info!(install_dir = %install_dir.display(), "Toolkit installation found");

        let uic = self.find_tool(&install_dir, "uic")?;
        let moc = self.find_tool(&install_dir, "moc")?;
        let include_dir = self.resolve_include_dir(&install_dir)?;
        let lib_dir = self.resolve_lib_dir(&install_dir);

        Ok(Toolkit {
            install_dir,
            uic,
            moc,
            include_dir,
            lib_dir,
        })
    }

    /// Install dir resolution: explicit override, then `QTDIR`, then the
    /// pkg-config prefix of the toolkit package.
    fn resolve_install_dir(&self) -> Result<PathBuf, LocateError> {
        if let Some(dir) = &self.options.install_dir {
            debug!(dir = %dir.display(), "Using explicit install dir");
            return Ok(dir.clone());
        }

        if let Some(dir) = env::var("QTDIR").ok().map(|v| v.trim().to_string()) {
            if !dir.is_empty() {
                debug!(dir, "Install dir taken from QTDIR");
                return Ok(PathBuf::from(dir));
            }
        }

        match pkg_config::get_variable(PKG_CONFIG_PACKAGE, "prefix") {
            Ok(prefix) => {
                let prefix = prefix.trim().to_string();
                if prefix.is_empty() {
                    warn!(package = PKG_CONFIG_PACKAGE, "pkg-config returned an empty prefix");
                    Err(LocateError::InstallNotFound)
                } else {
                    debug!(prefix, "Install dir taken from pkg-config");
                    Ok(PathBuf::from(prefix))
                }
            }
            Err(e) => {
                debug!(error = %e, "pkg-config query failed");
                Err(LocateError::InstallNotFound)
            }
        }
    }

    /// Looks for `<install>/bin/<name>` first, then every directory of PATH.
    fn find_tool(&self, install_dir: &Path, name: &str) -> Result<PathBuf, LocateError> {
        let exe_name = format!("{}{}", name, env::consts::EXE_SUFFIX);

        let bundled = install_dir.join("bin").join(&exe_name);
        if self.fs.is_file(&bundled) {
            info!(tool = name, path = %bundled.display(), "Toolkit executable found");
            return Ok(bundled);
        }

        if let Some(paths) = env::var_os("PATH") {
            for dir in env::split_paths(&paths) {
                let candidate = dir.join(&exe_name);
                if self.fs.is_file(&candidate) {
                    info!(tool = name, path = %candidate.display(), "Toolkit executable found on PATH");
                    return Ok(candidate);
                }
            }
        }

        Err(LocateError::ToolNotFound {
            name: name.to_string(),
        })
    }

    /// Probes candidate include directories for the sentinel header.
    fn resolve_include_dir(&self, install_dir: &Path) -> Result<PathBuf, LocateError> {
        let mut probed = Vec::new();

        if let Some(dir) = &self.options.include_dir {
            if self.fs.is_file(&dir.join(SENTINEL_HEADER)) {
                debug!(dir = %dir.display(), "Using explicit include dir");
                return Ok(dir.clone());
            }
            warn!(dir = %dir.display(), "Explicit include dir lacks {}, probing defaults", SENTINEL_HEADER);
            probed.push(dir.clone());
        }

        let bundled = install_dir.join("include");
        if self.fs.is_file(&bundled.join(SENTINEL_HEADER)) {
            debug!(dir = %bundled.display(), "Include dir found in installation");
            return Ok(bundled);
        }
        probed.push(bundled);

        let distro = PathBuf::from(DISTRO_INCLUDE_DIR);
        if self.fs.is_file(&distro.join(SENTINEL_HEADER)) {
            debug!(dir = %distro.display(), "Include dir found in distro location");
            return Ok(distro);
        }
        probed.push(distro);

        Err(LocateError::HeadersNotFound { probed })
    }

    fn resolve_lib_dir(&self, install_dir: &Path) -> PathBuf {
        self.options
            .lib_dir
            .clone()
            .unwrap_or_else(|| install_dir.join("lib"))
    }
}
