//! Translation unit classification
//!
//! For each C++ translation unit of a build target, finds the companion
//! artifact the toolkit cares about (a UI descriptor or a header carrying
//! the meta-object marker) and decides which generator has to run. The
//! result is a [`ScanReport`] the host engine uses to extend the target's
//! source list with generated units.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::FileSystem;

pub mod scanner;

pub use scanner::{has_meta_object_marker, includes_generated_unit};

pub const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc"];
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hxx", "hpp", "hh"];
pub const UI_EXTENSIONS: &[&str] = &["ui"];

/// Suffix of the standalone generated meta-object unit.
pub const MOC_CPP_SUFFIX: &str = "_moc.cpp";

/// Suffix of the generated unit a source includes itself.
pub const MOC_SUFFIX: &str = ".moc";

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("not a C++ translation unit: {unit}")]
    NotATranslationUnit { unit: PathBuf },

    #[error("meta-object marker inside translation unit {unit}; move the class declaration into a header")]
    MarkerInSource { unit: PathBuf },

    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// How a translation unit relates to the toolkit's code generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// A same-stem UI descriptor exists; the UI rule produces this unit and
    /// all of its generated outputs, nothing further to scan.
    UiDriven { descriptor: PathBuf },

    /// The companion header carries the marker and the unit includes
    /// `<stem>.moc` itself; only the `.moc` file has to be generated.
    MocIncluded { header: PathBuf },

    /// The companion header carries the marker but the unit never includes
    /// the generated code; a standalone `<stem>_moc.cpp` is generated and
    /// compiled as an extra object.
    MocStandalone { header: PathBuf },

    /// No companion artifact, or a header without the marker.
    Plain,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit: PathBuf,
    pub classification: Classification,
    /// Generated sources the host must append to the target's compile list.
    pub extra_sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanError {
    pub unit: PathBuf,
    pub message: String,
}

/// Outcome of scanning a target's source list.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub units: Vec<UnitReport>,
    /// Inputs that are not C++ translation units.
    pub skipped: Vec<PathBuf>,
    pub errors: Vec<ScanError>,
}

impl ScanReport {
    /// All generated sources across the target.
    pub fn extra_sources(&self) -> Vec<&Path> {
        self.units
            .iter()
            .flat_map(|u| u.extra_sources.iter().map(PathBuf::as_path))
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// When off, targets pass through untouched (the `QT_AUTOSCAN` switch
    /// of the original tool).
    pub autoscan: bool,

    /// Skip the generated-unit include scan and always emit a `.moc` file
    /// for marked headers.
    pub no_moc_include_scan: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            autoscan: true,
            no_moc_include_scan: false,
        }
    }
}

/// Classifies translation units by their companion artifacts.
pub struct Classifier {
    fs: Arc<dyn FileSystem>,
    options: ClassifyOptions,
}

impl Classifier {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_options(fs, ClassifyOptions::default())
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: ClassifyOptions) -> Self {
        Self { fs, options }
    }

    /// Classifies a single translation unit.
    pub fn classify_unit(&self, unit: &Path) -> Result<Classification, ClassifyError> {
        if !is_source(unit) {
            return Err(ClassifyError::NotATranslationUnit {
                unit: unit.to_path_buf(),
            });
        }

        if let Some(descriptor) = self.find_companion(unit, UI_EXTENSIONS) {
            debug!(unit = %unit.display(), descriptor = %descriptor.display(), "UI descriptor found");
            return Ok(Classification::UiDriven { descriptor });
        }

        let content = self.read(unit)?;
        if has_meta_object_marker(&content) {
            return Err(ClassifyError::MarkerInSource {
                unit: unit.to_path_buf(),
            });
        }

        let header = match self.find_companion(unit, HEADER_EXTENSIONS) {
            Some(h) => h,
            None => {
                debug!(unit = %unit.display(), "No companion header");
                return Ok(Classification::Plain);
            }
        };

        let header_content = self.read(&header)?;
        if !has_meta_object_marker(&header_content) {
            return Ok(Classification::Plain);
        }

        let stem = unit
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.options.no_moc_include_scan || includes_generated_unit(&content, &stem) {
            debug!(unit = %unit.display(), header = %header.display(), "Unit includes its generated code");
            Ok(Classification::MocIncluded { header })
        } else {
            debug!(unit = %unit.display(), header = %header.display(), "Standalone meta-object unit needed");
            Ok(Classification::MocStandalone { header })
        }
    }

    /// Scans a target's source list, producing one report entry per
    /// translation unit plus the generated sources the target gains.
    pub fn scan_target(&self, sources: &[PathBuf]) -> ScanReport {
        let mut report = ScanReport::default();

        if !self.options.autoscan {
            debug!("Autoscan disabled, passing target through untouched");
            report.units = sources
                .iter()
                .map(|s| UnitReport {
                    unit: s.clone(),
                    classification: Classification::Plain,
                    extra_sources: Vec::new(),
                })
                .collect();
            return report;
        }

        for source in sources {
            if !is_source(source) {
                debug!(source = %source.display(), "Not a C++ translation unit, skipped");
                report.skipped.push(source.clone());
                continue;
            }

            match self.classify_unit(source) {
                Ok(classification) => {
                    let extra_sources = match &classification {
                        Classification::MocStandalone { .. } => {
                            vec![generated_moc_source(source)]
                        }
                        _ => Vec::new(),
                    };
                    report.units.push(UnitReport {
                        unit: source.clone(),
                        classification,
                        extra_sources,
                    });
                }
                Err(e) => {
                    warn!(unit = %source.display(), error = %e, "Classification failed");
                    report.errors.push(ScanError {
                        unit: source.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Looks for a same-stem companion in the unit's own directory, first
    /// extension match wins.
    fn find_companion(&self, unit: &Path, extensions: &[&str]) -> Option<PathBuf> {
        for ext in extensions {
            let candidate = unit.with_extension(ext);
            if self.fs.is_file(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn read(&self, path: &Path) -> Result<String, ClassifyError> {
        self.fs
            .read_to_string(path)
            .map_err(|e| ClassifyError::Read {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Path of the standalone generated meta-object unit for a source.
pub fn generated_moc_source(unit: &Path) -> PathBuf {
    let stem = unit
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    unit.with_file_name(format!("{}{}", stem, MOC_CPP_SUFFIX))
}
