//! qtbuild - build-graph extension for Qt toolkit sources
//!
//! This library teaches a generic build engine how to consume Qt toolkit
//! sources. It locates a toolkit installation, classifies C++ translation
//! units by their companion artifacts and declares the toolkit's code
//! generators as transformation rules a host build graph can schedule.
//!
//! # Core Concepts
//!
//! - **Toolkit locator**: resolves the installation directory (explicit
//!   override, `QTDIR`, pkg-config prefix), the `uic` and `moc`
//!   executables and the header and library directories, with a JSON
//!   detection cache
//! - **Classifier**: pairs each translation unit with a UI descriptor or a
//!   header carrying the meta-object marker and decides which generator
//!   has to run for it
//! - **Rules**: named one-input transformations (`uic`, `moc`, `moc-cpp`,
//!   `msgfmt`) expressed as external command recipes
//! - **Host**: the registration seam toward the engine that owns the
//!   dependency graph and the scheduling
//!
//! # Example Usage
//!
//! ```no_run
//! use qtbuild::fs::RealFileSystem;
//! use qtbuild::host::{register_toolkit, RecordingHost};
//! use qtbuild::locate::ToolkitLocator;
//! use std::sync::Arc;
//!
//! fn plug_in() -> anyhow::Result<()> {
//!     let locator = ToolkitLocator::new(Arc::new(RealFileSystem::new()));
//!     let toolkit = locator.locate()?;
//!
//!     let mut host = RecordingHost::new();
//!     register_toolkit(&mut host, &toolkit)?;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod classify;
pub mod cli;
pub mod config;
pub mod fs;
pub mod host;
pub mod locate;
pub mod rules;

// Re-export key types for convenient access
pub use classify::{Classification, Classifier, ClassifyError, ClassifyOptions, ScanReport};
pub use config::{ConfigError, QtBuildConfig};
pub use host::{register_toolkit, BuildHost, CompileEnv};
pub use locate::{LocateError, LocateOptions, Toolkit, ToolkitCache, ToolkitLocator};
pub use rules::{Recipe, RecipeRunner, Rule, RuleError, RuleParams, RuleSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_qtbuild() {
        assert_eq!(NAME, "qtbuild");
    }
}
