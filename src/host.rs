//! Host build engine integration
//!
//! The dependency graph, incremental rebuilds and scheduling all belong to
//! the host engine; this crate only hands it declarations. [`BuildHost`] is
//! the seam: the plugin pushes rule registrations, compile environment
//! fragments and the generated sources discovered by a target scan through
//! it, and never calls back into the graph.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::classify::ScanReport;
use crate::locate::Toolkit;
use crate::rules::{Rule, RuleSet};

/// Compile environment fragments a located toolkit contributes to every
/// target that consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileEnv {
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub libs: Vec<String>,
    pub defines: Vec<String>,
}

impl CompileEnv {
    pub fn for_toolkit(toolkit: &Toolkit) -> Self {
        Self {
            include_dirs: vec![toolkit.include_dir.clone()],
            lib_dirs: vec![toolkit.lib_dir.clone()],
            libs: vec!["qt-mt".to_string()],
            defines: vec!["QT_THREAD_SUPPORT".to_string()],
        }
    }
}

/// The host engine's registration surface.
pub trait BuildHost {
    /// Declare a transformation rule to the engine.
    fn register_rule(&mut self, rule: Arc<dyn Rule>) -> Result<()>;

    /// Splice compile environment fragments into the engine's flags.
    fn extend_compile_env(&mut self, env: &CompileEnv) -> Result<()>;

    /// Append a generated source to a target's compile list.
    fn add_generated_source(&mut self, target: &str, source: &Path) -> Result<()>;
}

/// Plugin entry point: declares the fixed rule set and the toolkit's
/// compile environment to the host.
pub fn register_toolkit(host: &mut dyn BuildHost, toolkit: &Toolkit) -> Result<()> {
    for rule in RuleSet::with_defaults().into_rules() {
        info!(rule = rule.name(), "Registering rule with host engine");
        host.register_rule(rule)?;
    }

    host.extend_compile_env(&CompileEnv::for_toolkit(toolkit))?;
    Ok(())
}

/// Emitter half of a target scan: pushes the generated sources of a
/// [`ScanReport`] into the host's source list for the target.
pub fn apply_scan(host: &mut dyn BuildHost, target: &str, report: &ScanReport) -> Result<()> {
    for source in report.extra_sources() {
        info!(target, source = %source.display(), "Appending generated source");
        host.add_generated_source(target, source)?;
    }
    Ok(())
}

/// A host double that records every registration. Used by tests and by the
/// CLI's dry-run paths.
#[derive(Default)]
pub struct RecordingHost {
    pub rules: Vec<String>,
    pub compile_envs: Vec<CompileEnv>,
    pub generated_sources: Vec<(String, PathBuf)>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BuildHost for RecordingHost {
    fn register_rule(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        self.rules.push(rule.name().to_string());
        Ok(())
    }

    fn extend_compile_env(&mut self, env: &CompileEnv) -> Result<()> {
        self.compile_envs.push(env.clone());
        Ok(())
    }

    fn add_generated_source(&mut self, target: &str, source: &Path) -> Result<()> {
        self.generated_sources
            .push((target.to_string(), source.to_path_buf()));
        Ok(())
    }
}
