//! Transformation rules
//!
//! Rules are named, declarative descriptions of one-input transformations
//! driven by external command invocations: UI compilation, the two flavors
//! of meta-object compilation and message-catalog compilation. A [`RuleSet`]
//! indexes them by name and by source suffix; execution lives in [`exec`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::locate::Toolkit;

pub mod exec;
pub mod moc;
pub mod msgfmt;
pub mod uic;

pub use exec::RecipeRunner;
pub use moc::{MocCppRule, MocRule};
pub use msgfmt::MsgfmtRule;
pub use uic::UicRule;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("no rule accepts input {input} (suffix {suffix:?})")]
    NoRuleForInput {
        input: PathBuf,
        suffix: Option<String>,
    },

    #[error("unknown rule: {name}")]
    UnknownRule { name: String },

    #[error("rule {rule} does not accept input {input}")]
    SuffixMismatch { rule: String, input: PathBuf },

    #[error("failed to launch {command}: {reason}")]
    Spawn { command: String, reason: String },

    #[error("command failed ({status}): {command}")]
    StepFailed { command: String, status: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Template parameters shared by the rule recipes, with the defaults of the
/// original tool environment.
#[derive(Debug, Clone)]
pub struct RuleParams {
    /// Extra plugin search path handed to the UI compiler (`-L <dir>`).
    pub uic_plugin_dir: Option<PathBuf>,

    /// Flags for the UI compiler's header pass.
    pub uic_hflags: Vec<String>,

    /// Flags for the UI compiler's implementation pass.
    pub uic_cflags: Vec<String>,

    /// Prefix and suffix of generated meta-object units.
    pub moc_prefix: String,
    pub moc_suffix: String,
    pub moc_cpp_suffix: String,

    /// Message catalog compiler.
    pub msgfmt_program: PathBuf,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            uic_plugin_dir: None,
            uic_hflags: vec!["-nounload".to_string()],
            uic_cflags: vec!["-nounload".to_string()],
            moc_prefix: String::new(),
            moc_suffix: crate::classify::MOC_SUFFIX.to_string(),
            moc_cpp_suffix: crate::classify::MOC_CPP_SUFFIX.to_string(),
            msgfmt_program: PathBuf::from("msgfmt"),
        }
    }
}

impl RuleParams {
    /// Flags for the UI compiler's header pass, plugin dir folded in.
    pub fn rendered_uic_hflags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(dir) = &self.uic_plugin_dir {
            flags.push("-L".to_string());
            flags.push(dir.display().to_string());
        }
        flags.extend(self.uic_hflags.iter().cloned());
        flags
    }

    pub fn rendered_uic_cflags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(dir) = &self.uic_plugin_dir {
            flags.push("-L".to_string());
            flags.push(dir.display().to_string());
        }
        flags.extend(self.uic_cflags.iter().cloned());
        flags
    }

    /// Name of the generated meta-object unit for a stem, e.g. `dialog.moc`.
    pub fn moc_name(&self, stem: &str) -> String {
        format!("{}{}{}", self.moc_prefix, stem, self.moc_suffix)
    }

    pub fn moc_cpp_name(&self, stem: &str) -> String {
        format!("{}{}{}", self.moc_prefix, stem, self.moc_cpp_suffix)
    }
}

/// One step of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run a command, inheriting stdio.
    Run { program: PathBuf, args: Vec<String> },

    /// Run a command with stdout appended to a file.
    RunAppend {
        program: PathBuf,
        args: Vec<String>,
        target: PathBuf,
    },

    /// Append a literal line to a file.
    AppendLine { target: PathBuf, line: String },
}

impl Step {
    /// Human-readable rendition for listings, dry runs and errors.
    pub fn render(&self) -> String {
        match self {
            Step::Run { program, args } => render_command(program, args),
            Step::RunAppend {
                program,
                args,
                target,
            } => format!("{} >> {}", render_command(program, args), target.display()),
            Step::AppendLine { target, line } => {
                format!("append {:?} to {}", line, target.display())
            }
        }
    }
}

fn render_command(program: &Path, args: &[String]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

/// An ordered list of steps. Steps run in order; a failing step aborts the
/// rest of the recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn render(&self) -> Vec<String> {
        self.steps.iter().map(Step::render).collect()
    }
}

/// A named one-input transformation rule.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    /// Source suffix this rule accepts, without the dot (e.g. `ui`).
    fn source_suffix(&self) -> &str;

    /// Target suffixes in declaration order, for listings.
    fn target_suffixes(&self, params: &RuleParams) -> Vec<String>;

    /// Output paths for an input, in the rule's declaration order.
    fn outputs(&self, input: &Path, out_dir: &Path, params: &RuleParams) -> Vec<PathBuf>;

    /// Command recipe transforming the input into the outputs.
    fn recipe(
        &self,
        toolkit: &Toolkit,
        params: &RuleParams,
        input: &Path,
        out_dir: &Path,
    ) -> Recipe;
}

/// Registry of rules, indexed by name and by source suffix.
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
    by_suffix: HashMap<String, Vec<usize>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_suffix: HashMap::new(),
        }
    }

    /// The fixed rule set of the plugin.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(Arc::new(UicRule));
        set.register(Arc::new(MocRule));
        set.register(Arc::new(MocCppRule));
        set.register(Arc::new(MsgfmtRule));
        set
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let idx = self.rules.len();
        self.by_suffix
            .entry(rule.source_suffix().to_string())
            .or_default()
            .push(idx);
        self.rules.push(rule);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
            .map(|r| r.as_ref())
    }

    /// Default rule for an input, decided by its suffix. Where several
    /// rules share a suffix, registration order wins.
    pub fn for_source(&self, input: &Path) -> Option<&dyn Rule> {
        let suffix = input.extension()?.to_str()?;
        let indices = self.by_suffix.get(suffix)?;
        indices.first().map(|&i| self.rules[i].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Consumes the set, yielding the owned rule handles in registration
    /// order.
    pub fn into_rules(self) -> Vec<Arc<dyn Rule>> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// File stem of an input as an owned string.
pub(crate) fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
