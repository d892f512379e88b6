//! Subcommand handlers
//!
//! Each handler resolves configuration (environment, project file, CLI
//! flags), runs the requested operation and returns a process exit code.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};

use super::commands::{DetectArgs, GenerateArgs, OutputFormatArg, RulesArgs, ScanArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::classify::Classifier;
use crate::config::QtBuildConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::locate::{Toolkit, ToolkitCache, ToolkitLocator};
use crate::rules::{RecipeRunner, RuleError, RuleSet};

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn base_config() -> Result<QtBuildConfig, i32> {
    let mut config = QtBuildConfig::default();
    if let Err(e) = config.apply_project_dir(Path::new(".")) {
        error!(error = %e, "Invalid project configuration");
        return Err(1);
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(1);
    }
    Ok(config)
}

/// Cache-aware toolkit resolution shared by `detect` and `generate`.
fn resolve_toolkit(
    config: &QtBuildConfig,
    fs: Arc<dyn FileSystem>,
    use_cache: bool,
    reconfigure: bool,
) -> Result<Toolkit, i32> {
    let cache = ToolkitCache::new(config.cache_path.clone(), fs.clone());

    if use_cache && !reconfigure {
        if let Some(toolkit) = cache.load() {
            return Ok(toolkit);
        }
    }

    let locator = ToolkitLocator::with_options(fs, config.locate_options());
    let toolkit = match locator.locate() {
        Ok(toolkit) => toolkit,
        Err(e) => {
            error!(error = %e, "Toolkit detection failed");
            return Err(1);
        }
    };

    if use_cache {
        if let Err(e) = cache.store(&toolkit) {
            warn!(error = %e, "Failed to write toolkit cache");
        }
    }

    Ok(toolkit)
}

pub fn handle_detect(args: &DetectArgs) -> i32 {
    let mut config = match base_config() {
        Ok(c) => c,
        Err(code) => return code,
    };

    if args.qt_dir.is_some() {
        config.install_dir = args.qt_dir.clone();
    }
    if args.qt_includes.is_some() {
        config.include_dir = args.qt_includes.clone();
    }
    if args.qt_libs.is_some() {
        config.lib_dir = args.qt_libs.clone();
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let use_cache = config.cache_enabled && !args.no_cache;

    let toolkit = match resolve_toolkit(&config, fs, use_cache, args.reconfigure) {
        Ok(toolkit) => toolkit,
        Err(code) => return code,
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_toolkit(&toolkit) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!(error = %e, "Failed to format output");
            1
        }
    }
}

pub fn handle_scan(args: &ScanArgs) -> i32 {
    let mut config = match base_config() {
        Ok(c) => c,
        Err(code) => return code,
    };

    if args.no_autoscan {
        config.autoscan = false;
    }
    if args.no_moc_include_scan {
        config.no_moc_include_scan = true;
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());

    let sources = match collect_sources(fs.as_ref(), &args.paths) {
        Ok(sources) => sources,
        Err(e) => {
            error!(error = %e, "Failed to gather scan inputs");
            return 1;
        }
    };

    let classifier = Classifier::with_options(fs, config.classify_options());
    let report = classifier.scan_target(&sources);

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_scan(&report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!(error = %e, "Failed to format output");
            return 1;
        }
    }

    if report.has_errors() {
        1
    } else {
        0
    }
}

pub fn handle_rules(args: &RulesArgs) -> i32 {
    let config = match base_config() {
        Ok(c) => c,
        Err(code) => return code,
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_rules(&RuleSet::with_defaults(), &config.rule_params()) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!(error = %e, "Failed to format output");
            1
        }
    }
}

pub fn handle_generate(args: &GenerateArgs) -> i32 {
    let mut config = match base_config() {
        Ok(c) => c,
        Err(code) => return code,
    };

    if args.qt_dir.is_some() {
        config.install_dir = args.qt_dir.clone();
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());

    let toolkit = match resolve_toolkit(&config, fs, config.cache_enabled, args.reconfigure) {
        Ok(toolkit) => toolkit,
        Err(code) => return code,
    };

    let rules = RuleSet::with_defaults();
    let params = config.rule_params();
    let runner = RecipeRunner::new();

    if !args.dry_run {
        if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
            error!(dir = %args.out_dir.display(), error = %e, "Failed to create output directory");
            return 1;
        }
    }

    for input in &args.inputs {
        let rule = match pick_rule(&rules, args.rule.as_deref(), input) {
            Ok(rule) => rule,
            Err(e) => {
                error!(error = %e, "No applicable rule");
                return 1;
            }
        };

        let recipe = rule.recipe(&toolkit, &params, input, &args.out_dir);

        if args.dry_run {
            println!("{} ({}):", input.display(), rule.name());
            for line in recipe.render() {
                println!("  {}", line);
            }
            continue;
        }

        if let Err(e) = runner.run(&recipe) {
            error!(input = %input.display(), error = %e, "Rule recipe failed");
            return 1;
        }
    }

    0
}

fn pick_rule<'a>(
    rules: &'a RuleSet,
    explicit: Option<&str>,
    input: &Path,
) -> Result<&'a dyn crate::rules::Rule, RuleError> {
    match explicit {
        Some(name) => {
            let rule = rules.get(name).ok_or_else(|| RuleError::UnknownRule {
                name: name.to_string(),
            })?;
            let suffix = input.extension().and_then(|e| e.to_str());
            if suffix != Some(rule.source_suffix()) {
                return Err(RuleError::SuffixMismatch {
                    rule: rule.name().to_string(),
                    input: input.to_path_buf(),
                });
            }
            Ok(rule)
        }
        None => rules
            .for_source(input)
            .ok_or_else(|| RuleError::NoRuleForInput {
                input: input.to_path_buf(),
                suffix: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|s| s.to_string()),
            }),
    }
}

/// Expands directories into their files, sorted by name; explicit files
/// pass through untouched.
fn collect_sources(fs: &dyn FileSystem, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for path in paths {
        if fs.is_dir(path) {
            let mut entries: Vec<_> = fs
                .read_dir(path)?
                .into_iter()
                .filter(|e| e.is_file())
                .map(|e| e.path)
                .collect();
            entries.sort();
            sources.extend(entries);
        } else {
            sources.push(path.clone());
        }
    }

    Ok(sources)
}
