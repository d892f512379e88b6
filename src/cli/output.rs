//! Output formatting
//!
//! Formatters for the JSON and human-readable renditions of the toolkit,
//! scan reports and rule listings.

use anyhow::{Context, Result};
use serde_json::json;

use crate::classify::{Classification, ScanReport};
use crate::locate::Toolkit;
use crate::rules::{RuleParams, RuleSet};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_toolkit(&self, toolkit: &Toolkit) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(toolkit).context("Failed to serialize toolkit")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                out.push_str("Toolkit installation:\n");
                out.push_str(&format!(
                    "  Install Dir: {}\n",
                    toolkit.install_dir.display()
                ));
                out.push_str(&format!("  uic:         {}\n", toolkit.uic.display()));
                out.push_str(&format!("  moc:         {}\n", toolkit.moc.display()));
                out.push_str(&format!(
                    "  Include Dir: {}\n",
                    toolkit.include_dir.display()
                ));
                out.push_str(&format!("  Lib Dir:     {}\n", toolkit.lib_dir.display()));
                Ok(out)
            }
        }
    }

    pub fn format_scan(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize scan report")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                out.push_str(&format!(
                    "Scanned {} translation units ({} skipped)\n",
                    report.units.len(),
                    report.skipped.len()
                ));

                for unit in &report.units {
                    let label = match &unit.classification {
                        Classification::UiDriven { descriptor } => {
                            format!("ui-driven ({})", descriptor.display())
                        }
                        Classification::MocIncluded { header } => {
                            format!("moc-included ({})", header.display())
                        }
                        Classification::MocStandalone { header } => {
                            format!("moc-standalone ({})", header.display())
                        }
                        Classification::Plain => "plain".to_string(),
                    };
                    out.push_str(&format!("  {}: {}\n", unit.unit.display(), label));
                    for extra in &unit.extra_sources {
                        out.push_str(&format!("      + {}\n", extra.display()));
                    }
                }

                if report.has_errors() {
                    out.push_str("Errors:\n");
                    for error in &report.errors {
                        out.push_str(&format!("  {}: {}\n", error.unit.display(), error.message));
                    }
                }

                Ok(out)
            }
        }
    }

    pub fn format_rules(&self, rules: &RuleSet, params: &RuleParams) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = rules
                    .iter()
                    .map(|rule| {
                        json!({
                            "name": rule.name(),
                            "source_suffix": format!(".{}", rule.source_suffix()),
                            "target_suffixes": rule.target_suffixes(params),
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&entries).context("Failed to serialize rules")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                out.push_str("Registered rules:\n");
                for rule in rules.iter() {
                    out.push_str(&format!(
                        "  {:8} .{} -> {}\n",
                        rule.name(),
                        rule.source_suffix(),
                        rule.target_suffixes(params).join(", ")
                    ));
                }
                Ok(out)
            }
        }
    }
}
