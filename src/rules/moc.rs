//! Meta-object compilation
//!
//! Two flavors over the same command: [`MocRule`] emits a `.moc` unit the
//! translation unit includes itself, [`MocCppRule`] emits a standalone
//! `<stem>_moc.cpp` unit compiled as an extra object.

use std::path::{Path, PathBuf};

use super::{input_stem, Recipe, Rule, RuleParams, Step};
use crate::locate::Toolkit;

fn moc_recipe(toolkit: &Toolkit, input: &Path, output: &Path) -> Recipe {
    Recipe {
        steps: vec![Step::Run {
            program: toolkit.moc.clone(),
            args: vec![
                "-o".to_string(),
                output.display().to_string(),
                input.display().to_string(),
            ],
        }],
    }
}

pub struct MocRule;

impl Rule for MocRule {
    fn name(&self) -> &str {
        "moc"
    }

    fn source_suffix(&self) -> &str {
        "h"
    }

    fn target_suffixes(&self, params: &RuleParams) -> Vec<String> {
        vec![params.moc_suffix.clone()]
    }

    fn outputs(&self, input: &Path, out_dir: &Path, params: &RuleParams) -> Vec<PathBuf> {
        vec![out_dir.join(params.moc_name(&input_stem(input)))]
    }

    fn recipe(
        &self,
        toolkit: &Toolkit,
        params: &RuleParams,
        input: &Path,
        out_dir: &Path,
    ) -> Recipe {
        let output = &self.outputs(input, out_dir, params)[0];
        moc_recipe(toolkit, input, output)
    }
}

pub struct MocCppRule;

impl Rule for MocCppRule {
    fn name(&self) -> &str {
        "moc-cpp"
    }

    fn source_suffix(&self) -> &str {
        "h"
    }

    fn target_suffixes(&self, params: &RuleParams) -> Vec<String> {
        vec![params.moc_cpp_suffix.clone()]
    }

    fn outputs(&self, input: &Path, out_dir: &Path, params: &RuleParams) -> Vec<PathBuf> {
        vec![out_dir.join(params.moc_cpp_name(&input_stem(input)))]
    }

    fn recipe(
        &self,
        toolkit: &Toolkit,
        params: &RuleParams,
        input: &Path,
        out_dir: &Path,
    ) -> Recipe {
        let output = &self.outputs(input, out_dir, params)[0];
        moc_recipe(toolkit, input, output)
    }
}
