//! Recipe execution
//!
//! Steps run in order through `std::process::Command`. A nonzero exit
//! status aborts the recipe and surfaces the rendered command line; there
//! is no retry or recovery.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::{Recipe, RuleError, Step};

pub struct RecipeRunner;

impl RecipeRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, recipe: &Recipe) -> Result<(), RuleError> {
        for step in &recipe.steps {
            self.run_step(step)?;
        }
        Ok(())
    }

    fn run_step(&self, step: &Step) -> Result<(), RuleError> {
        debug!(step = %step.render(), "Running recipe step");

        match step {
            Step::Run { program, args } => {
                let status = Command::new(program)
                    .args(args)
                    .status()
                    .map_err(|e| RuleError::Spawn {
                        command: step.render(),
                        reason: e.to_string(),
                    })?;

                if !status.success() {
                    return Err(RuleError::StepFailed {
                        command: step.render(),
                        status: status.to_string(),
                    });
                }
                info!(command = %step.render(), "Recipe step completed");
                Ok(())
            }
            Step::RunAppend {
                program,
                args,
                target,
            } => {
                let output = Command::new(program)
                    .args(args)
                    .output()
                    .map_err(|e| RuleError::Spawn {
                        command: step.render(),
                        reason: e.to_string(),
                    })?;

                if !output.status.success() {
                    return Err(RuleError::StepFailed {
                        command: step.render(),
                        status: output.status.to_string(),
                    });
                }

                append_bytes(target, &output.stdout)?;
                info!(command = %step.render(), "Recipe step completed");
                Ok(())
            }
            Step::AppendLine { target, line } => {
                append_bytes(target, format!("{}\n", line).as_bytes())
            }
        }
    }
}

impl Default for RecipeRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn append_bytes(target: &Path, bytes: &[u8]) -> Result<(), RuleError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .map_err(|e| RuleError::Write {
            path: target.to_path_buf(),
            reason: e.to_string(),
        })?;

    file.write_all(bytes).map_err(|e| RuleError::Write {
        path: target.to_path_buf(),
        reason: e.to_string(),
    })
}
