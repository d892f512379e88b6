//! UI descriptor compilation
//!
//! A `.ui` descriptor expands into three outputs sharing the input's stem:
//! the declaration header, the implementation unit and the meta-object
//! unit. The implementation pass is captured into the generated unit, which
//! then gains an include of the meta-object unit so the whole expansion
//! compiles as a single object.

use std::path::{Path, PathBuf};

use super::{input_stem, Recipe, Rule, RuleParams, Step};
use crate::locate::Toolkit;

pub struct UicRule;

impl Rule for UicRule {
    fn name(&self) -> &str {
        "uic"
    }

    fn source_suffix(&self) -> &str {
        "ui"
    }

    fn target_suffixes(&self, params: &RuleParams) -> Vec<String> {
        vec![
            ".h".to_string(),
            ".cpp".to_string(),
            params.moc_suffix.clone(),
        ]
    }

    fn outputs(&self, input: &Path, out_dir: &Path, params: &RuleParams) -> Vec<PathBuf> {
        let stem = input_stem(input);
        vec![
            out_dir.join(format!("{}.h", stem)),
            out_dir.join(format!("{}.cpp", stem)),
            out_dir.join(params.moc_name(&stem)),
        ]
    }

    fn recipe(
        &self,
        toolkit: &Toolkit,
        params: &RuleParams,
        input: &Path,
        out_dir: &Path,
    ) -> Recipe {
        let outputs = self.outputs(input, out_dir, params);
        let header = outputs[0].clone();
        let unit = outputs[1].clone();
        let moc_unit = outputs[2].clone();

        let mut header_args = params.rendered_uic_hflags();
        header_args.push("-o".to_string());
        header_args.push(header.display().to_string());
        header_args.push(input.display().to_string());

        let mut impl_args = params.rendered_uic_cflags();
        impl_args.push("-impl".to_string());
        impl_args.push(header.display().to_string());
        impl_args.push(input.display().to_string());

        let moc_include = format!(
            "#include \"{}\"",
            moc_unit
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        );

        Recipe {
            steps: vec![
                Step::Run {
                    program: toolkit.uic.clone(),
                    args: header_args,
                },
                Step::RunAppend {
                    program: toolkit.uic.clone(),
                    args: impl_args,
                    target: unit.clone(),
                },
                Step::AppendLine {
                    target: unit,
                    line: moc_include,
                },
                Step::Run {
                    program: toolkit.moc.clone(),
                    args: vec![
                        "-o".to_string(),
                        moc_unit.display().to_string(),
                        header.display().to_string(),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> Toolkit {
        Toolkit {
            install_dir: PathBuf::from("/opt/qt"),
            uic: PathBuf::from("/opt/qt/bin/uic"),
            moc: PathBuf::from("/opt/qt/bin/moc"),
            include_dir: PathBuf::from("/opt/qt/include"),
            lib_dir: PathBuf::from("/opt/qt/lib"),
        }
    }

    #[test]
    fn test_outputs_share_input_stem() {
        let outputs = UicRule.outputs(
            Path::new("src/dialog.ui"),
            Path::new("build"),
            &RuleParams::default(),
        );
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("build/dialog.h"),
                PathBuf::from("build/dialog.cpp"),
                PathBuf::from("build/dialog.moc"),
            ]
        );
    }

    #[test]
    fn test_recipe_steps_in_order() {
        let recipe = UicRule.recipe(
            &toolkit(),
            &RuleParams::default(),
            Path::new("src/dialog.ui"),
            Path::new("build"),
        );

        assert_eq!(recipe.steps.len(), 4);
        assert_eq!(
            recipe.steps[0],
            Step::Run {
                program: PathBuf::from("/opt/qt/bin/uic"),
                args: vec![
                    "-nounload".to_string(),
                    "-o".to_string(),
                    "build/dialog.h".to_string(),
                    "src/dialog.ui".to_string(),
                ],
            }
        );
        assert_eq!(
            recipe.steps[1],
            Step::RunAppend {
                program: PathBuf::from("/opt/qt/bin/uic"),
                args: vec![
                    "-nounload".to_string(),
                    "-impl".to_string(),
                    "build/dialog.h".to_string(),
                    "src/dialog.ui".to_string(),
                ],
                target: PathBuf::from("build/dialog.cpp"),
            }
        );
        assert_eq!(
            recipe.steps[2],
            Step::AppendLine {
                target: PathBuf::from("build/dialog.cpp"),
                line: "#include \"dialog.moc\"".to_string(),
            }
        );
        assert_eq!(
            recipe.steps[3],
            Step::Run {
                program: PathBuf::from("/opt/qt/bin/moc"),
                args: vec![
                    "-o".to_string(),
                    "build/dialog.moc".to_string(),
                    "build/dialog.h".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_recipe_with_plugin_dir() {
        let params = RuleParams {
            uic_plugin_dir: Some(PathBuf::from("/opt/qt/plugins")),
            ..Default::default()
        };
        let recipe = UicRule.recipe(
            &toolkit(),
            &params,
            Path::new("src/dialog.ui"),
            Path::new("build"),
        );

        match &recipe.steps[0] {
            Step::Run { args, .. } => {
                assert_eq!(&args[..2], &["-L".to_string(), "/opt/qt/plugins".to_string()]);
            }
            other => panic!("expected Run step, got {:?}", other),
        }
    }
}
