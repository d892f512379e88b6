//! Message catalog compilation (`.po` → `.gmo`).

use std::path::{Path, PathBuf};

use super::{input_stem, Recipe, Rule, RuleParams, Step};
use crate::locate::Toolkit;

pub struct MsgfmtRule;

impl Rule for MsgfmtRule {
    fn name(&self) -> &str {
        "msgfmt"
    }

    fn source_suffix(&self) -> &str {
        "po"
    }

    fn target_suffixes(&self, _params: &RuleParams) -> Vec<String> {
        vec![".gmo".to_string()]
    }

    fn outputs(&self, input: &Path, out_dir: &Path, _params: &RuleParams) -> Vec<PathBuf> {
        vec![out_dir.join(format!("{}.gmo", input_stem(input)))]
    }

    fn recipe(
        &self,
        _toolkit: &Toolkit,
        params: &RuleParams,
        input: &Path,
        out_dir: &Path,
    ) -> Recipe {
        let output = &self.outputs(input, out_dir, params)[0];
        Recipe {
            steps: vec![Step::Run {
                program: params.msgfmt_program.clone(),
                args: vec![
                    input.display().to_string(),
                    "-o".to_string(),
                    output.display().to_string(),
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_suffix() {
        let outputs = MsgfmtRule.outputs(
            Path::new("po/de.po"),
            Path::new("build"),
            &RuleParams::default(),
        );
        assert_eq!(outputs, vec![PathBuf::from("build/de.gmo")]);
    }

    #[test]
    fn test_recipe_command_shape() {
        let toolkit = Toolkit {
            install_dir: PathBuf::from("/opt/qt"),
            uic: PathBuf::from("/opt/qt/bin/uic"),
            moc: PathBuf::from("/opt/qt/bin/moc"),
            include_dir: PathBuf::from("/opt/qt/include"),
            lib_dir: PathBuf::from("/opt/qt/lib"),
        };
        let recipe = MsgfmtRule.recipe(
            &toolkit,
            &RuleParams::default(),
            Path::new("po/de.po"),
            Path::new("build"),
        );

        assert_eq!(
            recipe.render(),
            vec!["msgfmt po/de.po -o build/de.gmo".to_string()]
        );
    }
}
