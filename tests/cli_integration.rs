//! CLI integration tests
//!
//! These tests drive the qtbuild binary end-to-end against fake toolkit
//! installations laid out in temp directories: argument parsing, detection
//! fallbacks, cache behavior, scan reports and exit codes.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the qtbuild binary
fn qtbuild_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .parent()
        .expect("No parent")
        .to_path_buf();

    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("qtbuild")
}

/// Lays out a plausible toolkit installation under `root`.
fn create_fake_install(root: &Path) {
    fs::create_dir_all(root.join("bin")).expect("Failed to create bin dir");
    fs::create_dir_all(root.join("include")).expect("Failed to create include dir");
    fs::create_dir_all(root.join("lib")).expect("Failed to create lib dir");
    fs::write(root.join("bin/uic"), "").expect("Failed to write uic");
    fs::write(root.join("bin/moc"), "").expect("Failed to write moc");
    fs::write(root.join("include/qlayout.h"), "// sentinel\n").expect("Failed to write header");
}

/// Base command: isolated cwd, no cache, no stray environment.
fn qtbuild(temp: &TempDir) -> Command {
    let mut cmd = Command::new(qtbuild_bin());
    cmd.current_dir(temp.path())
        .env_remove("QTDIR")
        .env_remove("RUST_LOG")
        .env("QTBUILD_CACHE_ENABLED", "false");
    cmd
}

#[test]
fn test_cli_help() {
    let output = Command::new(qtbuild_bin())
        .arg("--help")
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("detect"));
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("rules"));
    assert!(stdout.contains("generate"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(qtbuild_bin())
        .arg("--version")
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("qtbuild"));
}

#[test]
fn test_detect_from_qtdir() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);

    let output = qtbuild(&temp)
        .env("QTDIR", &install)
        .args(["detect", "--format", "json"])
        .output()
        .expect("Failed to run qtbuild");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("detect did not print JSON");
    assert_eq!(
        parsed["install_dir"].as_str().unwrap(),
        install.to_str().unwrap()
    );
    assert!(parsed["uic"].as_str().unwrap().ends_with("bin/uic"));
    assert!(parsed["include_dir"]
        .as_str()
        .unwrap()
        .ends_with("include"));
}

#[test]
fn test_detect_explicit_flag_beats_env() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good");
    create_fake_install(&good);

    let output = qtbuild(&temp)
        .env("QTDIR", temp.path().join("bogus"))
        .args(["detect", "--format", "json"])
        .arg("--qt-dir")
        .arg(&good)
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        parsed["install_dir"].as_str().unwrap(),
        good.to_str().unwrap()
    );
}

#[test]
fn test_detect_failure_exit_code() {
    let temp = TempDir::new().unwrap();

    // QTDIR points somewhere without the toolkit executables.
    let output = qtbuild(&temp)
        .env("QTDIR", temp.path().join("empty"))
        .env("PATH", temp.path().join("nothing-here"))
        .arg("detect")
        .output()
        .expect("Failed to run qtbuild");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_detect_human_output() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);

    let output = qtbuild(&temp)
        .env("QTDIR", &install)
        .arg("detect")
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Toolkit installation:"));
    assert!(stdout.contains("Include Dir:"));
}

#[test]
fn test_detect_uses_cache_until_reconfigure() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);
    let cache_path = temp.path().join("cache/toolkit.json");

    // First run probes and fills the cache.
    let output = Command::new(qtbuild_bin())
        .current_dir(temp.path())
        .env("QTDIR", &install)
        .env("QTBUILD_CACHE_PATH", &cache_path)
        .arg("detect")
        .output()
        .expect("Failed to run qtbuild");
    assert!(output.status.success());
    assert!(cache_path.is_file());

    // Second run succeeds from the cache even though QTDIR is now junk.
    let output = Command::new(qtbuild_bin())
        .current_dir(temp.path())
        .env("QTDIR", temp.path().join("gone"))
        .env("QTBUILD_CACHE_PATH", &cache_path)
        .arg("detect")
        .output()
        .expect("Failed to run qtbuild");
    assert!(output.status.success());

    // Reconfigure forces a fresh probe, which fails with the junk QTDIR.
    let output = Command::new(qtbuild_bin())
        .current_dir(temp.path())
        .env("QTDIR", temp.path().join("gone"))
        .env("QTBUILD_CACHE_PATH", &cache_path)
        .env("PATH", temp.path().join("nothing-here"))
        .args(["detect", "--reconfigure"])
        .output()
        .expect("Failed to run qtbuild");
    assert_eq!(output.status.code(), Some(1));
}

fn create_scan_project(dir: &Path) {
    fs::write(
        dir.join("widget.cpp"),
        "#include \"widget.h\"\n\nvoid Widget::noop() {}\n",
    )
    .unwrap();
    fs::write(
        dir.join("widget.h"),
        "class Widget : public QObject {\n    Q_OBJECT\npublic:\n    void noop();\n};\n",
    )
    .unwrap();
    fs::write(
        dir.join("player.cpp"),
        "#include \"player.h\"\n#include \"player.moc\"\n",
    )
    .unwrap();
    fs::write(
        dir.join("player.h"),
        "class Player : public QObject {\n    Q_OBJECT\n};\n",
    )
    .unwrap();
    fs::write(dir.join("dialog.cpp"), "// generated by the UI compiler\n").unwrap();
    fs::write(dir.join("dialog.ui"), "<!DOCTYPE UI><UI></UI>\n").unwrap();
    fs::write(dir.join("main.cpp"), "int main() { return 0; }\n").unwrap();
}

#[test]
fn test_scan_directory_json() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    create_scan_project(&src);

    let output = qtbuild(&temp)
        .args(["scan", "--format", "json"])
        .arg(&src)
        .output()
        .expect("Failed to run qtbuild");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let units = parsed["units"].as_array().unwrap();

    let kind_of = |name: &str| -> String {
        units
            .iter()
            .find(|u| u["unit"].as_str().unwrap().ends_with(name))
            .unwrap_or_else(|| panic!("no report entry for {}", name))["classification"]["kind"]
            .as_str()
            .unwrap()
            .to_string()
    };

    assert_eq!(kind_of("widget.cpp"), "moc_standalone");
    assert_eq!(kind_of("player.cpp"), "moc_included");
    assert_eq!(kind_of("dialog.cpp"), "ui_driven");
    assert_eq!(kind_of("main.cpp"), "plain");

    // The standalone unit contributes a generated source; headers and the
    // descriptor show up as skipped inputs.
    let widget = units
        .iter()
        .find(|u| u["unit"].as_str().unwrap().ends_with("widget.cpp"))
        .unwrap();
    assert!(widget["extra_sources"][0]
        .as_str()
        .unwrap()
        .ends_with("widget_moc.cpp"));
    assert!(!parsed["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_scan_reports_marker_in_source_with_exit_code() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("bad.cpp"),
        "class Bad : public QObject {\n    Q_OBJECT\n};\n",
    )
    .unwrap();

    let output = qtbuild(&temp)
        .arg("scan")
        .arg(&src)
        .output()
        .expect("Failed to run qtbuild");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Errors:"));
    assert!(stdout.contains("bad.cpp"));
}

#[test]
fn test_scan_no_autoscan_passes_through() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    create_scan_project(&src);

    let output = qtbuild(&temp)
        .args(["scan", "--no-autoscan", "--format", "json"])
        .arg(&src)
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for unit in parsed["units"].as_array().unwrap() {
        assert_eq!(unit["classification"]["kind"], "plain");
    }
}

#[test]
fn test_rules_listing() {
    let temp = TempDir::new().unwrap();

    let output = qtbuild(&temp)
        .arg("rules")
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("uic"));
    assert!(stdout.contains("moc-cpp"));
    assert!(stdout.contains("msgfmt"));
    assert!(stdout.contains(".po -> .gmo"));
}

#[test]
fn test_rules_listing_json() {
    let temp = TempDir::new().unwrap();

    let output = qtbuild(&temp)
        .args(["rules", "--format", "json"])
        .output()
        .expect("Failed to run qtbuild");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["uic", "moc", "moc-cpp", "msgfmt"]);
}

#[test]
fn test_project_file_is_honored() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);

    fs::write(
        temp.path().join("qtbuild.toml"),
        format!("[toolkit]\ninstall-dir = \"{}\"\n", install.display()),
    )
    .unwrap();

    let output = qtbuild(&temp)
        .args(["detect", "--format", "json"])
        .output()
        .expect("Failed to run qtbuild");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        parsed["install_dir"].as_str().unwrap(),
        install.to_str().unwrap()
    );
}

#[test]
fn test_generate_dry_run_prints_recipe() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);
    fs::write(temp.path().join("dialog.ui"), "<UI/>").unwrap();

    let output = qtbuild(&temp)
        .env("QTDIR", &install)
        .args(["generate", "--dry-run", "dialog.ui", "-o", "build"])
        .output()
        .expect("Failed to run qtbuild");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dialog.ui (uic):"));
    assert!(stdout.contains("-impl"));
    assert!(stdout.contains("dialog.moc"));
    // Dry run must not create anything.
    assert!(!temp.path().join("build").exists());
}

#[test]
fn test_generate_unknown_rule() {
    let temp = TempDir::new().unwrap();
    let install = temp.path().join("qt");
    create_fake_install(&install);
    fs::write(temp.path().join("widget.h"), "").unwrap();

    let output = qtbuild(&temp)
        .env("QTDIR", &install)
        .args(["generate", "--rule", "bogus", "widget.h"])
        .output()
        .expect("Failed to run qtbuild");

    assert_eq!(output.status.code(), Some(1));
}
