//! Content scans for the meta-object marker and generated-unit includes.

use regex::Regex;
use std::sync::OnceLock;

static MARKER_RE: OnceLock<Regex> = OnceLock::new();

/// Checks whether a header participates in meta-object generation.
///
/// The marker must appear as a standalone token: `MY_Q_OBJECT_THING` does
/// not count.
pub fn has_meta_object_marker(content: &str) -> bool {
    let re = MARKER_RE
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9]Q_OBJECT[^A-Za-z0-9]").unwrap());
    re.is_match(content)
}

/// Checks whether a translation unit includes its own generated meta-object
/// unit (`#include "<stem>.moc"` or the angle-bracket form) and therefore
/// compiles the generated code as part of itself.
pub fn includes_generated_unit(content: &str, stem: &str) -> bool {
    let pattern = format!(
        r#"(?m)^\s*#include\s*("|<){}\.moc("|>)"#,
        regex::escape(stem)
    );
    // The pattern is built from an escaped literal, it always parses.
    let re = Regex::new(&pattern).unwrap();
    re.is_match(content)
}
