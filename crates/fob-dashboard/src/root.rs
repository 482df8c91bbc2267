//! Project root inference.
//!
//! The root feeds the downstream versions report. A wrong or missing root only
//! disables that report, so every probe here is best-effort: failures mean
//! "this step does not match" and resolution moves on.

use std::path::{Path, PathBuf};

/// Manifest file that marks a directory as a project root.
pub const MANIFEST_FILE: &str = "package.json";

/// Infer the project root with an ordered, short-circuiting fallback.
///
/// Priority order:
/// 1. `explicit_root`, returned as-is without validation
/// 2. `bundle_context`, if a manifest sits directly inside it
/// 3. `cwd`, if a manifest sits directly inside it
/// 4. `None`
///
/// The result is never cached; call again to re-probe.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fob_dashboard::root::resolve_project_root;
///
/// let root = resolve_project_root(Some(Path::new("/a")), None, None);
/// assert_eq!(root.as_deref(), Some(Path::new("/a")));
/// ```
pub fn resolve_project_root(
    explicit_root: Option<&Path>,
    bundle_context: Option<&Path>,
    cwd: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(root) = explicit_root {
        return Some(root.to_path_buf());
    }

    if let Some(context) = bundle_context {
        if has_manifest(context) {
            return Some(context.to_path_buf());
        }
    }

    if let Some(cwd) = cwd {
        if has_manifest(cwd) {
            return Some(cwd.to_path_buf());
        }
    }

    None
}

/// Check whether `dir` directly contains a readable manifest.
///
/// The manifest must parse as a JSON object. Missing files, permission
/// errors and malformed JSON all count as "no manifest".
pub fn has_manifest(dir: &Path) -> bool {
    let Ok(content) = std::fs::read(dir.join(MANIFEST_FILE)) else {
        return false;
    };

    matches!(
        serde_json::from_slice::<serde_json::Value>(&content),
        Ok(serde_json::Value::Object(_))
    )
}
