//! Image-reference indirection.
//!
//! A text value starting with [`INDIRECTION_PREFIX`] is not a literal: it is a
//! path to the shared asset URL elsewhere in the tree. Pages reference images
//! by name so swapping an asset updates every page that uses it.
//!
//! Resolution is exactly one level deep. The target of a reference is taken
//! as-is, even if it happens to look like another reference.

use std::str::FromStr;

use url::Url;

use super::path::{self, PathBuf};
use super::value::Value;

/// Reserved prefix marking a value as a reference into the tree.
pub const INDIRECTION_PREFIX: &str = "imagePaths.";

/// Returns the referenced path if `value` is an image reference.
pub fn reference_target(value: &Value) -> Option<PathBuf> {
    let text = value.as_text()?;
    if !text.starts_with(INDIRECTION_PREFIX) {
        return None;
    }
    PathBuf::from_str(text).ok()
}

/// Resolves the value to display for `path`, following one reference.
///
/// ```
/// # use sitecms::content::{Value, indirection::resolve_display_value};
/// # use serde_json::json;
/// let tree = Value::from(json!({
///     "a": {"b": "imagePaths.x.y"},
///     "imagePaths": {"x": {"y": "https://img"}}
/// }));
/// assert_eq!(resolve_display_value(&tree, "a.b"), Some(&Value::from("https://img")));
/// ```
pub fn resolve_display_value<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let path = PathBuf::from_str(path).ok()?;
    resolve_display(tree, &path)
}

/// Parsed-path form of [`resolve_display_value`].
pub fn resolve_display<'a>(tree: &'a Value, path: &PathBuf) -> Option<&'a Value> {
    let raw = path::get(tree, path)?;
    match raw.as_text() {
        Some(text) if text.starts_with(INDIRECTION_PREFIX) => path::get_str(tree, text),
        _ => Some(raw),
    }
}

/// Where an edit of the field at `path` should be written.
///
/// If the field currently holds a reference, the edit goes to the shared
/// asset it points at so the reference stays intact.
pub fn write_target(tree: &Value, path: &PathBuf) -> PathBuf {
    path::get(tree, path)
        .and_then(reference_target)
        .unwrap_or_else(|| path.clone())
}

/// Normalizes an asset URL before it is stored.
///
/// Data URIs and absolute URLs on other origins are kept verbatim. URLs on
/// the site's own origin are reduced to their path (plus query and fragment)
/// so the stored value works on any hostname the site is served from.
/// Anything that does not parse as an absolute URL is kept verbatim.
pub fn normalize_asset_url(raw: &str, site_origin: Option<&Url>) -> String {
    if raw.starts_with("data:") {
        return raw.to_string();
    }
    let (Ok(parsed), Some(origin)) = (Url::parse(raw), site_origin) else {
        return raw.to_string();
    };
    if parsed.origin() != origin.origin() {
        return raw.to_string();
    }

    let mut local = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        local.push('?');
        local.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        local.push('#');
        local.push_str(fragment);
    }
    local
}
