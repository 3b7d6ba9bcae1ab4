//! Page labels for history entries.

use crate::content::PathBuf;

/// Label used when the first path segment is not a known page.
pub const UNKNOWN_PAGE: &str = "Unknown";

const PAGE_LABELS: &[(&str, &str)] = &[
    ("meta", "Site Settings"),
    ("header", "Header"),
    ("home", "Home"),
    ("about", "About"),
    ("specialties", "Specialties"),
    ("doctors", "Doctors"),
    ("careers", "Careers"),
    ("contact", "Contact"),
    ("footer", "Footer"),
    ("imagePaths", "Images"),
];

/// Maps a top-level content key to the page name shown in the history.
pub fn page_label(top_level: &str) -> &'static str {
    PAGE_LABELS
        .iter()
        .find(|(key, _)| *key == top_level)
        .map_or(UNKNOWN_PAGE, |&(_, label)| label)
}

/// Page label for an edited path.
pub fn page_label_for(path: &PathBuf) -> &'static str {
    path.top_level()
        .map_or(UNKNOWN_PAGE, |top| page_label(&top))
}
