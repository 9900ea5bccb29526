//! File and folder names derived from page and attachment titles.

use std::path::{Path, PathBuf};

use crate::types::Ancestor;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILENAME_CHARS: usize = 100;
const MAX_HIERARCHY_DEPTH: usize = 3;

/// Folder used in hierarchy mode when a page has no usable ancestors.
pub const ROOT_FOLDER: &str = "Root_Documents";

/// Ancestor titles that name the space home page rather than a section.
const HOME_TITLES: &[&str] = &["home", "homepage", "space home"];

/// Turn a title into a portable file name (without extension).
///
/// Reserved characters and whitespace runs become `_`, leading and trailing
/// `_` are stripped and the result is cut to 100 characters. May be empty.
pub fn sanitize_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        out.push(if FORBIDDEN.contains(&ch) { '_' } else { ch });
    }
    out.trim_matches('_').chars().take(MAX_FILENAME_CHARS).collect()
}

/// Markdown file name for a page title.
pub(crate) fn page_filename(title: &str) -> String {
    let stem = sanitize_filename(title);
    if stem.is_empty() {
        "Untitled.md".to_owned()
    } else {
        format!("{stem}.md")
    }
}

/// Local file name for a downloaded attachment, keeping its extension.
pub(crate) fn asset_filename(title: &str) -> String {
    let path = Path::new(title);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(sanitize_filename)
        .filter(|ext| !ext.is_empty());
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(sanitize_filename)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "attachment".to_owned());

    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Folder path mirroring the page tree, relative to the output directory.
pub fn hierarchy_path(ancestors: &[Ancestor]) -> PathBuf {
    let parts: Vec<String> = ancestors
        .iter()
        .filter(|a| !HOME_TITLES.contains(&a.title.to_lowercase().as_str()))
        .map(|a| sanitize_filename(&a.title))
        .filter(|name| !name.is_empty())
        .take(MAX_HIERARCHY_DEPTH)
        .collect();

    if parts.is_empty() {
        PathBuf::from(ROOT_FOLDER)
    } else {
        parts.iter().collect()
    }
}
