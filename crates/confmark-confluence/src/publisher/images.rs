//! Locating image files referenced by a Markdown document.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::types::Attachment;

/// Images found on disk and references that could not be resolved.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct LocatedImages {
    pub(crate) found: Vec<PathBuf>,
    pub(crate) missing: Vec<String>,
}

/// Resolve image references against the Markdown file's directory, then
/// against the working directory (which also covers absolute paths).
///
/// Each attachment name is uploaded once: repeated references and later
/// files sharing a file name with an earlier one are dropped.
pub(crate) fn locate_images(references: &[String], base_dir: &Path) -> LocatedImages {
    let mut located = LocatedImages::default();
    let mut names = HashSet::new();

    for reference in references {
        let relative = base_dir.join(reference);
        let path = if relative.is_file() {
            relative
        } else if Path::new(reference).is_file() {
            std::path::absolute(reference).unwrap_or_else(|_| PathBuf::from(reference))
        } else {
            warn!("Image not found: {}", reference);
            located.missing.push(reference.clone());
            continue;
        };

        let Some(name) = attachment_name(&path) else {
            continue;
        };
        if !names.insert(name.clone()) {
            if !located.found.contains(&path) {
                warn!(
                    "Skipping {}: another image is already attached as {}",
                    path.display(),
                    name
                );
            }
            continue;
        }
        located.found.push(path);
    }
    located
}

/// Attachment name of a local file (its base name).
pub(crate) fn attachment_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
}

/// Whether `existing` already holds a file of `local_size` bytes.
pub(crate) fn is_already_attached(existing: Option<&Attachment>, local_size: u64) -> bool {
    existing.and_then(|a| a.extensions.file_size) == Some(local_size)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_locate_relative_to_markdown_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/flow.png"), b"png").unwrap();

        let references = vec![
            "img/flow.png".to_owned(),
            "img/missing.png".to_owned(),
            "img/flow.png".to_owned(),
        ];
        let located = locate_images(&references, dir.path());
        assert_eq!(located.found, vec![dir.path().join("img/flow.png")]);
        assert_eq!(located.missing, vec!["img/missing.png"]);
    }

    #[test]
    fn test_locate_absolute_path() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, b"png").unwrap();
        let elsewhere = TempDir::new().unwrap();

        let references = vec![image.to_string_lossy().into_owned()];
        let located = locate_images(&references, elsewhere.path());
        assert_eq!(located.found, vec![image]);
        assert!(located.missing.is_empty());
    }

    #[test]
    fn test_same_file_name_uploaded_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/x.png"), b"1").unwrap();
        fs::write(dir.path().join("b/x.png"), b"2").unwrap();

        let references = vec!["a/x.png".to_owned(), "b/x.png".to_owned()];
        let located = locate_images(&references, dir.path());
        assert_eq!(located.found, vec![dir.path().join("a/x.png")]);
    }

    #[test]
    fn test_is_already_attached() {
        let attachment: Attachment = serde_json::from_str(
            r#"{"id": "att1", "title": "x.png", "extensions": {"fileSize": 3}}"#,
        )
        .unwrap();
        let unsized_attachment: Attachment =
            serde_json::from_str(r#"{"id": "att2", "title": "x.png"}"#).unwrap();

        assert!(is_already_attached(Some(&attachment), 3));
        assert!(!is_already_attached(Some(&attachment), 4));
        assert!(!is_already_attached(Some(&unsized_attachment), 0));
        assert!(!is_already_attached(None, 3));
    }
}
