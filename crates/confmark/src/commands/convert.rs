//! `confmark convert` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use confmark_markdown::NoopResolver;
use confmark_markdown::envelope::split_document;

use crate::error::CliError;
use crate::output::Output;

/// Offline conversions; results are written to stdout.
#[derive(Subcommand)]
pub(crate) enum ConvertCommand {
    /// Render an ADF JSON document as Markdown.
    ToMarkdown {
        /// ADF JSON file (`-` for stdin).
        adf_json: PathBuf,
    },
    /// Convert Markdown to Confluence storage format.
    ToStorage {
        /// Markdown file (`-` for stdin).
        markdown: PathBuf,
    },
}

impl ConvertCommand {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or is not valid ADF JSON.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let mut stdout = std::io::stdout().lock();

        match self {
            Self::ToMarkdown { adf_json } => {
                let markdown = to_markdown(&read_input(&adf_json)?, &output)?;
                writeln!(stdout, "{markdown}")?;
            }
            Self::ToStorage { markdown } => {
                let (markup, images) = to_storage(&read_input(&markdown)?);
                writeln!(stdout, "{markup}")?;
                if !images.is_empty() {
                    output.info(&format!("\nImages referenced ({}):", images.len()));
                    for image in &images {
                        output.info(&format!("  - {image}"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Render ADF without network access: media is dropped and link titles are
/// derived from URLs.
fn to_markdown(json: &str, output: &Output) -> Result<String, CliError> {
    let result = confmark_markdown::render_json(json, &mut NoopResolver)?;
    output.warnings(&result.warnings);
    Ok(result.markdown)
}

/// Convert the document body, ignoring an exported header if present.
fn to_storage(markdown: &str) -> (String, Vec<String>) {
    let document = split_document(markdown);
    let output = confmark_storage::parse(&document.body);
    (output.markup, output.images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_markdown() {
        let json = r#"{"type":"doc","content":[{"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Scope"}]}]}"#;
        assert_eq!(to_markdown(json, &Output::new()).unwrap(), "## Scope");
    }

    #[test]
    fn test_to_markdown_invalid_json() {
        let err = to_markdown("{not json", &Output::new()).unwrap_err();
        assert!(matches!(err, CliError::Adf(_)));
    }

    #[test]
    fn test_to_storage_skips_header() {
        let markdown = "# Plan\n\n**Page ID:** 1\n\n---\n\nSee ![x](img/x.png)\n";
        let (markup, images) = to_storage(markdown);
        assert_eq!(
            markup,
            "<p>See <ac:image ac:alt=\"x\"><ri:attachment ri:filename=\"x.png\"/></ac:image></p>"
        );
        assert_eq!(images, vec!["img/x.png"]);
    }
}
