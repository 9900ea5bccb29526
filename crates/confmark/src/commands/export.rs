//! `confmark export` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use confmark_config::{CliSettings, Config};
use confmark_confluence::{ExportOptions, ExportResult, ExportSummary, PageExporter};

use super::connect;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Confluence page IDs to export.
    #[arg(required_unless_present = "space")]
    page_ids: Vec<String>,

    /// Export every page of this space instead.
    #[arg(long, conflicts_with = "page_ids")]
    space: Option<String>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mirror the page tree with folders named after ancestor pages.
    #[arg(long)]
    hierarchy: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the space cannot be
    /// listed, or any page fails to export.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output.clone(),
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        let client = connect(&config, &output)?;

        let options = ExportOptions::from_config(&config.export_resolved, self.hierarchy);
        output.info(&format!(
            "Exporting to {}",
            options.output_dir.display()
        ));
        let exporter = PageExporter::new(&client, options);

        let summary = match &self.space {
            Some(space) => {
                output.highlight(&format!("Exporting space {space}"));
                exporter.export_space(space)?
            }
            None => exporter.export_pages(&self.page_ids),
        };

        print_summary(&output, &summary);

        if summary.failed.is_empty() {
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} of {} page(s) failed to export",
                summary.failed.len(),
                summary.failed.len() + summary.exported.len()
            )))
        }
    }
}

fn print_page(output: &Output, result: &ExportResult) {
    output.success(&format!(
        "Saved \"{}\" ({}) -> {}",
        result.title,
        result.page_id,
        result.path.display()
    ));
    if result.media_count > 0 {
        output.info(&format!("  Media files: {}", result.media_count));
    }
    for warning in &result.warnings {
        output.warning(&format!("  Warning: {warning}"));
    }
}

fn print_summary(output: &Output, summary: &ExportSummary) {
    for result in &summary.exported {
        print_page(output, result);
    }
    for (page_id, err) in &summary.failed {
        output.error(&format!("Failed {page_id}: {err}"));
    }
    output.highlight(&format!(
        "\nExported: {}  Failed: {}",
        summary.exported.len(),
        summary.failed.len()
    ));
}
