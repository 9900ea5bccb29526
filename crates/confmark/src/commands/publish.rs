//! `confmark publish` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use confmark_config::Config;
use confmark_confluence::publisher::{
    DryRunResult, PagePublisher, ParentPage, PublishConfig, PublishResult,
};

use super::connect;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to the Markdown file.
    markdown_file: PathBuf,

    /// ID of the parent page for a newly created page.
    #[arg(long)]
    parent_id: Option<String>,

    /// Title of the parent page for a newly created page.
    #[arg(long, conflicts_with = "parent_id")]
    parent: Option<String>,

    /// Update the existing page (found by header page ID, then title).
    #[arg(long)]
    update: bool,

    /// Print the converted markup and images without contacting Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Version message for updates.
    #[arg(short, long)]
    message: Option<String>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or publishing fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        output.info(&format!("Converting {}...", self.markdown_file.display()));

        if self.dry_run {
            let result = PagePublisher::dry_run(&self.markdown_file)?;
            print_dry_run_result(&output, &result);
            return Ok(());
        }

        let config = Config::load(config_path, None)?;
        let client = connect(&config, &output)?;
        let space_key = config.require_confluence()?.require_space_key()?.to_owned();
        let publisher = PagePublisher::new(
            &client,
            PublishConfig {
                space_key,
                parent: self.parent_page(),
                update: self.update,
            },
        );

        let result = publisher.publish(&self.markdown_file, self.message.as_deref())?;
        print_publish_result(&output, &result);
        Ok(())
    }

    fn parent_page(&self) -> Option<ParentPage> {
        self.parent_id
            .clone()
            .map(ParentPage::Id)
            .or_else(|| self.parent.clone().map(ParentPage::Title))
    }
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.highlight("\n[DRY RUN] No changes made.");
    output.info(&format!("Title: {}", result.title));
    if let Some(page_id) = &result.page_id {
        output.info(&format!("Page ID: {page_id}"));
    }

    output.info("\n--- Storage format ---");
    output.info(&result.markup);
    output.info("--- End ---");

    if !result.images.is_empty() {
        output.info(&format!("\nImages to upload ({}):", result.images.len()));
        for image in &result.images {
            output.info(&format!("  -> {}", image.display()));
        }
    }
    print_missing(output, &result.missing_images);
}

fn print_publish_result(output: &Output, result: &PublishResult) {
    let action = if result.created { "created" } else { "updated" };
    output.success(&format!("\nPage {action} successfully!"));
    output.info(&format!("ID: {}", result.page_id));
    output.info(&format!("Title: {}", result.title));
    output.info(&format!("Version: {}", result.version));
    output.info(&format!("URL: {}", result.url));

    let total = result.uploaded.len() + result.skipped.len();
    if total > 0 {
        output.info(&format!(
            "\nImages uploaded: {}/{} ({} unchanged)",
            result.uploaded.len(),
            total,
            result.skipped.len()
        ));
    }
    print_missing(output, &result.missing_images);
}

fn print_missing(output: &Output, missing: &[String]) {
    if missing.is_empty() {
        return;
    }
    output.warning(&format!("\nImages not found ({}):", missing.len()));
    for reference in missing {
        output.warning(&format!("  - {reference}"));
    }
}
