//! CLI command implementations.

mod convert;
mod export;
mod publish;

pub(crate) use convert::ConvertCommand;
pub(crate) use export::ExportArgs;
pub(crate) use publish::PublishArgs;

use confmark_config::Config;
use confmark_confluence::ConfluenceClient;

use crate::error::CliError;
use crate::output::Output;

/// Build a client from the `[confluence]` section, explaining what is missing.
fn connect(config: &Config, output: &Output) -> Result<ConfluenceClient, CliError> {
    let confluence = config.require_confluence().inspect_err(|_| {
        output.info("\nAdd the following to your confmark.toml:");
        output.info("\n[confluence]");
        output.info(r#"base_url = "https://your-site.atlassian.net""#);
        output.info(r#"email = "${CONFLUENCE_EMAIL}""#);
        output.info(r#"api_token = "${CONFLUENCE_API_TOKEN}""#);
        output.info(r#"space_key = "ENG""#);
    })?;
    Ok(ConfluenceClient::from_config(confluence, &config.http))
}
